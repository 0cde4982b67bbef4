//! Snapshot and Version API Routes
//!
//! Read-only listings of the known versions and the loaded captures.

use crate::annotations::ReleaseNote;
use crate::error::ApiResult;
use crate::snapshot::SnapshotMetadata;
use crate::state::SharedState;
use crate::version::Version;
use axum::{extract::State, Json};
use serde::Serialize;

// ==================== Response Types ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: Version,
    /// Capture this version uses, if mapped
    pub schema: Option<String>,
    pub release_candidate: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionListResponse {
    pub success: bool,
    pub versions: Vec<VersionInfo>,
    pub default_first_version: Option<Version>,
    pub default_last_version: Option<Version>,
    pub releases: Vec<ReleaseNote>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotListResponse {
    pub success: bool,
    pub snapshots: Vec<SnapshotMetadata>,
}

// ==================== Handlers ====================

/// List every known version, oldest first
pub async fn list_versions(State(state): State<SharedState>) -> ApiResult<Json<VersionListResponse>> {
    let annotations = &state.annotations;
    let versions = annotations
        .version_order
        .iter()
        .map(|version| VersionInfo {
            schema: annotations.schema_for(version).map(str::to_string),
            release_candidate: version.is_release_candidate(),
            version: version.clone(),
        })
        .collect();
    let (default_first_version, default_last_version) = match annotations.default_range() {
        Some((first, last)) => (Some(first), Some(last)),
        None => (None, None),
    };

    Ok(Json(VersionListResponse {
        success: true,
        versions,
        default_first_version,
        default_last_version,
        releases: annotations.version_remarks.clone(),
    }))
}

/// List the loaded schema captures
pub async fn list_snapshots(State(state): State<SharedState>) -> ApiResult<Json<SnapshotListResponse>> {
    Ok(Json(SnapshotListResponse {
        success: true,
        snapshots: state.snapshots.list(),
    }))
}
