//! Schema Report API Routes
//!
//! The versioned schema for a range of versions, as JSON for a renderer.

use crate::error::{not_found_error, ApiResult};
use crate::report::SchemaReport;
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub success: bool,
    pub message: String,
    pub report: Arc<SchemaReport>,
}

impl ReportResponse {
    fn new(report: Arc<SchemaReport>) -> Self {
        Self {
            success: true,
            message: format!("Schema of {}", report.version_phrase()),
            report,
        }
    }
}

/// Report for `from..=to`; missing bounds come from the annotations
pub async fn get_schema_range(
    State(state): State<SharedState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ReportResponse>> {
    let (default_first, default_last) = state
        .annotations
        .default_range()
        .ok_or_else(|| not_found_error("No versions are configured"))?;
    let first = query.from.unwrap_or_else(|| default_first.to_string());
    let last = query.to.unwrap_or_else(|| default_last.to_string());

    info!("Schema report requested for {}..{}", first, last);
    let report = state.report(&first, &last).await?;
    Ok(Json(ReportResponse::new(report)))
}

/// Report for a single version
pub async fn get_schema_version(
    State(state): State<SharedState>,
    Path(version): Path<String>,
) -> ApiResult<Json<ReportResponse>> {
    let report = state.report(&version, &version).await?;
    Ok(Json(ReportResponse::new(report)))
}
