//! Application state management
//!
//! Contains shared state accessible across all handlers. Annotations and
//! captures are loaded once at startup and are read-only afterwards.

use crate::annotations::{Annotations, SpanCache};
use crate::config::Settings;
use crate::error::AppError;
use crate::report::{ReportCache, ReportEngine, SchemaReport};
use crate::snapshot::SnapshotStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Application state shared across all handlers
pub struct AppState {
    /// Curated remarks, version order and schema mapping
    pub annotations: Annotations,

    /// Raw captures by schema name
    pub snapshots: SnapshotStore,

    /// Memoized version-span classification for scoped remarks
    pub spans: SpanCache,

    /// Finished reports by range
    pub reports: ReportCache,
}

impl AppState {
    pub fn new(annotations: Annotations, snapshots: SnapshotStore) -> Self {
        Self {
            annotations,
            snapshots,
            spans: SpanCache::new(),
            reports: ReportCache::new(),
        }
    }

    /// Load annotations and captures from the configured locations.
    pub fn load(settings: &Settings) -> Result<Self, AppError> {
        let annotations = Annotations::load(&settings.data.annotations_path)?;
        let snapshots = SnapshotStore::load_dir(&settings.data.snapshots_dir)?;
        info!(
            "Loaded {} captures from {}",
            snapshots.len(),
            settings.data.snapshots_dir.display()
        );
        Ok(Self::new(annotations, snapshots))
    }

    pub fn engine(&self) -> ReportEngine<'_> {
        ReportEngine::new(&self.annotations, &self.snapshots, &self.spans)
    }

    /// A complete report for the range, from cache when possible.
    pub async fn report(&self, first: &str, last: &str) -> Result<Arc<SchemaReport>, AppError> {
        if let Some(report) = self.reports.get(first, last).await {
            debug!("Report cache hit for {}..{}", first, last);
            return Ok(report);
        }
        let report = self.engine().generate(first, last)?;
        Ok(self.reports.insert(report).await)
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
