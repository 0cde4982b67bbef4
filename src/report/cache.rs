//! Finished reports keyed by `(first, last)`.
//!
//! Annotations and captures are loaded once at startup and never change
//! while serving, so a report for a range can be reused until restart.

use super::model::SchemaReport;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

type RangeKey = (String, String);

#[derive(Debug, Default)]
pub struct ReportCache {
    reports: RwLock<HashMap<RangeKey, Arc<SchemaReport>>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, first: &str, last: &str) -> Option<Arc<SchemaReport>> {
        let reports = self.reports.read().await;
        reports.get(&(first.to_string(), last.to_string())).cloned()
    }

    /// Store a report, returning the shared handle. If another request
    /// stored the same range first, that report is kept.
    pub async fn insert(&self, report: SchemaReport) -> Arc<SchemaReport> {
        let key = (
            report.first_version.to_string(),
            report.last_version.to_string(),
        );
        let mut reports = self.reports.write().await;
        let stored = Arc::clone(reports.entry(key).or_insert_with(|| Arc::new(report)));
        debug!("Report cache holds {} ranges", reports.len());
        stored
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::SpanCache;
    use crate::report::ReportEngine;
    use crate::testutil;

    #[test]
    fn test_cache_keeps_first_report_per_range() {
        let annotations = testutil::annotations();
        let store = testutil::store();
        let spans = SpanCache::new();
        let engine = ReportEngine::new(&annotations, &store, &spans);
        let cache = ReportCache::new();

        tokio_test::block_on(async {
            assert!(cache.get("1.0", "2.0").await.is_none());

            let first = cache.insert(engine.generate("1.0", "2.0").unwrap()).await;
            let second = cache.insert(engine.generate("1.0", "2.0").unwrap()).await;
            assert!(Arc::ptr_eq(&first, &second));

            cache.insert(engine.generate("2.0", "2.0").unwrap()).await;
            assert_eq!(cache.len().await, 2);

            let hit = cache.get("1.0", "2.0").await.unwrap();
            assert!(Arc::ptr_eq(&first, &hit));
            assert!(cache.get("2.0", "1.0").await.is_none());
        });
    }
}
