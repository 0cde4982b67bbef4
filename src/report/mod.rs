//! Schema Report Module
//!
//! Drives the history engine over a version range and shapes the result
//! for renderers:
//! - `engine`: range validation and the normalize/merge/classify pipeline
//! - `model`: display-ready report types
//! - `cache`: finished reports, keyed by range

pub mod cache;
pub mod engine;
pub mod model;

pub use cache::ReportCache;
pub use engine::{PlannedCapture, RangePlan, ReportEngine};
pub use model::{ColumnReport, IndexReport, ReleaseEntry, ReportSummary, SchemaReport, TableReport};
