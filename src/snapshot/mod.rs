//! Schema Snapshot Module
//!
//! Raw per-version schema captures and the store that serves them.
//! Captures are produced elsewhere (by running `describe` and
//! `show index` against an installation) and are read-only here.

pub mod capture;
pub mod store;

pub use capture::{RawColumn, RawIndex, RawSchema, RawTable};
pub use store::{SnapshotMetadata, SnapshotStore};
