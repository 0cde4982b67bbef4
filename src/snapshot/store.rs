//! Schema Capture Store
//!
//! Holds the raw captures, keyed by schema name. Captures are loaded once
//! from a directory of `<schema-name>.json` files and never change
//! afterwards, so lookups need no locking.

use super::capture::RawSchema;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Metadata about a capture (lightweight, used for listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub name: String,
    pub schema_version: String,
    pub table_count: usize,
    pub column_count: usize,
    pub index_count: usize,
    pub checksum: String,
}

#[derive(Debug, Clone)]
struct StoredCapture {
    schema: Arc<RawSchema>,
    metadata: SnapshotMetadata,
}

/// Store for raw schema captures
#[derive(Debug, Default)]
pub struct SnapshotStore {
    captures: BTreeMap<String, StoredCapture>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir`; the file stem is the schema name.
    pub fn load_dir(dir: &Path) -> Result<Self, AppError> {
        let mut store = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AppError::Config(format!("Cannot read snapshot directory {}: {}", dir.display(), e))
        })?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let text = std::fs::read_to_string(&path)?;
            let schema: RawSchema = serde_json::from_str(&text).map_err(|e| {
                AppError::Config(format!("Cannot parse snapshot {}: {}", path.display(), e))
            })?;
            debug!("Read snapshot {} ({} tables)", name, schema.tables.len());
            store.insert(name, schema);
        }

        info!("Loaded {} schema snapshots from {}", store.len(), dir.display());
        Ok(store)
    }

    /// Register a capture under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, schema: RawSchema) {
        let name = name.into();
        let metadata = SnapshotMetadata {
            name: name.clone(),
            schema_version: schema.schema_version.clone(),
            table_count: schema.tables.len(),
            column_count: schema.column_count(),
            index_count: schema.index_count(),
            checksum: compute_checksum(&schema),
        };
        self.captures.insert(
            name,
            StoredCapture {
                schema: Arc::new(schema),
                metadata,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<Arc<RawSchema>> {
        self.captures.get(name).map(|c| Arc::clone(&c.schema))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.captures.contains_key(name)
    }

    /// All captures, ordered by name
    pub fn list(&self) -> Vec<SnapshotMetadata> {
        self.captures.values().map(|c| c.metadata.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }
}

/// SHA-256 over every captured row, tables in name order.
pub fn compute_checksum(schema: &RawSchema) -> String {
    let mut hasher = Sha256::new();
    for (name, table) in &schema.tables {
        hasher.update(name.as_bytes());
        for column in &table.columns {
            hasher.update(
                format!(
                    "{}:{}:{}:{:?}:{}",
                    column.name, column.declared_type, column.null, column.default, column.extra
                )
                .as_bytes(),
            );
        }
        for index in &table.indexes {
            hasher.update(
                format!(
                    "IDX:{}:{}:{}:{:?}:{:?}:{:?}",
                    index.key_name,
                    index.sequence,
                    index.column_name,
                    index.non_unique,
                    index.index_type,
                    index.comment
                )
                .as_bytes(),
            );
        }
    }
    format!("{:x}", hasher.finalize())
}
