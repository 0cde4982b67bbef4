//! Raw schema captures
//!
//! A capture is what `describe <table>` and `show index from <table>`
//! returned for every table of one installation, stored verbatim. The
//! field names follow the MySQL result columns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything captured for one schema version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSchema {
    /// The version the capture was taken from
    #[serde(default)]
    pub schema_version: String,
    pub tables: BTreeMap<String, RawTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    #[serde(default)]
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub indexes: Vec<RawIndex>,
}

/// One row of `describe <table>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    #[serde(rename = "Field")]
    pub name: String,
    #[serde(rename = "Type")]
    pub declared_type: String,
    /// `"YES"` when the column is nullable
    #[serde(rename = "Null", default)]
    pub null: String,
    #[serde(rename = "Key", default)]
    pub key: String,
    #[serde(rename = "Default", default)]
    pub default: Option<String>,
    #[serde(rename = "Extra", default)]
    pub extra: String,
}

impl RawColumn {
    pub fn nullable(&self) -> bool {
        self.null == "YES"
    }
}

/// One row of `show index from <table>`; one row per indexed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIndex {
    #[serde(rename = "Key_name")]
    pub key_name: String,
    #[serde(rename = "Seq_in_index")]
    pub sequence: u32,
    #[serde(rename = "Column_name")]
    pub column_name: String,
    #[serde(rename = "Non_unique", default)]
    pub non_unique: Option<i64>,
    #[serde(rename = "Index_type", default)]
    pub index_type: Option<String>,
    #[serde(rename = "Comment", default)]
    pub comment: Option<String>,
}

impl RawIndex {
    /// Older servers report no `Non_unique` flag; treat that as non-unique.
    pub fn is_unique(&self) -> bool {
        self.non_unique.unwrap_or(1) == 0
    }

    /// Older servers put the index kind in `Comment`.
    pub fn is_full_text(&self) -> bool {
        self.index_type.as_deref().or(self.comment.as_deref()) == Some("FULLTEXT")
    }
}

impl RawSchema {
    pub fn column_count(&self) -> usize {
        self.tables.values().map(|t| t.columns.len()).sum()
    }

    /// Logical indexes, counting each key name once.
    pub fn index_count(&self) -> usize {
        self.tables
            .values()
            .map(|t| {
                let mut names: Vec<&str> = t.indexes.iter().map(|i| i.key_name.as_str()).collect();
                names.sort_unstable();
                names.dedup();
                names.len()
            })
            .sum()
    }
}
