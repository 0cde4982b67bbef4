//! Curated Annotations
//!
//! Human-maintained data that the engine only reads: the ordered list
//! of known versions, which schema capture each version uses, remarks
//! on tables/columns/indexes, notes explaining additions and removals,
//! and the rename maps that give columns and indexes a canonical name.

pub mod remark;
pub mod span;

pub use remark::{Remark, RemarkEntry};
pub use span::{SpanCache, VersionSpan};

use crate::error::AppError;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// `table -> field -> value`
pub type FieldMap<T> = BTreeMap<String, BTreeMap<String, T>>;

/// A note explaining an addition or removal. `None` means the change is
/// acknowledged but needs no extra words.
pub type ChangeNote = Option<String>;

/// The kind of schema object an annotation talks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Table,
    Column,
    Index,
}

impl ObjectKind {
    /// How `table` and a field name are joined in messages.
    pub fn qualify(self, table: &str, field: &str) -> String {
        match self {
            ObjectKind::Table => table.to_string(),
            ObjectKind::Column => format!("{}.{}", table, field),
            ObjectKind::Index => format!("{}:{}", table, field),
        }
    }
}

/// Whether an object appeared or disappeared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Added,
    Removed,
}

impl Transition {
    pub fn verb(self) -> &'static str {
        match self {
            Transition::Added => "add",
            Transition::Removed => "remove",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Transition::Added => "Added in",
            Transition::Removed => "Removed in",
        }
    }
}

/// One row of the release table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNote {
    pub version: Version,
    pub date: String,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub version_order: Vec<Version>,
    pub version_schema_map: BTreeMap<String, String>,
    pub default_first_version: Option<Version>,
    pub default_last_version: Option<Version>,
    pub version_remarks: Vec<ReleaseNote>,

    pub table_remark: BTreeMap<String, Option<RemarkEntry>>,
    pub table_added_remark: BTreeMap<String, ChangeNote>,
    pub table_removed_remark: BTreeMap<String, ChangeNote>,

    pub column_remark: FieldMap<Option<RemarkEntry>>,
    pub column_renamed: FieldMap<String>,
    pub column_added_remark: FieldMap<ChangeNote>,
    pub column_removed_remark: FieldMap<ChangeNote>,

    pub index_remark: FieldMap<Option<RemarkEntry>>,
    pub index_renamed: FieldMap<String>,
    pub index_added_remark: FieldMap<ChangeNote>,
    pub index_removed_remark: FieldMap<ChangeNote>,
}

impl Annotations {
    /// Load and validate the annotation document.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read annotations {}: {}", path.display(), e))
        })?;
        let annotations: Annotations = serde_json::from_str(&text).map_err(|e| {
            AppError::Config(format!("Cannot parse annotations {}: {}", path.display(), e))
        })?;
        annotations.validate()?;

        info!(
            "Loaded annotations: {} versions, {} tables with remarks",
            annotations.version_order.len(),
            annotations.table_remark.len()
        );
        Ok(annotations)
    }

    /// The version list must be strictly increasing and the default range
    /// must name known versions.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(pair) = self.version_order.windows(2).find(|p| p[0] >= p[1]) {
            return Err(AppError::Config(format!(
                "version_order is not increasing: '{}' is listed before '{}'",
                pair[0], pair[1]
            )));
        }
        for default in [&self.default_first_version, &self.default_last_version]
            .into_iter()
            .flatten()
        {
            if self.position(default.as_str()).is_none() {
                return Err(AppError::Config(format!(
                    "default version '{}' is not in version_order",
                    default
                )));
            }
        }
        Ok(())
    }

    pub fn position(&self, version: &str) -> Option<usize> {
        self.version_order.iter().position(|v| v.as_str() == version)
    }

    pub fn schema_for(&self, version: &Version) -> Option<&str> {
        self.version_schema_map.get(version.as_str()).map(String::as_str)
    }

    /// The default report range: configured bounds, else the whole list.
    pub fn default_range(&self) -> Option<(Version, Version)> {
        let first = self
            .default_first_version
            .clone()
            .or_else(|| self.version_order.first().cloned())?;
        let last = self
            .default_last_version
            .clone()
            .or_else(|| self.version_order.last().cloned())?;
        Some((first, last))
    }

    pub fn canonical_column<'a>(&'a self, table: &str, name: &'a str) -> &'a str {
        canonical(&self.column_renamed, table, name)
    }

    pub fn canonical_index<'a>(&'a self, table: &str, name: &'a str) -> &'a str {
        canonical(&self.index_renamed, table, name)
    }

    /// Curated remarks for a table. Outer `None`: the table is unknown.
    pub fn table_remarks(&self, table: &str) -> Option<Vec<Remark>> {
        self.table_remark
            .get(table)
            .map(|entry| entry.clone().map(|e| e.0).unwrap_or_default())
    }

    /// Per-field remark map for a table, by object kind.
    pub fn field_remarks(&self, kind: ObjectKind, table: &str) -> Option<&BTreeMap<String, Option<RemarkEntry>>> {
        match kind {
            ObjectKind::Column => self.column_remark.get(table),
            ObjectKind::Index => self.index_remark.get(table),
            ObjectKind::Table => None,
        }
    }

    /// Note for a presence transition. Outer `None`: nobody annotated it.
    pub fn change_note(
        &self,
        kind: ObjectKind,
        transition: Transition,
        table: &str,
        field: &str,
    ) -> Option<&ChangeNote> {
        match (kind, transition) {
            (ObjectKind::Table, Transition::Added) => self.table_added_remark.get(table),
            (ObjectKind::Table, Transition::Removed) => self.table_removed_remark.get(table),
            (ObjectKind::Column, Transition::Added) => scoped(&self.column_added_remark, table, field),
            (ObjectKind::Column, Transition::Removed) => scoped(&self.column_removed_remark, table, field),
            (ObjectKind::Index, Transition::Added) => scoped(&self.index_added_remark, table, field),
            (ObjectKind::Index, Transition::Removed) => scoped(&self.index_removed_remark, table, field),
        }
    }
}

fn scoped<'a>(map: &'a FieldMap<ChangeNote>, table: &str, field: &str) -> Option<&'a ChangeNote> {
    map.get(table)?.get(field)
}

fn canonical<'a>(renamed: &'a FieldMap<String>, table: &str, name: &'a str) -> &'a str {
    renamed
        .get(table)
        .and_then(|m| m.get(name))
        .map(String::as_str)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn test_document_decodes() {
        let annotations: Annotations = serde_json::from_str(
            r#"{
                "version_order": ["2.16", "2.18", "3.0"],
                "version_schema_map": {"2.16": "2.16", "2.18": "2.18", "3.0": "2.18"},
                "table_remark": {"bugs": "The bugs.", "votes": null},
                "table_added_remark": {"votes": null, "flags": "replaces attachstatuses"},
                "column_remark": {"bugs": {"bug_id": ["The bug ID.", ["2.18", null, "%(VERSION_STRING)sAuto."]]}},
                "column_renamed": {"votes": {"vote_count": "count"}}
            }"#,
        )
        .unwrap();

        annotations.validate().unwrap();
        assert_eq!(annotations.table_remarks("votes"), Some(vec![]));
        assert_eq!(annotations.table_remarks("bugs"), Some(vec![Remark::simple("The bugs.")]));
        assert_eq!(annotations.table_remarks("nope"), None);
        assert_eq!(annotations.canonical_column("votes", "vote_count"), "count");
        assert_eq!(annotations.canonical_column("votes", "who"), "who");
        assert_eq!(
            annotations.change_note(ObjectKind::Table, Transition::Added, "flags", ""),
            Some(&Some("replaces attachstatuses".to_string()))
        );
        assert_eq!(annotations.change_note(ObjectKind::Table, Transition::Added, "votes", ""), Some(&None));
        assert_eq!(annotations.change_note(ObjectKind::Table, Transition::Removed, "votes", ""), None);

        let remarks = annotations.field_remarks(ObjectKind::Column, "bugs").unwrap();
        assert_eq!(remarks["bug_id"].as_ref().unwrap().0.len(), 2);
    }

    #[test]
    fn test_unordered_versions_rejected() {
        let mut annotations = testutil::annotations();
        annotations.version_order = testutil::versions(&["2.16", "2.16rc1"]);
        assert!(matches!(annotations.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_default_range_falls_back_to_whole_list() {
        let annotations = testutil::annotations();
        let (first, last) = annotations.default_range().unwrap();
        assert_eq!(first.as_str(), "1.0");
        assert_eq!(last.as_str(), "2.0");
    }

    #[test]
    fn test_qualified_names() {
        assert_eq!(ObjectKind::Column.qualify("bugs", "bug_id"), "bugs.bug_id");
        assert_eq!(ObjectKind::Index.qualify("bugs", "PRIMARY"), "bugs:PRIMARY");
        assert_eq!(ObjectKind::Table.qualify("bugs", ""), "bugs");
    }
}
