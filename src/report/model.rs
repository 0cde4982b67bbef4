//! Report data handed to renderers
//!
//! Every field is already a display string; colours say how each table,
//! row and cell changed over the range.

use crate::annotations::ReleaseNote;
use crate::history::{ColumnField, Colour, IndexField};
use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    pub first_version: Version,
    pub last_version: Version,
    /// Every version the report describes, oldest first
    pub versions: Vec<Version>,
    pub generated_at: DateTime<Utc>,
    pub tables: Vec<TableReport>,
    pub releases: Vec<ReleaseEntry>,
    pub summary: ReportSummary,
}

impl SchemaReport {
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// "version 3.0" or "versions 2.18, 2.20 and 3.0"
    pub fn version_phrase(&self) -> String {
        match self.versions.as_slice() {
            [] => String::new(),
            [only] => format!("version {}", only),
            [init @ .., last] => format!(
                "versions {} and {}",
                init.iter().map(Version::as_str).collect::<Vec<_>>().join(", "),
                last
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    pub name: String,
    pub colour: Colour,
    pub remarks: Vec<String>,
    /// Merged versions this table appears in
    pub versions: Vec<Version>,
    /// Sorted by canonical name
    pub columns: Vec<ColumnReport>,
    /// `PRIMARY` first, then by name
    pub indexes: Vec<IndexReport>,
}

impl TableReport {
    pub fn column(&self, key: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn index(&self, key: &str) -> Option<&IndexReport> {
        self.indexes.iter().find(|i| i.key == key)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnReport {
    /// Canonical name; anchors and cross references use this
    pub key: String,
    /// Captured name history
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
    pub default: String,
    pub properties: String,
    pub remarks: Vec<String>,
    pub colour: Colour,
    pub field_colours: BTreeMap<ColumnField, Colour>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReport {
    pub key: String,
    pub name: String,
    pub fields: String,
    pub properties: String,
    pub remarks: Vec<String>,
    pub colour: Colour,
    pub field_colours: BTreeMap<IndexField, Colour>,
}

/// A row of the release table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEntry {
    pub version: Version,
    pub date: String,
    pub remark: String,
    pub described: bool,
}

impl ReleaseEntry {
    pub fn from_note(note: &ReleaseNote, versions: &[Version]) -> Self {
        let described = versions.contains(&note.version);
        let remark = if described {
            note.remark.clone()
        } else {
            format!("{} Not described in this document.", note.remark)
                .trim_start()
                .to_string()
        };
        Self {
            version: note.version.clone(),
            date: note.date.clone(),
            remark,
            described,
        }
    }
}

/// Counts by colour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub tables: usize,
    pub tables_added: usize,
    pub tables_removed: usize,
    pub columns_added: usize,
    pub columns_removed: usize,
    pub columns_changed: usize,
    pub indexes_added: usize,
    pub indexes_removed: usize,
    pub indexes_changed: usize,
}

impl ReportSummary {
    pub fn from_tables(tables: &[TableReport]) -> Self {
        let mut summary = ReportSummary {
            tables: tables.len(),
            ..Default::default()
        };
        for table in tables {
            match table.colour {
                Colour::Added => summary.tables_added += 1,
                Colour::Removed => summary.tables_removed += 1,
                _ => {}
            }
            for column in &table.columns {
                match column.colour {
                    Colour::Added => summary.columns_added += 1,
                    Colour::Removed => summary.columns_removed += 1,
                    _ if column.field_colours.values().any(|c| *c == Colour::Changed) => {
                        summary.columns_changed += 1
                    }
                    _ => {}
                }
            }
            for index in &table.indexes {
                match index.colour {
                    Colour::Added => summary.indexes_added += 1,
                    Colour::Removed => summary.indexes_removed += 1,
                    _ if index.field_colours.values().any(|c| *c == Colour::Changed) => {
                        summary.indexes_changed += 1
                    }
                    _ => {}
                }
            }
        }
        summary
    }

    pub fn total_changes(&self) -> usize {
        self.tables_added
            + self.tables_removed
            + self.columns_added
            + self.columns_removed
            + self.columns_changed
            + self.indexes_added
            + self.indexes_removed
            + self.indexes_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_release_entry_outside_range() {
        let note = ReleaseNote {
            version: v("2.14.1"),
            date: "2002-01-05".to_string(),
            remark: "A security patch release.".to_string(),
        };
        let inside = ReleaseEntry::from_note(&note, &[v("2.14.1")]);
        let outside = ReleaseEntry::from_note(&note, &[v("2.16")]);

        assert!(inside.described);
        assert_eq!(inside.remark, "A security patch release.");
        assert!(!outside.described);
        assert_eq!(outside.remark, "A security patch release. Not described in this document.");

        let bare = ReleaseNote {
            remark: String::new(),
            ..note
        };
        assert_eq!(ReleaseEntry::from_note(&bare, &[]).remark, "Not described in this document.");
    }
}
