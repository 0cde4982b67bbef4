//! Schema Normalizer
//!
//! Reduces one version's raw capture to canonical column and index
//! records. Cosmetic differences between server versions (display
//! widths on integer types, how empty defaults are reported, quoting
//! inside enum declarations) are folded away here so that only real
//! schema changes survive into the history.

use super::TrackedField;
use super::{ColumnField, IndexField};
use crate::annotations::{Annotations, ObjectKind, Remark, RemarkEntry};
use crate::diagnostics::Diagnostics;
use crate::snapshot::{RawColumn, RawIndex, RawSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Integer types as reported with their default display width.
const TYPE_SYNONYMS: &[(&str, &str)] = &[
    ("smallint(6)", "smallint"),
    ("mediumint(9)", "mediumint"),
    ("tinyint(4)", "tinyint"),
    ("int(11)", "int"),
    ("bigint(20)", "bigint"),
];

/// Foreign key constraints show up in `show index` but are not indexes.
static FOREIGN_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^fk_").expect("foreign key pattern is valid"));

pub const ZERO_DATETIME: &str = "0000-00-00 00:00:00";

/// A column as seen in one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRecord {
    /// Name as captured (may differ from the canonical key)
    pub name: String,
    pub sql_type: String,
    pub default: String,
    pub properties: String,
    pub remarks: Vec<Remark>,
}

impl ColumnRecord {
    pub fn value(&self, field: ColumnField) -> &str {
        match field {
            ColumnField::Name => &self.name,
            ColumnField::Type => &self.sql_type,
            ColumnField::Default => &self.default,
            ColumnField::Properties => &self.properties,
        }
    }
}

/// An index as seen in one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRecord {
    /// Key name as captured (may differ from the canonical key)
    pub name: String,
    /// Indexed columns in index order, comma separated
    pub fields: String,
    pub properties: String,
    pub remarks: Vec<Remark>,
}

impl IndexRecord {
    pub fn value(&self, field: IndexField) -> &str {
        match field {
            IndexField::Name => &self.name,
            IndexField::Fields => &self.fields,
            IndexField::Properties => &self.properties,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedTable {
    pub columns: BTreeMap<String, ColumnRecord>,
    pub indexes: BTreeMap<String, IndexRecord>,
}

/// table name -> canonical records
pub type NormalizedSchema = BTreeMap<String, NormalizedTable>;

/// Fold a reported type into its canonical spelling.
pub fn normalize_type(declared: &str) -> String {
    if let Some((_, canonical)) = TYPE_SYNONYMS.iter().find(|(raw, _)| *raw == declared) {
        return canonical.to_string();
    }
    if declared.starts_with("enum") {
        return declared.replace("','", "', '");
    }
    declared.to_string()
}

/// Normalize a reported default for a column of (canonical) `sql_type`.
///
/// Newer servers report numeric and datetime defaults as `''` where
/// older ones gave the value; both mean the same schema.
pub fn normalize_default(sql_type: &str, default: Option<&str>) -> String {
    let Some(default) = default else {
        return "None".to_string();
    };

    if sql_type.ends_with("int") && default.is_empty() {
        return "0".to_string();
    }
    if sql_type == "datetime" && default.is_empty() {
        return ZERO_DATETIME.to_string();
    }
    if sql_type.starts_with("decimal")
        && (default.is_empty() || default.parse::<f64>().map_or(false, |f| f == 0.0))
    {
        return "0.0".to_string();
    }
    if default.is_empty() {
        return "''".to_string();
    }
    default.to_string()
}

/// Most columns are NOT NULL, so nullability is the property called out.
pub fn column_properties(nullable: bool, extra: &str) -> String {
    match (nullable, extra.is_empty()) {
        (true, true) => "null".to_string(),
        (true, false) => format!("{}, null", extra),
        (false, true) => "-".to_string(),
        (false, false) => extra.to_string(),
    }
}

/// Normalizes captures against the curated annotations
pub struct Normalizer<'a> {
    annotations: &'a Annotations,
}

impl<'a> Normalizer<'a> {
    pub fn new(annotations: &'a Annotations) -> Self {
        Self { annotations }
    }

    pub fn normalize(&self, raw: &RawSchema, diagnostics: &mut Diagnostics) -> NormalizedSchema {
        debug!(
            "Normalizing capture of {} ({} tables)",
            raw.schema_version,
            raw.tables.len()
        );
        raw.tables
            .iter()
            .map(|(name, table)| {
                let normalized = NormalizedTable {
                    columns: self.reduce_columns(name, &table.columns, diagnostics),
                    indexes: self.reduce_indexes(name, &table.indexes, diagnostics),
                };
                (name.clone(), normalized)
            })
            .collect()
    }

    pub fn reduce_columns(
        &self,
        table: &str,
        description: &[RawColumn],
        diagnostics: &mut Diagnostics,
    ) -> BTreeMap<String, ColumnRecord> {
        let remarks = self.remark_map::<ColumnField>(table, diagnostics);

        description
            .iter()
            .map(|raw| {
                let sql_type = normalize_type(&raw.declared_type);
                let default = normalize_default(&sql_type, raw.default.as_deref());
                let canonical = self.annotations.canonical_column(table, &raw.name).to_string();
                let record = ColumnRecord {
                    name: raw.name.clone(),
                    default,
                    properties: column_properties(raw.nullable(), &raw.extra),
                    sql_type,
                    remarks: lookup_remarks(remarks, ObjectKind::Column, table, &canonical, diagnostics),
                };
                (canonical, record)
            })
            .collect()
    }

    pub fn reduce_indexes(
        &self,
        table: &str,
        rows: &[RawIndex],
        diagnostics: &mut Diagnostics,
    ) -> BTreeMap<String, IndexRecord> {
        let remarks = self.remark_map::<IndexField>(table, diagnostics);
        // Fields by sequence; a repeated sequence keeps the last row.
        let mut grouped: BTreeMap<String, (IndexRecord, BTreeMap<u32, &str>)> = BTreeMap::new();

        for row in rows {
            if FOREIGN_KEY_RE.is_match(&row.key_name) {
                continue;
            }
            let canonical = self.annotations.canonical_index(table, &row.key_name);

            if let Some((_, fields)) = grouped.get_mut(canonical) {
                fields.insert(row.sequence, row.column_name.as_str());
                continue;
            }

            let mut properties = Vec::new();
            if row.is_unique() {
                properties.push("unique");
            }
            if row.is_full_text() {
                properties.push("full text");
            }
            let record = IndexRecord {
                name: row.key_name.clone(),
                fields: String::new(),
                properties: properties.join(", "),
                remarks: lookup_remarks(remarks, ObjectKind::Index, table, canonical, diagnostics),
            };
            grouped.insert(
                canonical.to_string(),
                (record, BTreeMap::from([(row.sequence, row.column_name.as_str())])),
            );
        }

        grouped
            .into_iter()
            .map(|(name, (mut record, fields))| {
                record.fields = fields.into_values().collect::<Vec<_>>().join(", ");
                (name, record)
            })
            .collect()
    }

    fn remark_map<F: TrackedField>(
        &self,
        table: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<&'a BTreeMap<String, Option<RemarkEntry>>> {
        let map = self.annotations.field_remarks(F::KIND, table);
        if map.is_none() {
            let noun = match F::KIND {
                ObjectKind::Index => "index",
                _ => "column",
            };
            diagnostics.push(format!("No {} remarks for table '{}'.", noun, table));
        }
        map
    }
}

fn lookup_remarks(
    remarks: Option<&BTreeMap<String, Option<RemarkEntry>>>,
    kind: ObjectKind,
    table: &str,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<Remark> {
    match remarks.and_then(|m| m.get(name)) {
        Some(entry) => entry.clone().map(|e| e.0).unwrap_or_default(),
        None => {
            let noun = if kind == ObjectKind::Index { "index" } else { "column" };
            diagnostics.push(format!("Table '{}' has no remark for {} '{}'.", table, noun, name));
            Vec::new()
        }
    }
}
