//! Change-History Tracker: per-version seeding
//!
//! Before versions can be merged, every tracked field of every column and
//! index is turned from a bare value into a one-entry timeline
//! `[(version, value)]`.

use super::normalize::{ColumnRecord, IndexRecord, NormalizedSchema};
use super::{ColumnField, IndexField, TrackedField};
use crate::annotations::Remark;
use crate::version::Version;
use serde::Serialize;
use std::collections::BTreeMap;

/// Observed values of one field, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline(Vec<(Version, String)>);

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(version: &Version, value: impl Into<String>) -> Self {
        Self(vec![(version.clone(), value.into())])
    }

    pub fn first_value(&self) -> Option<&str> {
        self.0.first().map(|(_, v)| v.as_str())
    }

    pub fn last_value(&self) -> Option<&str> {
        self.0.last().map(|(_, v)| v.as_str())
    }

    /// Append a later timeline. Entries must not go back in time.
    pub fn extend(&mut self, later: Timeline) {
        debug_assert!(
            match (self.0.last(), later.0.first()) {
                (Some((a, _)), Some((b, _))) => a <= b,
                _ => true,
            },
            "timeline entries out of version order"
        );
        self.0.extend(later.0);
    }

    pub fn entries(&self) -> &[(Version, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<(Version, String)>> for Timeline {
    fn from(entries: Vec<(Version, String)>) -> Self {
        Self(entries)
    }
}

/// A column or index of one version with its fields as timelines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededEntry<F: TrackedField> {
    pub timelines: BTreeMap<F, Timeline>,
    pub remarks: Vec<Remark>,
}

impl SeededEntry<ColumnField> {
    pub fn from_column(version: &Version, record: ColumnRecord) -> Self {
        let timelines = ColumnField::ALL
            .iter()
            .map(|&field| (field, Timeline::seed(version, record.value(field))))
            .collect();
        Self {
            timelines,
            remarks: record.remarks,
        }
    }
}

impl SeededEntry<IndexField> {
    pub fn from_index(version: &Version, record: IndexRecord) -> Self {
        let timelines = IndexField::ALL
            .iter()
            .map(|&field| (field, Timeline::seed(version, record.value(field))))
            .collect();
        Self {
            timelines,
            remarks: record.remarks,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeededTable {
    pub columns: BTreeMap<String, SeededEntry<ColumnField>>,
    pub indexes: BTreeMap<String, SeededEntry<IndexField>>,
}

/// One version's schema, ready to merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededSchema {
    pub version: Version,
    pub tables: BTreeMap<String, SeededTable>,
}

pub fn seed_schema(version: &Version, schema: NormalizedSchema) -> SeededSchema {
    let tables = schema
        .into_iter()
        .map(|(name, table)| {
            let seeded = SeededTable {
                columns: table
                    .columns
                    .into_iter()
                    .map(|(c, record)| (c, SeededEntry::from_column(version, record)))
                    .collect(),
                indexes: table
                    .indexes
                    .into_iter()
                    .map(|(i, record)| (i, SeededEntry::from_index(version, record)))
                    .collect(),
            };
            (name, seeded)
        })
        .collect();

    SeededSchema {
        version: version.clone(),
        tables,
    }
}
