//! Change-History Tracker: merging versions
//!
//! Pivots a run of seeded schemas (oldest first) into one structure:
//! table -> column/index -> per-field timeline, with the list of versions
//! each table, column and index appears in.
//!
//! The merge runs in two passes. The first collects every key and its
//! presence list; the second appends timelines into the entries the
//! first pass created.

use super::timeline::{SeededEntry, SeededSchema, Timeline};
use super::{ColumnField, Colour, IndexField, TrackedField};
use crate::annotations::Remark;
use crate::version::Version;
use std::collections::BTreeMap;

/// A column or index across the merged versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotedEntry<F: TrackedField> {
    /// Versions (of the merged list) this entry appears in
    pub versions: Vec<Version>,
    pub timelines: BTreeMap<F, Timeline>,
    /// Remarks of the latest version seen, plus presence annotations
    pub remarks: Vec<Remark>,
    /// Whole-row colour
    pub colour: Colour,
    /// Per-field colour; `Changed` once a value differs between versions
    pub field_colours: BTreeMap<F, Colour>,
}

impl<F: TrackedField> Default for PivotedEntry<F> {
    fn default() -> Self {
        Self {
            versions: Vec::new(),
            timelines: F::ALL.iter().map(|&f| (f, Timeline::new())).collect(),
            remarks: Vec::new(),
            colour: Colour::Unchanged,
            field_colours: F::ALL.iter().map(|&f| (f, Colour::Unchanged)).collect(),
        }
    }
}

impl<F: TrackedField> PivotedEntry<F> {
    /// Append one version's values, marking fields whose value moved.
    fn absorb(&mut self, seeded: SeededEntry<F>) {
        for (field, incoming) in seeded.timelines {
            let timeline = self.timelines.entry(field).or_default();
            if let (Some(previous), Some(next)) = (timeline.last_value(), incoming.first_value()) {
                if previous != next {
                    self.field_colours.insert(field, Colour::Changed);
                }
            }
            timeline.extend(incoming);
        }
        self.remarks = seeded.remarks;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotedTable {
    pub versions: Vec<Version>,
    pub remarks: Vec<Remark>,
    pub colour: Colour,
    pub columns: BTreeMap<String, PivotedEntry<ColumnField>>,
    pub indexes: BTreeMap<String, PivotedEntry<IndexField>>,
}

/// All tables across the merged versions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotedSchema {
    /// The merged versions, oldest first (one per distinct capture)
    pub versions: Vec<Version>,
    pub tables: BTreeMap<String, PivotedTable>,
}

impl PivotedSchema {
    pub fn first_version(&self) -> Option<&Version> {
        self.versions.first()
    }

    pub fn last_version(&self) -> Option<&Version> {
        self.versions.last()
    }
}

/// Merge seeded schemas, which must be ordered oldest first.
pub fn merge(schemas: Vec<SeededSchema>) -> PivotedSchema {
    let mut pivot = collect_keys(&schemas);

    for schema in schemas {
        for (name, table) in schema.tables {
            let Some(target) = pivot.tables.get_mut(&name) else {
                continue;
            };
            for (column, seeded) in table.columns {
                if let Some(entry) = target.columns.get_mut(&column) {
                    entry.absorb(seeded);
                }
            }
            for (index, seeded) in table.indexes {
                if let Some(entry) = target.indexes.get_mut(&index) {
                    entry.absorb(seeded);
                }
            }
        }
    }
    pivot
}

/// First pass: every table/column/index key and the versions it is in.
fn collect_keys(schemas: &[SeededSchema]) -> PivotedSchema {
    let mut pivot = PivotedSchema::default();

    for schema in schemas {
        debug_assert!(
            pivot.versions.last().map_or(true, |v| v < &schema.version),
            "schemas must be merged oldest first"
        );
        pivot.versions.push(schema.version.clone());

        for (name, table) in &schema.tables {
            let target = pivot.tables.entry(name.clone()).or_default();
            target.versions.push(schema.version.clone());
            for column in table.columns.keys() {
                target
                    .columns
                    .entry(column.clone())
                    .or_default()
                    .versions
                    .push(schema.version.clone());
            }
            for index in table.indexes.keys() {
                target
                    .indexes
                    .entry(index.clone())
                    .or_default()
                    .versions
                    .push(schema.version.clone());
            }
        }
    }
    pivot
}
