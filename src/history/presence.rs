//! Presence Classifier
//!
//! Colours every table, column and index by whether it exists at the
//! start and end of the range, and appends an "Added in X" / "Removed in
//! X" remark for every appearance and disappearance inside it. The text
//! of those remarks comes from the curated annotations; a missing note
//! is a diagnostic and the bare "Added in X." is used instead.

use super::merge::{PivotedEntry, PivotedSchema};
use super::{Colour, TrackedField};
use crate::annotations::{Annotations, ObjectKind, Remark, Transition};
use crate::diagnostics::Diagnostics;
use crate::version::Version;
use std::collections::BTreeMap;

/// Colour from the presence list alone. Missing at the end wins over
/// missing at the start.
pub fn classify(presence: &[Version], first: &Version, last: &Version) -> Colour {
    if !presence.contains(last) {
        Colour::Removed
    } else if !presence.contains(first) {
        Colour::Added
    } else {
        Colour::Unchanged
    }
}

/// Every appearance/disappearance while walking `walk` in order.
pub fn transitions(
    walk: &[Version],
    presence: &[Version],
    initially_present: bool,
) -> Vec<(Version, Transition)> {
    let mut present = initially_present;
    let mut found = Vec::new();
    for version in walk {
        let here = presence.contains(version);
        if present && !here {
            present = false;
            found.push((version.clone(), Transition::Removed));
        } else if !present && here {
            present = true;
            found.push((version.clone(), Transition::Added));
        }
    }
    found
}

/// `<b>Added in 2.18 (note).</b>` or `<b>Added in 2.18.</b>`
pub fn make_annotation(transition: Transition, version: &Version, note: Option<&str>) -> String {
    match note {
        Some(note) => format!("<b>{} {} ({}).</b>", transition.label(), version, note),
        None => format!("<b>{} {}.</b>", transition.label(), version),
    }
}

pub struct PresenceClassifier<'a> {
    annotations: &'a Annotations,
}

impl<'a> PresenceClassifier<'a> {
    pub fn new(annotations: &'a Annotations) -> Self {
        Self { annotations }
    }

    /// Colour and annotate everything in `pivot`, and attach the curated
    /// table remarks ahead of the presence annotations.
    pub fn classify(&self, pivot: &mut PivotedSchema, diagnostics: &mut Diagnostics) {
        let (Some(first), Some(last)) = (pivot.first_version().cloned(), pivot.last_version().cloned())
        else {
            return;
        };

        for (name, table) in pivot.tables.iter_mut() {
            table.remarks = match self.annotations.table_remarks(name) {
                Some(remarks) => remarks,
                None => {
                    diagnostics.push(format!("No remark for table '{}'.", name));
                    Vec::new()
                }
            };

            table.colour = classify(&table.versions, &first, &last);
            let initially = table.versions.contains(&first);
            for (version, transition) in transitions(&pivot.versions, &table.versions, initially) {
                let note = self.note(ObjectKind::Table, transition, name, "", diagnostics);
                table
                    .remarks
                    .push(Remark::Simple(make_annotation(transition, &version, note)));
            }

            // Columns and indexes are coloured against the range but walk
            // the table's own versions.
            let bounds = (&first, &last);
            self.classify_entries(name, bounds, &table.versions, &mut table.columns, diagnostics);
            self.classify_entries(name, bounds, &table.versions, &mut table.indexes, diagnostics);
        }
    }

    fn classify_entries<F: TrackedField>(
        &self,
        table: &str,
        (first, last): (&Version, &Version),
        table_versions: &[Version],
        entries: &mut BTreeMap<String, PivotedEntry<F>>,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(table_first) = table_versions.first() else {
            return;
        };

        for (name, entry) in entries.iter_mut() {
            entry.colour = classify(&entry.versions, first, last);
            let initially = entry.versions.contains(table_first);
            for (version, transition) in transitions(table_versions, &entry.versions, initially) {
                let note = self.note(F::KIND, transition, table, name, diagnostics);
                entry
                    .remarks
                    .push(Remark::Simple(make_annotation(transition, &version, note)));
            }
        }
    }

    fn note(
        &self,
        kind: ObjectKind,
        transition: Transition,
        table: &str,
        field: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<&'a str> {
        match self.annotations.change_note(kind, transition, table, field) {
            Some(note) => note.as_deref(),
            None => {
                let what = match kind {
                    ObjectKind::Table => format!("table '{}'", table),
                    _ => kind.qualify(table, field),
                };
                diagnostics.push(format!("No remark to {} {}.", transition.verb(), what));
                None
            }
        }
    }
}
