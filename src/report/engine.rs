//! Report Engine
//!
//! Builds the versioned schema for a range of versions: validate the
//! range, load one capture per distinct schema, normalize, seed, merge,
//! classify and compress. Anything the curated annotations fail to cover
//! is collected as diagnostics, and `generate` refuses to return a report
//! while any remain.

use super::model::{ColumnReport, IndexReport, ReleaseEntry, ReportSummary, SchemaReport, TableReport};
use crate::annotations::remark::resolve_all;
use crate::annotations::{Annotations, SpanCache};
use crate::diagnostics::Diagnostics;
use crate::error::AppError;
use crate::history::merge::{PivotedEntry, PivotedTable};
use crate::history::{
    merge, seed_schema, stringify_pairs, stringify_type, ColumnField, IndexField, Normalizer,
    PresenceClassifier, SeededSchema, Timeline,
};
use crate::snapshot::SnapshotStore;
use crate::version::Version;
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One version to load, and the capture it uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCapture {
    pub version: Version,
    pub schema: String,
}

/// The validated range: every version in it, and the captures to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePlan {
    pub versions: Vec<Version>,
    pub captures: Vec<PlannedCapture>,
}

pub struct ReportEngine<'a> {
    annotations: &'a Annotations,
    snapshots: &'a SnapshotStore,
    spans: &'a SpanCache,
}

impl<'a> ReportEngine<'a> {
    pub fn new(annotations: &'a Annotations, snapshots: &'a SnapshotStore, spans: &'a SpanCache) -> Self {
        Self {
            annotations,
            snapshots,
            spans,
        }
    }

    /// Validate `first..=last` and work out which captures to load.
    /// Consecutive versions sharing a capture are loaded once, under the
    /// earliest of them.
    pub fn plan(&self, first: &str, last: &str) -> Result<RangePlan, AppError> {
        let start = self
            .annotations
            .position(first)
            .ok_or_else(|| AppError::UnknownVersion(first.to_string()))?;
        let end = self
            .annotations
            .position(last)
            .ok_or_else(|| AppError::UnknownVersion(last.to_string()))?;
        if end < start {
            return Err(AppError::InvertedRange {
                first: first.to_string(),
                last: last.to_string(),
            });
        }

        let versions = self.annotations.version_order[start..=end].to_vec();
        let mut captures: Vec<PlannedCapture> = Vec::new();
        for version in &versions {
            let schema = self
                .annotations
                .schema_for(version)
                .ok_or_else(|| AppError::MissingSchemaMapping(version.to_string()))?;
            if captures.last().is_some_and(|c| c.schema == schema) {
                continue;
            }
            captures.push(PlannedCapture {
                version: version.clone(),
                schema: schema.to_string(),
            });
        }

        Ok(RangePlan { versions, captures })
    }

    /// Build the report and return it with whatever diagnostics arose.
    pub fn build(&self, first: &str, last: &str) -> Result<(SchemaReport, Diagnostics), AppError> {
        let plan = self.plan(first, last)?;
        let mut diagnostics = Diagnostics::new();
        let normalizer = Normalizer::new(self.annotations);

        let seeded = plan
            .captures
            .iter()
            .map(|capture| -> Result<SeededSchema, AppError> {
                let raw = self.snapshots.get(&capture.schema).ok_or_else(|| {
                    AppError::MissingSnapshot {
                        version: capture.version.to_string(),
                        schema: capture.schema.clone(),
                    }
                })?;
                debug!("Processing {} (capture {})", capture.version, capture.schema);
                let normalized = normalizer.normalize(&raw, &mut diagnostics);
                Ok(seed_schema(&capture.version, normalized))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut pivot = merge(seeded);
        PresenceClassifier::new(self.annotations).classify(&mut pivot, &mut diagnostics);

        let tables: Vec<TableReport> = pivot
            .tables
            .into_iter()
            .map(|(name, table)| self.table_report(name, table, &plan.versions))
            .collect();

        info!(
            "Built schema report {}..{}: {} versions, {} captures, {} tables, {} diagnostics",
            first,
            last,
            plan.versions.len(),
            plan.captures.len(),
            tables.len(),
            diagnostics.len()
        );

        let releases = self
            .annotations
            .version_remarks
            .iter()
            .map(|note| ReleaseEntry::from_note(note, &plan.versions))
            .collect();
        let summary = ReportSummary::from_tables(&tables);

        let report = SchemaReport {
            first_version: plan.versions[0].clone(),
            last_version: plan.versions[plan.versions.len() - 1].clone(),
            versions: plan.versions,
            generated_at: Utc::now(),
            tables,
            releases,
            summary,
        };
        Ok((report, diagnostics))
    }

    /// Build the report; any diagnostic fails the whole request.
    pub fn generate(&self, first: &str, last: &str) -> Result<SchemaReport, AppError> {
        let (report, diagnostics) = self.build(first, last)?;
        if !diagnostics.is_empty() {
            return Err(AppError::Incomplete(diagnostics));
        }
        Ok(report)
    }

    fn table_report(&self, name: String, table: PivotedTable, versions: &[Version]) -> TableReport {
        let columns = table
            .columns
            .into_iter()
            .map(|(key, entry)| self.column_report(key, entry, versions))
            .collect();

        let mut indexes: Vec<IndexReport> = table
            .indexes
            .into_iter()
            .map(|(key, entry)| self.index_report(key, entry, versions))
            .collect();
        // BTreeMap order is alphabetical already; only PRIMARY moves.
        indexes.sort_by_key(|i| i.key != "PRIMARY");

        TableReport {
            remarks: resolve_all(&table.remarks, versions, self.spans),
            name,
            colour: table.colour,
            versions: table.versions,
            columns,
            indexes,
        }
    }

    fn column_report(&self, key: String, mut entry: PivotedEntry<ColumnField>, versions: &[Version]) -> ColumnReport {
        let mut take = |field| stringify_pairs(take_timeline(&mut entry.timelines, field).entries());
        let name = take(ColumnField::Name);
        let default = take(ColumnField::Default);
        let properties = take(ColumnField::Properties);
        let sql_type = stringify_type(take_timeline(&mut entry.timelines, ColumnField::Type).entries());

        ColumnReport {
            key,
            name,
            sql_type,
            default,
            properties,
            remarks: resolve_all(&entry.remarks, versions, self.spans),
            colour: entry.colour,
            field_colours: entry.field_colours,
        }
    }

    fn index_report(&self, key: String, mut entry: PivotedEntry<IndexField>, versions: &[Version]) -> IndexReport {
        let mut take = |field| stringify_pairs(take_timeline(&mut entry.timelines, field).entries());
        let name = take(IndexField::Name);
        let fields = take(IndexField::Fields);
        let properties = take(IndexField::Properties);

        IndexReport {
            key,
            name,
            fields,
            properties,
            remarks: resolve_all(&entry.remarks, versions, self.spans),
            colour: entry.colour,
            field_colours: entry.field_colours,
        }
    }
}

fn take_timeline<F: Ord>(timelines: &mut BTreeMap<F, Timeline>, field: F) -> Timeline {
    timelines.remove(&field).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Remark, RemarkEntry};
    use crate::history::Colour;
    use crate::testutil;
    use pretty_assertions::assert_eq;

    fn engine_parts() -> (Annotations, SnapshotStore, SpanCache) {
        (testutil::annotations(), testutil::store(), SpanCache::new())
    }

    #[test]
    fn test_end_to_end_widgets_and_gadgets() {
        let (annotations, store, spans) = engine_parts();
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let report = engine.generate("1.0", "2.0").unwrap();

        assert_eq!(report.first_version.as_str(), "1.0");
        assert_eq!(report.last_version.as_str(), "2.0");
        let names: Vec<&str> = report.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["gadgets", "widgets"]);

        let widgets = report.table("widgets").unwrap();
        assert_eq!(widgets.colour, Colour::Unchanged);
        assert_eq!(widgets.columns.len(), 2);

        let id = widgets.column("id").unwrap();
        assert_eq!(id.colour, Colour::Unchanged);
        assert_eq!(id.sql_type, "int");
        assert_eq!(id.properties, "auto_increment");
        assert_eq!(id.remarks, vec!["The widget ID.".to_string()]);

        let name = widgets.column("name").unwrap();
        assert_eq!(name.colour, Colour::Added);
        assert_eq!(name.default, "''");
        assert_eq!(
            name.remarks,
            vec![
                "The widget name.".to_string(),
                "<b>Added in 2.0 (so widgets can be found by name).</b>".to_string(),
            ]
        );

        let gadgets = report.table("gadgets").unwrap();
        assert_eq!(gadgets.colour, Colour::Added);
        assert_eq!(
            gadgets.remarks,
            vec![
                "Gadgets.".to_string(),
                "<b>Added in 2.0 (A new table for gadgets).</b>".to_string(),
            ]
        );
        // Columns of a new table share its colour but are not annotated one by one.
        let gadget_id = gadgets.column("id").unwrap();
        assert_eq!(gadget_id.colour, Colour::Added);
        assert_eq!(gadget_id.remarks, vec!["The gadget ID.".to_string()]);
        assert_eq!(gadgets.index("PRIMARY").unwrap().colour, Colour::Added);

        assert_eq!(report.summary.tables_added, 1);
        assert_eq!(report.summary.columns_added, 2);
        assert_eq!(report.summary.indexes_added, 1);
        assert_eq!(report.summary.total_changes(), 4);
    }

    #[test]
    fn test_missing_add_annotation_fails_run() {
        let (mut annotations, store, spans) = engine_parts();
        annotations.table_added_remark.remove("gadgets");
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let (report, diagnostics) = engine.build("1.0", "2.0").unwrap();
        assert_eq!(
            report.table("gadgets").unwrap().remarks.last().map(String::as_str),
            Some("<b>Added in 2.0.</b>")
        );
        assert_eq!(diagnostics.into_vec(), vec!["No remark to add table 'gadgets'.".to_string()]);

        match engine.generate("1.0", "2.0") {
            Err(AppError::Incomplete(diags)) => assert!(diags.joined("\n").contains("gadgets")),
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_column_annotation_fails_run() {
        let (mut annotations, store, spans) = engine_parts();
        annotations.column_added_remark.clear();
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let err = engine.generate("1.0", "2.0").unwrap_err();
        assert!(err.to_string().contains("No remark to add widgets.name."), "{err}");
    }

    #[test]
    fn test_single_version_report() {
        let (annotations, store, spans) = engine_parts();
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let report = engine.generate("2.0", "2.0").unwrap();
        assert_eq!(report.version_phrase(), "version 2.0");
        let widgets = report.table("widgets").unwrap();
        assert!(widgets.columns.iter().all(|c| c.colour == Colour::Unchanged));
        assert_eq!(widgets.column("name").unwrap().remarks, vec!["The widget name.".to_string()]);
    }

    #[test]
    fn test_range_validation() {
        let (annotations, store, spans) = engine_parts();
        let engine = ReportEngine::new(&annotations, &store, &spans);

        assert!(matches!(engine.plan("0.9", "2.0"), Err(AppError::UnknownVersion(v)) if v == "0.9"));
        assert!(matches!(engine.plan("1.0", "9.9"), Err(AppError::UnknownVersion(v)) if v == "9.9"));
        assert!(matches!(engine.plan("2.0", "1.0"), Err(AppError::InvertedRange { .. })));
    }

    #[test]
    fn test_shared_captures_coalesce() {
        let (mut annotations, store, spans) = engine_parts();
        annotations.version_order = testutil::versions(&["1.0", "1.1", "1.2", "2.0"]);
        annotations.version_schema_map.insert("1.1".to_string(), "1.0".to_string());
        annotations.version_schema_map.insert("1.2".to_string(), "1.0".to_string());
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let plan = engine.plan("1.1", "2.0").unwrap();
        assert_eq!(plan.versions.len(), 3);
        assert_eq!(
            plan.captures,
            vec![
                PlannedCapture {
                    version: Version::parse("1.1").unwrap(),
                    schema: "1.0".to_string()
                },
                PlannedCapture {
                    version: Version::parse("2.0").unwrap(),
                    schema: "2.0".to_string()
                },
            ]
        );

        let report = engine.generate("1.1", "2.0").unwrap();
        assert_eq!(report.version_phrase(), "versions 1.1, 1.2 and 2.0");
        assert_eq!(
            report.table("widgets").unwrap().column("name").unwrap().remarks.last().map(String::as_str),
            Some("<b>Added in 2.0 (so widgets can be found by name).</b>")
        );
    }

    #[test]
    fn test_missing_mapping_and_snapshot_are_fatal() {
        let (mut annotations, store, spans) = engine_parts();
        annotations.version_schema_map.remove("2.0");
        let engine = ReportEngine::new(&annotations, &store, &spans);
        assert!(matches!(engine.generate("1.0", "2.0"), Err(AppError::MissingSchemaMapping(v)) if v == "2.0"));

        let (mut annotations, store, spans) = engine_parts();
        annotations.version_schema_map.insert("2.0".to_string(), "2.0-lost".to_string());
        let engine = ReportEngine::new(&annotations, &store, &spans);
        assert!(matches!(engine.generate("1.0", "2.0"), Err(AppError::MissingSnapshot { .. })));
    }

    #[test]
    fn test_type_change_and_enum_history() {
        let (annotations, mut store, spans) = engine_parts();
        let mut v2 = testutil::widgets_v2();
        if let Some(widgets) = v2.tables.get_mut("widgets") {
            widgets.columns[0].declared_type = "bigint(20)".to_string();
        }
        store.insert("2.0", v2);
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let report = engine.generate("1.0", "2.0").unwrap();
        let id = report.table("widgets").unwrap().column("id").unwrap();
        assert_eq!(id.sql_type, "<b>1.0: </b>int; <b>2.0: </b>bigint");
        assert_eq!(id.field_colours[&ColumnField::Type], Colour::Changed);
        assert_eq!(id.field_colours[&ColumnField::Default], Colour::Unchanged);
        assert_eq!(report.summary.columns_changed, 1);
    }

    #[test]
    fn test_renamed_column_keeps_one_entry() {
        let (mut annotations, mut store, spans) = engine_parts();
        annotations
            .column_renamed
            .entry("widgets".to_string())
            .or_default()
            .insert("widget_id".to_string(), "id".to_string());
        let mut v1 = testutil::widgets_v1();
        if let Some(widgets) = v1.tables.get_mut("widgets") {
            widgets.columns[0].name = "widget_id".to_string();
            widgets.indexes[0].column_name = "widget_id".to_string();
        }
        store.insert("1.0", v1);
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let report = engine.generate("1.0", "2.0").unwrap();
        let widgets = report.table("widgets").unwrap();
        let keys: Vec<&str> = widgets.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "name"]);

        let id = widgets.column("id").unwrap();
        assert_eq!(id.name, "<b>1.0: </b>widget_id; <b>2.0: </b>id");
        assert_eq!(id.colour, Colour::Unchanged);
        assert_eq!(id.field_colours[&ColumnField::Name], Colour::Changed);
        assert_eq!(id.remarks, vec!["The widget ID.".to_string()]);
        assert_eq!(
            widgets.index("PRIMARY").unwrap().fields,
            "<b>1.0: </b>widget_id; <b>2.0: </b>id"
        );
    }

    #[test]
    fn test_renamed_index_keeps_one_entry() {
        let (mut annotations, mut store, spans) = engine_parts();
        annotations
            .index_renamed
            .entry("widgets".to_string())
            .or_default()
            .insert("widget_key".to_string(), "id_idx".to_string());
        annotations.index_remark.entry("widgets".to_string()).or_default().insert(
            "id_idx".to_string(),
            Some(RemarkEntry(vec![Remark::simple("Lookup by id.")])),
        );
        let mut v1 = testutil::widgets_v1();
        let mut v2 = testutil::widgets_v2();
        if let Some(widgets) = v1.tables.get_mut("widgets") {
            widgets.indexes.push(testutil::index("widget_key", 1, "id", 1));
        }
        if let Some(widgets) = v2.tables.get_mut("widgets") {
            widgets.indexes.push(testutil::index("id_idx", 1, "id", 1));
        }
        store.insert("1.0", v1);
        store.insert("2.0", v2);
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let report = engine.generate("1.0", "2.0").unwrap();
        let widgets = report.table("widgets").unwrap();
        let keys: Vec<&str> = widgets.indexes.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["PRIMARY", "id_idx"]);

        let renamed = widgets.index("id_idx").unwrap();
        assert_eq!(renamed.name, "<b>1.0: </b>widget_key; <b>2.0: </b>id_idx");
        assert_eq!(renamed.fields, "id");
        assert_eq!(renamed.colour, Colour::Unchanged);
        assert_eq!(renamed.field_colours[&IndexField::Name], Colour::Changed);
        assert_eq!(renamed.remarks, vec!["Lookup by id.".to_string()]);
        assert_eq!(report.summary.indexes_added + report.summary.indexes_removed, 0);
    }

    #[test]
    fn test_primary_index_listed_first() {
        let (annotations, mut store, spans) = engine_parts();
        let mut v2 = testutil::widgets_v2();
        if let Some(widgets) = v2.tables.get_mut("widgets") {
            widgets.indexes = vec![
                testutil::index("alpha_idx", 1, "name", 1),
                testutil::index("PRIMARY", 1, "id", 0),
            ];
        }
        store.insert("2.0", v2);
        let engine = ReportEngine::new(&annotations, &store, &spans);

        let (report, _) = engine.build("2.0", "2.0").unwrap();
        let keys: Vec<&str> = report.table("widgets").unwrap().indexes.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["PRIMARY", "alpha_idx"]);
    }
}
