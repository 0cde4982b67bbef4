//! Shared fixtures: a two-version "widgets" installation.
//!
//! 1.0 has `widgets(id)`. 2.0 adds `widgets.name` and the `gadgets` table.

use crate::annotations::{Annotations, FieldMap, RemarkEntry};
use crate::snapshot::{RawColumn, RawIndex, RawSchema, RawTable, SnapshotStore};
use crate::version::Version;
use std::collections::BTreeMap;

pub fn versions(names: &[&str]) -> Vec<Version> {
    names.iter().map(|n| Version::parse(n).unwrap()).collect()
}

fn remark(text: &str) -> Option<RemarkEntry> {
    Some(RemarkEntry(vec![crate::annotations::Remark::simple(text)]))
}

fn fields<T: Clone>(entries: &[(&str, T)]) -> BTreeMap<String, T> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub fn annotations() -> Annotations {
    Annotations {
        version_order: versions(&["1.0", "2.0"]),
        version_schema_map: BTreeMap::from([
            ("1.0".to_string(), "1.0".to_string()),
            ("2.0".to_string(), "2.0".to_string()),
        ]),
        table_remark: BTreeMap::from([
            ("widgets".to_string(), remark("Widgets.")),
            ("gadgets".to_string(), remark("Gadgets.")),
        ]),
        table_added_remark: BTreeMap::from([(
            "gadgets".to_string(),
            Some("A new table for gadgets".to_string()),
        )]),
        column_remark: FieldMap::from([
            (
                "widgets".to_string(),
                fields(&[("id", remark("The widget ID.")), ("name", remark("The widget name."))]),
            ),
            ("gadgets".to_string(), fields(&[("id", remark("The gadget ID."))])),
        ]),
        column_added_remark: FieldMap::from([(
            "widgets".to_string(),
            fields(&[("name", Some("so widgets can be found by name".to_string()))]),
        )]),
        index_remark: FieldMap::from([
            (
                "widgets".to_string(),
                fields(&[("PRIMARY", remark("The primary key.")), ("name_idx", remark("Lookup by name."))]),
            ),
            ("gadgets".to_string(), fields(&[("PRIMARY", remark("The primary key."))])),
        ]),
        ..Default::default()
    }
}

pub fn column(name: &str, declared_type: &str, nullable: bool, default: Option<&str>, extra: &str) -> RawColumn {
    RawColumn {
        name: name.to_string(),
        declared_type: declared_type.to_string(),
        null: if nullable { "YES" } else { "" }.to_string(),
        key: String::new(),
        default: default.map(str::to_string),
        extra: extra.to_string(),
    }
}

pub fn index(key_name: &str, sequence: u32, column_name: &str, non_unique: i64) -> RawIndex {
    RawIndex {
        key_name: key_name.to_string(),
        sequence,
        column_name: column_name.to_string(),
        non_unique: Some(non_unique),
        index_type: Some("BTREE".to_string()),
        comment: None,
    }
}

fn id_table(extra_columns: Vec<RawColumn>) -> RawTable {
    let mut columns = vec![column("id", "int(11)", false, None, "auto_increment")];
    columns.extend(extra_columns);
    RawTable {
        columns,
        indexes: vec![index("PRIMARY", 1, "id", 0)],
    }
}

pub fn widgets_v1() -> RawSchema {
    RawSchema {
        schema_version: "1.0".to_string(),
        tables: BTreeMap::from([("widgets".to_string(), id_table(vec![]))]),
    }
}

pub fn widgets_v2() -> RawSchema {
    RawSchema {
        schema_version: "2.0".to_string(),
        tables: BTreeMap::from([
            (
                "widgets".to_string(),
                id_table(vec![column("name", "varchar(32)", false, Some(""), "")]),
            ),
            ("gadgets".to_string(), id_table(vec![])),
        ]),
    }
}

pub fn store() -> SnapshotStore {
    let mut store = SnapshotStore::new();
    store.insert("1.0", widgets_v1());
    store.insert("2.0", widgets_v2());
    store
}
