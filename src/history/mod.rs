//! Schema History Engine
//!
//! Turns a run of per-version captures into one versioned schema:
//! - `normalize`: raw describe/show-index rows to canonical records
//! - `timeline`: per-field `(version, value)` histories
//! - `merge`: pivot many versions into table -> column/index -> timeline
//! - `compress`: collapse a timeline into its change points
//! - `presence`: colour and annotate added/removed objects

pub mod compress;
pub mod merge;
pub mod normalize;
pub mod presence;
pub mod timeline;

pub use compress::{reduce_pair_list, stringify_pairs, stringify_type};
pub use merge::{merge, PivotedEntry, PivotedSchema, PivotedTable};
pub use normalize::{ColumnRecord, IndexRecord, NormalizedSchema, NormalizedTable, Normalizer};
pub use presence::PresenceClassifier;
pub use timeline::{seed_schema, SeededSchema, Timeline};

use crate::annotations::ObjectKind;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Change classification of a table, row or cell over a version range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colour {
    /// Same throughout the range
    #[default]
    Unchanged,
    /// Absent at the start of the range
    Added,
    /// Absent at the end of the range
    Removed,
    /// A value changed inside the range
    Changed,
}

impl Colour {
    /// Background colour used by the HTML renderer.
    pub fn hex(self) -> Option<&'static str> {
        match self {
            Colour::Unchanged => None,
            Colour::Added => Some("#ccffcc"),
            Colour::Removed => Some("#ffcccc"),
            Colour::Changed => Some("#ccccff"),
        }
    }
}

/// A field of a column or index whose value is tracked across versions
pub trait TrackedField: Copy + Ord + Debug + Serialize + 'static {
    /// Every field, in display order
    const ALL: &'static [Self];
    /// What kind of object owns these fields
    const KIND: ObjectKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnField {
    Name,
    Type,
    Default,
    Properties,
}

impl TrackedField for ColumnField {
    const ALL: &'static [Self] = &[
        ColumnField::Name,
        ColumnField::Type,
        ColumnField::Default,
        ColumnField::Properties,
    ];
    const KIND: ObjectKind = ObjectKind::Column;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexField {
    Name,
    Fields,
    Properties,
}

impl TrackedField for IndexField {
    const ALL: &'static [Self] = &[IndexField::Name, IndexField::Fields, IndexField::Properties];
    const KIND: ObjectKind = ObjectKind::Index;
}
