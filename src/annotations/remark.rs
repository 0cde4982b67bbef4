//! Curated remark values
//!
//! In the annotation document a remark is a string, a version-scoped
//! triple `[first, last, text]` (either bound may be `null`), or a list
//! of those. The shape is decided once here, at load time.

use super::span::SpanCache;
use crate::version::{Version, VersionError};
use serde::{Deserialize, Serialize};

const VERSION_STRING: &str = "%(VERSION_STRING)s";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRemark", into = "RawRemark")]
pub enum Remark {
    /// Applies to every version
    Simple(String),
    /// Applies only to versions in `[first, last]`
    Scoped {
        first: Option<Version>,
        last: Option<Version>,
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawRemark {
    Text(String),
    Triple(Option<String>, Option<String>, String),
}

impl TryFrom<RawRemark> for Remark {
    type Error = VersionError;

    fn try_from(raw: RawRemark) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawRemark::Text(text) => Remark::Simple(text),
            RawRemark::Triple(first, last, text) => Remark::Scoped {
                first: first.as_deref().map(Version::parse).transpose()?,
                last: last.as_deref().map(Version::parse).transpose()?,
                text,
            },
        })
    }
}

impl From<Remark> for RawRemark {
    fn from(remark: Remark) -> Self {
        match remark {
            Remark::Simple(text) => RawRemark::Text(text),
            Remark::Scoped { first, last, text } => {
                RawRemark::Triple(first.map(String::from), last.map(String::from), text)
            }
        }
    }
}

impl Remark {
    pub fn simple(text: impl Into<String>) -> Self {
        Remark::Simple(text.into())
    }

    /// Resolve against the versions a report covers. Scoped remarks that
    /// apply to none of them disappear; the others get their
    /// `%(VERSION_STRING)s` placeholder filled in.
    pub fn resolve(&self, versions: &[Version], spans: &SpanCache) -> Option<String> {
        match self {
            Remark::Simple(text) => Some(text.replace(VERSION_STRING, "")),
            Remark::Scoped { first, last, text } => {
                let span = spans.span(first.as_ref(), last.as_ref(), versions)?;
                Some(text.replace(VERSION_STRING, &span.prefix()))
            }
        }
    }
}

/// One curated entry: a single remark or a list, always stored as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntryShape", into = "Vec<Remark>")]
pub struct RemarkEntry(pub Vec<Remark>);

#[derive(Deserialize)]
#[serde(untagged)]
enum EntryShape {
    One(Remark),
    Many(Vec<Remark>),
}

impl From<EntryShape> for RemarkEntry {
    fn from(shape: EntryShape) -> Self {
        match shape {
            EntryShape::One(remark) => RemarkEntry(vec![remark]),
            EntryShape::Many(remarks) => RemarkEntry(remarks),
        }
    }
}

impl From<RemarkEntry> for Vec<Remark> {
    fn from(entry: RemarkEntry) -> Self {
        entry.0
    }
}

/// Resolve a list of remarks, dropping the ones out of range.
pub fn resolve_all(remarks: &[Remark], versions: &[Version], spans: &SpanCache) -> Vec<String> {
    remarks
        .iter()
        .filter_map(|r| r.resolve(versions, spans))
        .collect()
}
