//! Version spans for scoped remarks
//!
//! A remark that is only true from `first` to `last` is shown with a
//! prefix saying so, unless every version in the report falls inside
//! that range. Which prefix applies depends only on the report's
//! version list and the two bounds, so results are memoized.

use crate::history::Colour;
use crate::version::{within, Version};
use std::collections::HashMap;
use std::sync::RwLock;

/// How a `[first, last]` bound relates to a report's versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpan {
    /// Every version in the report is inside the bound
    All,
    /// Versions before `first`, none after `last`
    From(Version),
    /// Versions after `last`, none before `first`
    UpTo(Version),
    /// Versions on both sides, `first == last`
    Only(Version),
    /// Versions on both sides
    Between(Version, Version),
}

impl VersionSpan {
    pub fn prefix(&self) -> String {
        match self {
            VersionSpan::All => String::new(),
            VersionSpan::From(first) => format!("<b>From {}:</b> ", first),
            VersionSpan::UpTo(last) => format!("<b>Up to and including {}:</b> ", last),
            VersionSpan::Only(v) => format!("<b>In version {}:</b> ", v),
            VersionSpan::Between(first, last) => format!("<b>From {} to {}:</b> ", first, last),
        }
    }

    pub fn colour(&self) -> Colour {
        match self {
            VersionSpan::All => Colour::Unchanged,
            VersionSpan::From(_) => Colour::Added,
            _ => Colour::Removed,
        }
    }
}

/// Classify `[first, last]` against `versions`. `None` when no version
/// in the list falls inside the bound.
pub fn classify_span(
    first: Option<&Version>,
    last: Option<&Version>,
    versions: &[Version],
) -> Option<VersionSpan> {
    let before_first = versions
        .iter()
        .any(|v| first.is_some_and(|f| v < f));
    let after_last = versions.iter().any(|v| last.is_some_and(|l| v > l));
    let inside = versions.iter().any(|v| within(first, last, v));

    if !inside {
        return None;
    }

    // `before_first` implies `first` is set, `after_last` implies `last` is.
    Some(match (before_first, after_last, first, last) {
        (false, false, _, _) => VersionSpan::All,
        (true, false, Some(f), _) => VersionSpan::From(f.clone()),
        (true, true, Some(f), Some(l)) if f == l => VersionSpan::Only(f.clone()),
        (true, true, Some(f), Some(l)) => VersionSpan::Between(f.clone(), l.clone()),
        (false, true, _, Some(l)) => VersionSpan::UpTo(l.clone()),
        _ => VersionSpan::All,
    })
}

type Bounds = (Option<Version>, Option<Version>);

/// Memo of span classifications: per report version list, the spans
/// already worked out for each `(first, last)` bound.
///
/// Lookups borrow the version list; it is cloned only the first time a
/// list is seen. Readers share the lock; two writers racing on the same
/// key both store the same value.
#[derive(Debug, Default)]
pub struct SpanCache {
    spans: RwLock<HashMap<Vec<Version>, Vec<(Bounds, Option<VersionSpan>)>>>,
}

impl SpanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn span(
        &self,
        first: Option<&Version>,
        last: Option<&Version>,
        versions: &[Version],
    ) -> Option<VersionSpan> {
        let matches = |bounds: &Bounds| bounds.0.as_ref() == first && bounds.1.as_ref() == last;

        if let Ok(spans) = self.spans.read() {
            let hit = spans
                .get(versions)
                .and_then(|known| known.iter().find(|(bounds, _)| matches(bounds)));
            if let Some((_, span)) = hit {
                return span.clone();
            }
        }

        let span = classify_span(first, last, versions);
        if let Ok(mut spans) = self.spans.write() {
            if !spans.contains_key(versions) {
                spans.insert(versions.to_vec(), Vec::new());
            }
            if let Some(known) = spans.get_mut(versions) {
                if !known.iter().any(|(bounds, _)| matches(bounds)) {
                    known.push(((first.cloned(), last.cloned()), span.clone()));
                }
            }
        }
        span
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.spans
            .read()
            .map(|s| s.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}
