//! History Compressor
//!
//! Collapses a timeline into the points where its value changed, and
//! renders those change points as the single string shown in a report
//! cell. Enum types get special treatment: a later enum declaration is
//! shown as the members it added and removed.

use crate::version::Version;
use once_cell::sync::Lazy;
use regex::Regex;

static ENUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^enum *\( *(.*) *\) *$").expect("enum pattern is valid"));

/// Keep the first entry of every run of equal values.
pub fn reduce_pair_list(pairs: &[(Version, String)]) -> Vec<(Version, String)> {
    let mut changes: Vec<(Version, String)> = Vec::new();
    for (version, value) in pairs {
        if changes.last().is_some_and(|(_, current)| current == value) {
            continue;
        }
        changes.push((version.clone(), value.clone()));
    }
    changes
}

/// One change point renders as its bare value; several as
/// `<b>version: </b>value` fragments joined with `"; "`.
pub fn render_changes(changes: &[(Version, String)]) -> String {
    match changes {
        [] => String::new(),
        [(_, only)] => only.clone(),
        _ => changes
            .iter()
            .map(|(version, value)| format!("<b>{}: </b>{}", version, value))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

pub fn stringify_pairs(pairs: &[(Version, String)]) -> String {
    render_changes(&reduce_pair_list(pairs))
}

/// Like `stringify_pairs`, but an enum that follows an enum is described
/// by the members it added and removed.
pub fn stringify_type(pairs: &[(Version, String)]) -> String {
    render_changes(&describe_enum_changes(reduce_pair_list(pairs)))
}

fn enum_members(declaration: &str) -> Option<Vec<String>> {
    let caps = ENUM_RE.captures(declaration)?;
    Some(
        caps[1]
            .split(',')
            .map(|m| m.trim().to_string())
            .collect(),
    )
}

fn describe_enum_changes(changes: Vec<(Version, String)>) -> Vec<(Version, String)> {
    let mut described = Vec::with_capacity(changes.len());
    let mut previous: Option<Vec<String>> = None;

    for (version, value) in changes {
        let Some(members) = enum_members(&value) else {
            previous = None;
            described.push((version, value));
            continue;
        };

        let Some(before) = previous.replace(members.clone()) else {
            described.push((version, value));
            continue;
        };

        let added: Vec<&str> = members
            .iter()
            .filter(|m| !before.contains(m))
            .map(String::as_str)
            .collect();
        let removed: Vec<&str> = before
            .iter()
            .filter(|m| !members.contains(m))
            .map(String::as_str)
            .collect();

        let mut say = Vec::new();
        if !added.is_empty() {
            say.push(format!("<b>Added:</b> {}.", added.join(", ")));
        }
        if !removed.is_empty() {
            say.push(format!("<b>Removed:</b> {}.", removed.join(", ")));
        }

        // Same members in a new order: show the declaration itself.
        if say.is_empty() {
            described.push((version, value));
        } else {
            described.push((version, say.join(" ")));
        }
    }
    described
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(items: &[(&str, &str)]) -> Vec<(Version, String)> {
        items
            .iter()
            .map(|(v, s)| (Version::parse(v).unwrap(), s.to_string()))
            .collect()
    }

    #[test]
    fn test_reduce_drops_repeats() {
        let reduced = reduce_pair_list(&pairs(&[("2.0", "a"), ("2.2", "a"), ("2.4", "b")]));
        assert_eq!(reduced, pairs(&[("2.0", "a"), ("2.4", "b")]));
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let once = reduce_pair_list(&pairs(&[("2.0", "a"), ("2.2", "b"), ("2.4", "a"), ("2.6", "a")]));
        assert_eq!(once, pairs(&[("2.0", "a"), ("2.2", "b"), ("2.4", "a")]));
        assert_eq!(reduce_pair_list(&once), once);
    }

    #[test]
    fn test_empty_timeline() {
        assert!(reduce_pair_list(&[]).is_empty());
        assert_eq!(stringify_pairs(&[]), "");
        assert_eq!(stringify_type(&[]), "");
    }

    #[test]
    fn test_stringify_single_and_many() {
        assert_eq!(stringify_pairs(&pairs(&[("2.0", "int"), ("2.2", "int")])), "int");
        assert_eq!(
            stringify_pairs(&pairs(&[("2.0", "mediumint"), ("2.16", "mediumint"), ("2.18", "int")])),
            "<b>2.0: </b>mediumint; <b>2.18: </b>int"
        );
    }

    #[test]
    fn test_enum_diff() {
        let rendered = stringify_type(&pairs(&[
            ("2.0", "enum('a', 'b')"),
            ("2.4", "enum('b', 'c')"),
        ]));
        assert_eq!(
            rendered,
            "<b>2.0: </b>enum('a', 'b'); <b>2.4: </b><b>Added:</b> 'c'. <b>Removed:</b> 'a'."
        );
    }

    #[test]
    fn test_enum_member_order_follows_declarations() {
        let rendered = stringify_type(&pairs(&[
            ("2.0", "enum('P1', 'P2', 'P3')"),
            ("2.2", "enum('P5', 'P1', 'P4')"),
        ]));
        assert!(rendered.ends_with("<b>Added:</b> 'P5', 'P4'. <b>Removed:</b> 'P2', 'P3'."), "{rendered}");
    }

    #[test]
    fn test_enum_only_added() {
        let rendered = stringify_type(&pairs(&[("2.0", "enum('a')"), ("2.2", "enum('a', 'b')")]));
        assert!(rendered.ends_with("<b>2.2: </b><b>Added:</b> 'b'."), "{rendered}");
    }

    #[test]
    fn test_enum_after_non_enum_is_shown_whole() {
        let rendered = stringify_type(&pairs(&[
            ("2.0", "enum('a')"),
            ("2.2", "varchar(16)"),
            ("2.4", "enum('a', 'b')"),
        ]));
        assert_eq!(
            rendered,
            "<b>2.0: </b>enum('a'); <b>2.2: </b>varchar(16); <b>2.4: </b>enum('a', 'b')"
        );
    }

    #[test]
    fn test_enum_reordered_only() {
        let rendered = stringify_type(&pairs(&[("2.0", "enum('a', 'b')"), ("2.2", "enum('b', 'a')")]));
        assert_eq!(rendered, "<b>2.0: </b>enum('a', 'b'); <b>2.2: </b>enum('b', 'a')");
    }
}
