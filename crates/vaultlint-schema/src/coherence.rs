//! # Tag Coherence
//!
//! Each note type has one tag that a note of that type is expected to
//! carry. A note whose tags include neither that tag nor a descendant of it
//! (`plan/followup` under `plan`) gets a single warning.
//!
//! The record has not necessarily passed structural validation, so every
//! shape is tolerated: a missing or malformed `type` or `tags` simply means
//! no opinion.

use serde_json::Value;

use vaultlint_core::Record;

/// Expected tag per `(type, subtype)`. A `None` subtype is the fallback
/// entry for the type.
pub const TYPE_TAG_MAP: &[((&str, Option<&str>), &str)] = &[
    (("research", Some("component")), "research/component"),
    (("research", Some("issue")), "research/issue"),
    (("research", Some("pr")), "research/pr"),
    (("research", Some("issue-roundup")), "research/issue-roundup"),
    (("research", Some("design-problem")), "research/design-problem"),
    (("research", Some("design-spec")), "research/design-spec"),
    (("research", Some("dependency")), "research/dependency"),
    (("plan", None), "plan"),
    (("plan-section", None), "plan/section"),
    (("concept", None), "concept"),
    (("moc", None), "moc"),
    (("project", None), "project"),
];

/// The tag a note of `note_type`/`subtype` should carry.
///
/// Tries the exact pair first, then the type's fallback entry.
pub fn expected_tag(note_type: &str, subtype: Option<&str>) -> Option<&'static str> {
    let lookup = |key: (&str, Option<&str>)| {
        TYPE_TAG_MAP
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, tag)| *tag)
    };
    subtype
        .and_then(|s| lookup((note_type, Some(s))))
        .or_else(|| lookup((note_type, None)))
}

/// Hierarchy-aware match: `actual` equals `expected` or lives under it.
pub fn tag_matches(actual: &str, expected: &str) -> bool {
    actual == expected
        || actual
            .strip_prefix(expected)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Warn when the note's tags do not reflect its type.
///
/// Returns at most one warning. An absent `tags` field counts as an empty
/// list.
pub fn check_tag_coherence(record: &Record) -> Vec<String> {
    let empty = Vec::new();
    let tags = match record.get("tags") {
        None => &empty,
        Some(Value::Array(tags)) => tags,
        Some(_) => return Vec::new(),
    };
    let note_type = match record.get("type") {
        Some(Value::String(t)) if !t.is_empty() => t.as_str(),
        _ => return Vec::new(),
    };
    let subtype = record.get("subtype");

    let Some(expected) = expected_tag(note_type, subtype.and_then(Value::as_str)) else {
        return Vec::new();
    };

    let satisfied = tags
        .iter()
        .filter_map(Value::as_str)
        .any(|tag| tag_matches(tag, expected));
    if satisfied {
        return Vec::new();
    }

    let mut message = format!("tags: expected \"{expected}\" tag for type={note_type}");
    if let Some(subtype) = subtype.filter(|s| is_truthy(s)) {
        match subtype {
            Value::String(s) => message.push_str(&format!(", subtype={s}")),
            other => message.push_str(&format!(", subtype={other}")),
        }
    }
    message.push_str(&format!(" but tags are {}", Value::Array(tags.clone())));
    vec![message]
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
