//! Wiki-link content check.
//!
//! The schema pattern `^\[\[.+\]\]$` accepts `[[ ]]`. This checker rejects
//! links whose inner text is only whitespace. Values that do not have the
//! `[[...]]` envelope at all are left to the schema.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use vaultlint_core::Record;

use crate::report::ValidationReport;

/// How many links a wiki-link field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkArity {
    /// One link.
    Single,
    /// An array of links.
    Array,
}

/// Fields that carry wiki links.
pub const WIKI_LINK_FIELDS: &[(&str, LinkArity)] = &[
    ("parent_plan", LinkArity::Single),
    ("related_issues", LinkArity::Array),
    ("related_notes", LinkArity::Array),
];

static WIKI_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\[(.+)\]\]$").unwrap_or_else(|e| panic!("wiki link regex: {e}"))
});

/// Check every wiki-link field present in `record`.
///
/// Only produces errors; the warning list is always empty.
pub fn check_wiki_links(record: &Record) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (field, arity) in WIKI_LINK_FIELDS {
        let Some(value) = record.get(*field) else {
            continue;
        };
        let values: &[Value] = match (arity, value) {
            (LinkArity::Single, v) => std::slice::from_ref(v),
            (LinkArity::Array, Value::Array(items)) => items.as_slice(),
            (LinkArity::Array, _) => &[],
        };

        for (i, v) in values.iter().enumerate() {
            let Value::String(link) = v else {
                continue;
            };
            let Some(caps) = WIKI_LINK.captures(link) else {
                continue;
            };
            if caps[1].trim().is_empty() {
                let location = match arity {
                    LinkArity::Single => field.to_string(),
                    LinkArity::Array => format!("{field}[{i}]"),
                };
                report.errors.push(format!(
                    "{location}: wiki link has whitespace-only inner text: {}",
                    Value::String(link.clone())
                ));
            }
        }
    }

    report
}
