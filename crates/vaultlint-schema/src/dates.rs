//! Semantic check of the canonical date fields.
//!
//! The schema only constrains the *shape* of `created` and `revised`. A
//! string such as `2025-02-30` is date-shaped but is not a date, and this
//! checker catches it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use vaultlint_core::Record;

/// Fields holding a calendar date.
pub const DATE_FIELDS: [&str; 2] = ["created", "revised"];

static CALENDAR_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap_or_else(|e| panic!("calendar date regex: {e}"))
});

/// Report every date field that holds a string which is not an ISO date.
///
/// Absent fields and non-string values are skipped; the structural check
/// owns type mismatches.
pub fn check_dates(record: &Record) -> Vec<String> {
    DATE_FIELDS
        .iter()
        .filter_map(|field| match record.get(*field) {
            Some(Value::String(value)) if !is_iso_date(value) => Some(format!(
                "{field}: {} is not a valid ISO date (YYYY-MM-DD)",
                Value::String(value.clone())
            )),
            _ => None,
        })
        .collect()
}

/// Whether `value` is `YYYY-MM-DD`, optionally followed by a `T` time part.
///
/// Preprocessed timestamps take the `T` form, so they pass here.
pub fn is_iso_date(value: &str) -> bool {
    let (date, time) = match value.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (value, None),
    };
    if !CALENDAR_DATE.is_match(date) || NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return false;
    }
    match time {
        None => true,
        Some(_) => {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
                || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
                || DateTime::parse_from_rfc3339(value).is_ok()
        }
    }
}
