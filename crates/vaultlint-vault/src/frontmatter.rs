//! # Frontmatter Extraction
//!
//! A note starts with an optional metadata block:
//!
//! ```text
//! ---
//! type: concept
//! created: 2025-01-15
//! ---
//! # Body
//! ```
//!
//! The opening and closing lines are three or more dashes, optionally
//! followed by whitespace. A UTF-8 byte order mark before the opening line
//! is ignored.
//!
//! `serde_yaml` follows YAML 1.2, so unquoted dates, timestamps and the
//! YAML 1.1 booleans (`yes`, `no`, `on`, `off`) all arrive as strings. Notes
//! are written for YAML 1.1 tooling, so top-level *plain* scalars are
//! resolved the YAML 1.1 way here: timestamps become [`TemporalValue`]s and
//! the boolean words become booleans. Quoted, block and tagged scalars are
//! left as written. Strings that look like dates but name no real day stay
//! strings.
//!
//! Values nested inside sequences or mappings are not resolved.

use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use vaultlint_core::{RawRecord, RawValue, TemporalValue};

/// Why a metadata block could not be turned into a record.
#[derive(Error, Debug)]
pub enum FrontmatterError {
    /// Opening delimiter without a closing one.
    #[error("no closing delimiter for the metadata block")]
    Unterminated,

    /// The block is not valid YAML.
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The block parsed, but is not a key/value mapping.
    #[error("metadata block must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    /// A key or value has no JSON equivalent.
    #[error("{0}")]
    Unsupported(String),
}

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<year>\d{4})-(?P<month>\d{1,2})-(?P<day>\d{1,2})",
        r"(?:(?:[Tt]|[ \t]+)(?P<hour>\d{1,2}):(?P<minute>\d{2}):(?P<second>\d{2})",
        r"(?:\.(?P<fraction>\d*))?",
        r"(?:[ \t]*(?P<tz>Z|[-+]\d{1,2}(?::\d{2})?))?)?$",
    ))
    .unwrap_or_else(|e| panic!("timestamp regex: {e}"))
});

/// A `key: value` line at the top level of a mapping. The key is a plain,
/// single-quoted or escape-free double-quoted scalar.
static TOP_LEVEL_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^(?:"(?P<dq>[^"\\]*)"|'(?P<sq>[^']*)'|"#,
        r#"(?P<plain>[^\s#'"?:\[\]{},&*!|>%@`-][^#]*?))"#,
        r"[ \t]*:(?:[ \t]+(?P<value>.*))?$",
    ))
    .unwrap_or_else(|e| panic!("top-level entry regex: {e}"))
});

/// Locate the metadata block.
///
/// Returns `Ok(None)` when the text does not open with a delimiter line,
/// and the raw YAML between the delimiters otherwise.
pub fn split_frontmatter(text: &str) -> Result<Option<&str>, FrontmatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_delimiter(first) {
        return Ok(None);
    }

    let start = first.len();
    let mut end = start;
    for line in lines {
        if is_delimiter(line) {
            return Ok(Some(&text[start..end]));
        }
        end += line.len();
    }
    Err(FrontmatterError::Unterminated)
}

/// Extract and parse the metadata block of `text`.
///
/// `Ok(None)` means the note has no metadata block at all. An empty block
/// yields an empty record.
pub fn parse_frontmatter(text: &str) -> Result<Option<RawRecord>, FrontmatterError> {
    let Some(block) = split_frontmatter(text)? else {
        return Ok(None);
    };
    if block.trim().is_empty() {
        return Ok(Some(RawRecord::new()));
    }

    let document: serde_yaml::Value = serde_yaml::from_str(block)?;
    let map = match document {
        serde_yaml::Value::Mapping(map) => map,
        serde_yaml::Value::Null => return Ok(Some(RawRecord::new())),
        other => {
            return Err(FrontmatterError::NotAMapping {
                found: yaml_kind(&other),
            })
        }
    };

    let plain = plain_scalar_keys(block);
    let mut record = RawRecord::new();
    for (key, value) in &map {
        let key = yaml_key(key).map_err(FrontmatterError::Unsupported)?;
        let value = match value {
            serde_yaml::Value::String(s) if plain.contains(&key) => resolve_plain_scalar(s),
            serde_yaml::Value::String(s) => RawValue::Data(Value::String(s.clone())),
            other => {
                RawValue::Data(yaml_to_json_value(other).map_err(FrontmatterError::Unsupported)?)
            }
        };
        record.insert(key, value);
    }
    Ok(Some(record))
}

/// Apply the YAML 1.1 resolution rules that YAML 1.2 dropped.
fn resolve_plain_scalar(scalar: &str) -> RawValue {
    if let Some(flag) = yaml11_bool(scalar) {
        return RawValue::Data(Value::Bool(flag));
    }
    match resolve_timestamp(scalar) {
        Some(t) => RawValue::Temporal(t),
        None => RawValue::Data(Value::String(scalar.to_string())),
    }
}

fn yaml11_bool(scalar: &str) -> Option<bool> {
    match scalar {
        "yes" | "Yes" | "YES" | "on" | "On" | "ON" | "true" | "True" | "TRUE" => Some(true),
        "no" | "No" | "NO" | "off" | "Off" | "OFF" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Keys of the top-level entries whose value is written as a plain scalar.
///
/// A value may start on the line after its key. Anchors are skipped.
/// Entries the scan cannot read, such as a flow mapping, are left out and
/// so are never resolved.
fn plain_scalar_keys(block: &str) -> HashSet<String> {
    let lines: Vec<&str> = block.lines().collect();
    let mut keys = HashSet::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = TOP_LEVEL_ENTRY.captures(line) else {
            continue;
        };
        let Some(key) = caps.name("plain").or(caps.name("sq")).or(caps.name("dq")) else {
            continue;
        };

        let inline = caps.name("value").map_or("", |m| m.as_str().trim());
        let value = if inline.is_empty() || inline.starts_with('#') {
            // Continuation lines are indented; anything else ends the entry.
            match lines[i + 1..]
                .iter()
                .find(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
            {
                Some(next) if next.starts_with([' ', '\t']) => next.trim(),
                _ => continue,
            }
        } else {
            inline
        };

        if is_plain_start(skip_anchor(value)) {
            keys.insert(key.as_str().trim_end().to_string());
        }
    }
    keys
}

fn skip_anchor(value: &str) -> &str {
    match value.strip_prefix('&') {
        Some(rest) => rest
            .split_once(char::is_whitespace)
            .map_or("", |(_, after)| after.trim_start()),
        None => value,
    }
}

fn is_plain_start(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        None | Some('"' | '\'' | '|' | '>' | '!' | '&' | '*' | '[' | '{' | '#') => false,
        // `- `, `? ` and `: ` open a block collection; `-5` is a plain scalar.
        Some('-' | '?' | ':') => chars.next().is_some_and(|c| !c.is_whitespace()),
        Some(_) => true,
    }
}

/// Resolve a plain scalar as a YAML 1.1 timestamp.
///
/// A date alone needs two-digit month and day. Returns `None` for anything
/// else, including date-shaped strings that are not calendar dates.
pub fn resolve_timestamp(scalar: &str) -> Option<TemporalValue> {
    let caps = TIMESTAMP.captures(scalar)?;
    let date = NaiveDate::from_ymd_opt(
        caps["year"].parse().ok()?,
        caps["month"].parse().ok()?,
        caps["day"].parse().ok()?,
    )?;

    let Some(hour) = caps.name("hour") else {
        if caps["month"].len() != 2 || caps["day"].len() != 2 {
            return None;
        }
        return Some(TemporalValue::Date(date));
    };

    let micros = match caps.name("fraction") {
        Some(f) => {
            let digits: String = f.as_str().chars().take(6).collect();
            format!("{digits:0<6}").parse().ok()?
        }
        None => 0,
    };
    let naive = date.and_hms_micro_opt(
        hour.as_str().parse().ok()?,
        caps["minute"].parse().ok()?,
        caps["second"].parse().ok()?,
        micros,
    )?;

    match caps.name("tz") {
        None => Some(TemporalValue::DateTime(naive)),
        Some(tz) => {
            let offset = parse_offset(tz.as_str())?;
            let stamped = offset.from_local_datetime(&naive).single()?;
            Some(TemporalValue::OffsetDateTime(stamped))
        }
    }
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    if tz == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match tz.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn is_delimiter(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3 && line.bytes().all(|b| b == b'-')
}

fn yaml_key(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("unsupported YAML map key type: {other:?}")),
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Convert a nested YAML value into JSON.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                object.insert(yaml_key(k)?, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        // Custom tags carry no meaning for validation.
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
