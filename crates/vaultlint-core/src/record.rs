//! # Metadata Records
//!
//! A frontmatter block becomes a [`RawRecord`]: an ordered list of fields
//! whose values are either plain JSON data or native temporal values.
//! [`preprocess`] turns it into a [`Record`], the JSON object every checker
//! reads.

use serde_json::{Map, Value};

use crate::temporal::TemporalValue;

/// A preprocessed metadata record: field name to JSON value, in document
/// order.
pub type Record = Map<String, Value>;

/// A single frontmatter value as produced by the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A date or timestamp the loader resolved natively.
    Temporal(TemporalValue),
    /// Any other value.
    Data(Value),
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

impl From<TemporalValue> for RawValue {
    fn from(value: TemporalValue) -> Self {
        Self::Temporal(value)
    }
}

/// The metadata block of one note, before preprocessing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. Replacing an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        record.into_iter().collect()
    }
}

/// Replace every temporal value with its ISO 8601 string.
///
/// All other fields pass through untouched and the field order is kept.
/// Only top-level values are considered; temporal values never appear
/// nested because the loader resolves top-level scalars only.
pub fn preprocess(raw: &RawRecord) -> Record {
    raw.iter()
        .map(|(key, value)| {
            let value = match value {
                RawValue::Temporal(t) => Value::String(t.to_iso8601()),
                RawValue::Data(v) => v.clone(),
            };
            (key.to_string(), value)
        })
        .collect()
}
