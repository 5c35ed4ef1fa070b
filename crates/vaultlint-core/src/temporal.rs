//! # Temporal Values
//!
//! Frontmatter loaders resolve unquoted date and timestamp scalars into
//! native values. The structural validator only understands JSON shapes,
//! so each temporal value knows how to render itself back into its ISO 8601
//! string form.
//!
//! Rendering keeps whatever the input carried and adds nothing:
//!
//! - date: `YYYY-MM-DD`
//! - naive date-time: `YYYY-MM-DDTHH:MM:SS`, plus `.ffffff` when the value
//!   has sub-second precision
//! - offset date-time: the naive form followed by `+HH:MM`
//!
//! No timezone conversion is ever applied.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

/// A date or timestamp scalar resolved by the frontmatter loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalValue {
    /// A calendar date such as `2025-01-15`.
    Date(NaiveDate),
    /// A timestamp without an offset, such as `2025-06-01 12:00:00`.
    DateTime(NaiveDateTime),
    /// A timestamp that carried an explicit offset or `Z`.
    OffsetDateTime(DateTime<FixedOffset>),
}

impl TemporalValue {
    /// Render as an ISO 8601 string.
    pub fn to_iso8601(&self) -> String {
        match self {
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
            Self::DateTime(dt) => render_naive(dt),
            Self::OffsetDateTime(dt) => {
                format!("{}{}", render_naive(&dt.naive_local()), dt.format("%:z"))
            }
        }
    }
}

impl From<NaiveDate> for TemporalValue {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for TemporalValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for TemporalValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::OffsetDateTime(dt)
    }
}

fn render_naive(dt: &NaiveDateTime) -> String {
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = dt.nanosecond() / 1_000;
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}
