use chrono::{DateTime, NaiveDate, NaiveDateTime};
use modelkit_core::{Model, Value};

use crate::result::{ValidationResult, message_or};
use crate::rule::SyncRule;

/// Calendar date of a value.
///
/// Accepts `Date`, `Timestamp`, and text in `YYYY-MM-DD`, RFC 3339, or
/// `YYYY-MM-DDTHH:MM:SS` form. Offsets are dropped; the local calendar date
/// is used.
fn date_of(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Timestamp(ts) => Some(ts.date()),
        other => parse_date(other.as_str()?.trim()),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Requires a valid date, optionally within inclusive bounds.
#[derive(Debug, Clone, Default)]
pub struct DateRule {
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
    message: Option<String>,
}

impl DateRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest accepted date.
    pub fn min(mut self, min: NaiveDate) -> Self {
        self.min = Some(min);
        self
    }

    /// Latest accepted date.
    pub fn max(mut self, max: NaiveDate) -> Self {
        self.max = Some(max);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn fail(&self, default: String) -> ValidationResult {
        ValidationResult::fail(message_or(self.message.as_ref(), || default))
    }
}

impl SyncRule for DateRule {
    fn check(&self, value: &Value, field: &str, _model: &dyn Model) -> ValidationResult {
        if value.is_blank() {
            return ValidationResult::pass();
        }
        let Some(date) = date_of(value) else {
            return self.fail(format!("{field} must be a valid date"));
        };
        if let Some(min) = self.min {
            if date < min {
                return self.fail(format!("{field} must be on or after {min}"));
            }
        }
        if let Some(max) = self.max {
            if date > max {
                return self.fail(format!("{field} must be on or before {max}"));
            }
        }
        ValidationResult::pass()
    }
}
