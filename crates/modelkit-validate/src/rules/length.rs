use modelkit_core::{Model, Value};

use crate::result::{ValidationResult, message_or};
use crate::rule::SyncRule;

/// Length of a value for length checks.
///
/// Text counts characters, numbers count the characters of their decimal
/// form, arrays count elements. Anything else has no length.
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::Text(s) => Some(s.chars().count()),
        Value::Int(i) => Some(i.to_string().chars().count()),
        Value::BigInt(i) => Some(i.to_string().chars().count()),
        Value::Double(f) => Some(f.to_string().chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Json(serde_json::Value::String(s)) => Some(s.chars().count()),
        Value::Json(serde_json::Value::Number(n)) => Some(n.to_string().chars().count()),
        Value::Json(serde_json::Value::Array(items)) => Some(items.len()),
        _ => None,
    }
}

/// Character-count bounds, inclusive.
#[derive(Debug, Clone, Default)]
pub struct Length {
    min: Option<usize>,
    max: Option<usize>,
    message: Option<String>,
}

impl Length {
    pub fn min(min: usize) -> Self {
        Self {
            min: Some(min),
            ..Self::default()
        }
    }

    pub fn max(max: usize) -> Self {
        Self {
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            message: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn fail(&self, default: String) -> ValidationResult {
        ValidationResult::fail(message_or(self.message.as_ref(), || default))
    }
}

impl SyncRule for Length {
    fn check(&self, value: &Value, field: &str, _model: &dyn Model) -> ValidationResult {
        if value.is_blank() {
            return ValidationResult::pass();
        }
        let Some(len) = length_of(value) else {
            return self.fail(format!("{field} must be a string"));
        };
        if let Some(min) = self.min {
            if len < min {
                return self.fail(format!("{field} must be at least {min} characters"));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return self.fail(format!("{field} must be at most {max} characters"));
            }
        }
        ValidationResult::pass()
    }
}

/// Shorthand for [`Length::min`].
#[derive(Debug, Clone)]
pub struct MinLength(Length);

impl MinLength {
    pub fn new(min: usize) -> Self {
        Self(Length::min(min))
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        Self(self.0.message(message))
    }
}

impl SyncRule for MinLength {
    fn check(&self, value: &Value, field: &str, model: &dyn Model) -> ValidationResult {
        self.0.check(value, field, model)
    }
}

/// Shorthand for [`Length::max`].
#[derive(Debug, Clone)]
pub struct MaxLength(Length);

impl MaxLength {
    pub fn new(max: usize) -> Self {
        Self(Length::max(max))
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        Self(self.0.message(message))
    }
}

impl SyncRule for MaxLength {
    fn check(&self, value: &Value, field: &str, model: &dyn Model) -> ValidationResult {
        self.0.check(value, field, model)
    }
}
