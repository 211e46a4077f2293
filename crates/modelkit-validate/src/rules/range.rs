use modelkit_core::{Model, Value};

use crate::result::{ValidationResult, message_or};
use crate::rule::SyncRule;

/// Numeric view of a value: numbers as-is, numeric text parsed.
fn number_of(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        Value::Json(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }?;
    n.is_finite().then_some(n)
}

/// Inclusive numeric bounds, optionally restricted to integers.
#[derive(Debug, Clone, Default)]
pub struct Range {
    min: Option<f64>,
    max: Option<f64>,
    integer: bool,
    message: Option<String>,
}

impl Range {
    pub fn min(min: impl Into<f64>) -> Self {
        Self {
            min: Some(min.into()),
            ..Self::default()
        }
    }

    pub fn max(max: impl Into<f64>) -> Self {
        Self {
            max: Some(max.into()),
            ..Self::default()
        }
    }

    pub fn between(min: impl Into<f64>, max: impl Into<f64>) -> Self {
        Self {
            min: Some(min.into()),
            max: Some(max.into()),
            ..Self::default()
        }
    }

    /// Also require a whole number.
    pub fn integer(mut self) -> Self {
        self.integer = true;
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

impl SyncRule for Range {
    fn check(&self, value: &Value, field: &str, _model: &dyn Model) -> ValidationResult {
        if value.is_blank() {
            return ValidationResult::pass();
        }
        let Some(n) = number_of(value) else {
            return self.fail(format!("{field} must be a number"));
        };
        if self.integer && n.fract() != 0.0 {
            return self.fail(format!("{field} must be an integer"));
        }
        if let Some(min) = self.min {
            if n < min {
                return self.fail(format!("{field} must be at least {min}"));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                return self.fail(format!("{field} must be at most {max}"));
            }
        }
        ValidationResult::pass()
    }
}
