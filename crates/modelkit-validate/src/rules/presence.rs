use modelkit_core::{Model, Value};

use crate::result::{ValidationResult, message_or};
use crate::rule::SyncRule;

/// Fails on blank values (`Null` or the empty string).
///
/// This is the only built-in rule that looks at blank values; every other
/// rule passes them so presence and format checks stay independent.
#[derive(Debug, Clone, Default)]
pub struct Required {
    message: Option<String>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl SyncRule for Required {
    fn check(&self, value: &Value, field: &str, _model: &dyn Model) -> ValidationResult {
        ValidationResult::check(!value.is_blank(), || {
            message_or(self.message.as_ref(), || format!("{field} is required"))
        })
    }
}
