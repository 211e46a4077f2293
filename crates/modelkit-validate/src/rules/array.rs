use modelkit_core::{Model, Value};

use crate::result::{ValidationResult, message_or};
use crate::rule::SyncRule;

/// Requires an array, optionally with an item-count range.
#[derive(Debug, Clone, Default)]
pub struct ArrayRule {
    min_items: Option<usize>,
    max_items: Option<usize>,
    message: Option<String>,
}

impl ArrayRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
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

impl SyncRule for ArrayRule {
    fn check(&self, value: &Value, field: &str, _model: &dyn Model) -> ValidationResult {
        if value.is_blank() {
            return ValidationResult::pass();
        }
        let count = match value {
            Value::Array(items) => items.len(),
            Value::Json(serde_json::Value::Array(items)) => items.len(),
            _ => return self.fail(format!("{field} must be an array")),
        };
        if let Some(min) = self.min_items {
            if count < min {
                return self.fail(format!("{field} must contain at least {min} items"));
            }
        }
        if let Some(max) = self.max_items {
            if count > max {
                return self.fail(format!("{field} must contain at most {max} items"));
            }
        }
        ValidationResult::pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit_core::DynamicModel;
    use serde_json::json;

    fn message(rule: &ArrayRule, value: impl Into<Value>) -> Option<String> {
        rule.check(&value.into(), "tags", &DynamicModel::new("t")).message
    }

    #[test]
    fn test_item_bounds() {
        let rule = ArrayRule::new().min_items(1).max_items(2);
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            message(&rule, empty),
            Some("tags must contain at least 1 items".to_string())
        );
        assert_eq!(message(&rule, vec!["a", "b"]), None);
        assert_eq!(
            message(&rule, Value::Json(json!(["a", "b", "c"]))),
            Some("tags must contain at most 2 items".to_string())
        );
    }

    #[test]
    fn test_not_an_array() {
        let rule = ArrayRule::new();
        assert_eq!(message(&rule, "a,b"), Some("tags must be an array".to_string()));
        assert_eq!(message(&rule, Value::Null), None);
    }
}
