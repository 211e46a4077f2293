use std::fmt;

use modelkit_core::{Model, Value};

use crate::result::ValidationResult;
use crate::rule::SyncRule;

type CheckFn = dyn Fn(&Value, &str, &dyn Model) -> ValidationResult + Send + Sync;

/// A rule backed by a closure.
///
/// Unlike the built-in rules, a custom rule also sees blank values; the
/// closure decides what they mean.
///
/// ```
/// use modelkit_validate::{Custom, ValidationResult};
///
/// let even = Custom::new("even", |value, field, _model| {
///     match value.as_i64() {
///         Some(n) if n % 2 != 0 => ValidationResult::fail(format!("{field} must be even")),
///         _ => ValidationResult::pass(),
///     }
/// });
/// # let _ = even;
/// ```
pub struct Custom {
    name: String,
    check: Box<CheckFn>,
}

impl Custom {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &str, &dyn Model) -> ValidationResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SyncRule for Custom {
    fn check(&self, value: &Value, field: &str, model: &dyn Model) -> ValidationResult {
        (self.check)(value, field, model)
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit_core::DynamicModel;

    #[test]
    fn test_custom_sees_other_fields() {
        let rule = Custom::new("confirmation", |value, field, model| {
            ValidationResult::check(value == model.value("password"), || {
                format!("{field} does not match password")
            })
        });
        let model = DynamicModel::new("users")
            .with("password", "s3cret")
            .with("password_confirmation", "other");

        let result = rule.check(model.value("password_confirmation"), "password_confirmation", &model);
        assert_eq!(
            result.message.as_deref(),
            Some("password_confirmation does not match password")
        );
        assert!(rule.check(&Value::from("s3cret"), "password_confirmation", &model).valid);
        assert_eq!(rule.name(), "confirmation");
    }
}
