//! The validation engine.
//!
//! Runs a [`RuleMap`] against a model and aggregates every failure message
//! into a single [`ValidationError`].

use asupersync::{Cx, Outcome};
use modelkit_core::{Error, Model, ValidationError, Value};

use crate::rule::{Rule, RuleMap};

/// Result of running one field's rules without raising.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReport {
    /// `false` if any rule failed, including failures without a message.
    pub valid: bool,
    /// Failure messages in rule order.
    pub messages: Vec<String>,
}

impl Default for FieldReport {
    fn default() -> Self {
        Self {
            valid: true,
            messages: Vec::new(),
        }
    }
}

/// Applies rule maps to models.
///
/// Evaluation is sequential: fields in rule-map order, then rules in list
/// order, each awaited before the next starts. The outcome is therefore
/// deterministic for a given model and rule map.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Validate every field named in `rules`.
    ///
    /// Returns `Error::Validation` when at least one failure message was
    /// collected. Errors raised by a rule itself abort the pass and are
    /// returned as-is.
    #[tracing::instrument(level = "debug", skip(self, cx, model, rules), fields(table = model.table_name()))]
    pub async fn validate(
        &self,
        cx: &Cx,
        model: &dyn Model,
        rules: &RuleMap,
    ) -> Outcome<(), Error> {
        let mut failures: Vec<(String, Vec<String>)> = Vec::new();

        for (field, field_rules) in rules.iter() {
            let value = model.value(field);
            match self.check_field(cx, value, field, model, field_rules).await {
                Outcome::Ok(report) => {
                    if !report.messages.is_empty() {
                        failures.push((field.to_string(), report.messages));
                    }
                }
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }

        match ValidationError::from_fields(failures) {
            Some(err) => {
                tracing::debug!(
                    fields = err.len(),
                    messages = err.message_count(),
                    "Validation failed"
                );
                Outcome::Err(Error::Validation(err))
            }
            None => Outcome::Ok(()),
        }
    }

    /// Validate a single value against `rules`.
    pub async fn validate_field(
        &self,
        cx: &Cx,
        value: &Value,
        field: &str,
        model: &dyn Model,
        rules: &[Box<dyn Rule>],
    ) -> Outcome<(), Error> {
        match self.check_field(cx, value, field, model, rules).await {
            Outcome::Ok(report) => match ValidationError::from_fields([(field, report.messages)]) {
                Some(err) => Outcome::Err(Error::Validation(err)),
                None => Outcome::Ok(()),
            },
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Run `rules` against one value and report the failures without raising.
    pub async fn check_field(
        &self,
        cx: &Cx,
        value: &Value,
        field: &str,
        model: &dyn Model,
        rules: &[Box<dyn Rule>],
    ) -> Outcome<FieldReport, Error> {
        let mut report = FieldReport::default();

        for rule in rules {
            match rule.validate(cx, value, field, model).await {
                Outcome::Ok(result) => {
                    if result.valid {
                        continue;
                    }
                    report.valid = false;
                    match result.message {
                        Some(message) => report.messages.push(message),
                        None => {
                            tracing::debug!(field, rule = ?rule, "Rule failed without a message");
                        }
                    }
                }
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }

        Outcome::Ok(report)
    }
}
