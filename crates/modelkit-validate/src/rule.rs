//! The rule contract and the per-model rule map.

use std::fmt;

use asupersync::{Cx, Outcome};
use modelkit_core::{BoxFuture, Error, Model, Value};

use crate::result::ValidationResult;

/// Future returned by [`Rule::validate`].
pub type RuleFuture<'a> = BoxFuture<'a, Outcome<ValidationResult, Error>>;

/// A single validation rule applied to one field value.
///
/// Data failures are reported as `Outcome::Ok` with `valid == false`.
/// `Outcome::Err` is reserved for problems that are not about the data, such
/// as an adapter lacking a primitive the rule needs, and aborts the whole
/// validation pass.
///
/// Configuration is fixed at construction; a rule keeps no state between
/// calls.
pub trait Rule: Send + Sync + fmt::Debug {
    fn validate<'a>(
        &'a self,
        cx: &'a Cx,
        value: &'a Value,
        field: &'a str,
        model: &'a dyn Model,
    ) -> RuleFuture<'a>;
}

/// A rule that never suspends.
///
/// Every `SyncRule` is a [`Rule`] whose future is immediately ready.
pub trait SyncRule: Send + Sync + fmt::Debug {
    fn check(&self, value: &Value, field: &str, model: &dyn Model) -> ValidationResult;
}

impl<T: SyncRule> Rule for T {
    fn validate<'a>(
        &'a self,
        _cx: &'a Cx,
        value: &'a Value,
        field: &'a str,
        model: &'a dyn Model,
    ) -> RuleFuture<'a> {
        let result = self.check(value, field, model);
        Box::pin(async move { Outcome::Ok(result) })
    }
}

/// Ordered mapping from field name to the rules applied to it.
///
/// Fields are validated in the order they were first added, and each
/// field's rules in the order they were added.
#[derive(Debug, Default)]
pub struct RuleMap {
    fields: Vec<(String, Vec<Box<dyn Rule>>)>,
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`RuleMap::add`].
    pub fn rule(mut self, field: impl Into<String>, rule: impl Rule + 'static) -> Self {
        self.add(field, rule);
        self
    }

    /// Builder-style [`RuleMap::extend_field`].
    pub fn field<I>(mut self, field: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Rule>>,
    {
        self.extend_field(field, rules);
        self
    }

    /// Append one rule to `field`.
    pub fn add(&mut self, field: impl Into<String>, rule: impl Rule + 'static) {
        self.extend_field(field, [Box::new(rule) as Box<dyn Rule>]);
    }

    /// Append rules to `field`, declaring it if it is new.
    pub fn extend_field<I>(&mut self, field: impl Into<String>, rules: I)
    where
        I: IntoIterator<Item = Box<dyn Rule>>,
    {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => existing.extend(rules),
            None => self.fields.push((field, rules.into_iter().collect())),
        }
    }

    pub fn get(&self, field: &str) -> Option<&[Box<dyn Rule>]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Box<dyn Rule>])> {
        self.fields
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    /// Number of fields with rules.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
