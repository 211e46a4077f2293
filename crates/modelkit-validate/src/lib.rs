//! Declarative field validation for modelkit models.
//!
//! A [`RuleMap`] names the rules for each field; [`Validator::validate`]
//! runs them against a [`modelkit_core::Model`] and raises one aggregated
//! [`modelkit_core::ValidationError`] listing every failing field.
//!
//! Rules implement [`Rule`], which returns a future so that rules like
//! [`Unique`] can query storage. Rules that never suspend implement the
//! simpler [`SyncRule`] instead.
//!
//! # Example
//!
//! ```ignore
//! let rules = RuleMap::new()
//!     .rule("name", Required::new())
//!     .rule("name", MinLength::new(3))
//!     .rule("email", Required::new())
//!     .rule("email", Email::new())
//!     .rule("email", Unique::new("users", "email").connection(slot.clone()));
//!
//! match Validator::new().validate(cx, &user, &rules).await {
//!     Outcome::Ok(()) => {}
//!     Outcome::Err(Error::Validation(errors)) => {
//!         for message in errors.field_errors("email") {
//!             eprintln!("{message}");
//!         }
//!     }
//!     other => return other,
//! }
//! ```

pub mod engine;
pub mod pattern;
pub mod result;
pub mod rule;
pub mod rules;
pub mod source;

pub use engine::{FieldReport, Validator};
pub use pattern::matches_pattern;
pub use result::ValidationResult;
pub use rule::{Rule, RuleFuture, RuleMap, SyncRule};
pub use rules::{
    ArrayRule, Custom, DateRule, Email, Length, MaxLength, MinLength, Pattern, Range, Required,
    Unique, Url,
};
pub use source::{ConnectionSlot, ConnectionSource};
