//! Text format rules: email, regular expression, URL.

use modelkit_core::{Error, Model, Value};
use regex::Regex;

use crate::pattern::{EMAIL_PATTERN, URL_PATTERN, compile, matches_pattern};
use crate::result::{ValidationResult, message_or};
use crate::rule::SyncRule;

// ============================================================================
// Email
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Email {
    message: Option<String>,
}

impl Email {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl SyncRule for Email {
    fn check(&self, value: &Value, field: &str, _model: &dyn Model) -> ValidationResult {
        if value.is_blank() {
            return ValidationResult::pass();
        }
        let ok = value
            .as_str()
            .is_some_and(|s| matches_pattern(s, EMAIL_PATTERN));
        ValidationResult::check(ok, || {
            message_or(self.message.as_ref(), || format!("{field} must be a valid email"))
        })
    }
}

// ============================================================================
// Pattern
// ============================================================================

/// Requires the value to match a regular expression.
///
/// The expression is not anchored implicitly; use `^...$` to match the
/// whole value.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    message: Option<String>,
}

impl Pattern {
    /// Compile `pattern`. An invalid expression is reported here rather than
    /// at validation time.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        match compile(pattern) {
            Ok(regex) => Ok(Self {
                regex,
                message: None,
            }),
            Err(e) => Err(Error::Custom(format!("invalid regex pattern: {e}"))),
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl SyncRule for Pattern {
    fn check(&self, value: &Value, field: &str, _model: &dyn Model) -> ValidationResult {
        if value.is_blank() {
            return ValidationResult::pass();
        }
        let ok = value.to_text().is_some_and(|s| self.regex.is_match(&s));
        ValidationResult::check(ok, || {
            message_or(self.message.as_ref(), || format!("{field} format is invalid"))
        })
    }
}

// ============================================================================
// URL
// ============================================================================

/// Requires an absolute URL whose scheme is in an allowed list
/// (`http` and `https` by default).
#[derive(Debug, Clone)]
pub struct Url {
    schemes: Vec<String>,
    message: Option<String>,
}

impl Default for Url {
    fn default() -> Self {
        Self {
            schemes: vec!["http".to_string(), "https".to_string()],
            message: None,
        }
    }
}

impl Url {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the allowed schemes. Matching is case-insensitive.
    pub fn schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes = schemes
            .into_iter()
            .map(|s| s.into().to_ascii_lowercase())
            .collect();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn is_valid_url(&self, candidate: &str) -> bool {
        let Ok(regex) = compile(URL_PATTERN) else {
            return false;
        };
        regex
            .captures(candidate)
            .and_then(|caps| caps.get(1))
            .is_some_and(|scheme| {
                let scheme = scheme.as_str().to_ascii_lowercase();
                self.schemes.iter().any(|s| *s == scheme)
            })
    }
}

impl SyncRule for Url {
    fn check(&self, value: &Value, field: &str, _model: &dyn Model) -> ValidationResult {
        if value.is_blank() {
            return ValidationResult::pass();
        }
        let ok = value.as_str().is_some_and(|s| self.is_valid_url(s));
        ValidationResult::check(ok, || {
            message_or(self.message.as_ref(), || format!("{field} must be a valid URL"))
        })
    }
}
