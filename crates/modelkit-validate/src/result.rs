/// Outcome of applying one rule to one value.
///
/// A failure normally carries the message shown to the user. A failure
/// without a message still counts as a failure but contributes nothing to
/// the aggregated [`modelkit_core::ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    /// A pass with an informational message. Still a pass.
    pub fn pass_with(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: Some(message.into()),
        }
    }

    /// A failure with no message.
    pub fn fail_silent() -> Self {
        Self {
            valid: false,
            message: None,
        }
    }

    /// `pass()` when `ok`, otherwise `fail(message())`.
    pub fn check(ok: bool, message: impl FnOnce() -> String) -> Self {
        if ok { Self::pass() } else { Self::fail(message()) }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Resolve a rule's message: the caller's override if set, else the default.
pub(crate) fn message_or(custom: Option<&String>, default: impl FnOnce() -> String) -> String {
    match custom {
        Some(message) => message.clone(),
        None => default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(ValidationResult::pass().is_valid());
        let failed = ValidationResult::fail("bad");
        assert!(!failed.valid);
        assert_eq!(failed.message.as_deref(), Some("bad"));
        assert_eq!(ValidationResult::fail_silent().message, None);
        assert!(ValidationResult::pass_with("deprecated field").is_valid());
    }

    #[test]
    fn test_check() {
        assert!(ValidationResult::check(true, || unreachable!()).valid);
        assert_eq!(
            ValidationResult::check(false, || "nope".to_string()).message,
            Some("nope".to_string())
        );
    }
}
