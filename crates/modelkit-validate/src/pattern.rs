//! Process-wide cache of compiled regular expressions.
//!
//! Format rules compile their pattern once and share it across every
//! validation call.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use regex::Regex;

/// Loose email shape: local part, `@`, dotted domain with an alphabetic TLD.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Absolute URL with a scheme and a non-empty host.
pub const URL_PATTERN: &str = r"^([a-zA-Z][a-zA-Z0-9+.-]*)://([^\s/?#@]+@)?([^\s/?#:]+)(:\d+)?([/?#]\S*)?$";

struct RegexCache {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;
        {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            cache.insert(pattern.to_string(), regex.clone());
        }
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

/// Compile `pattern`, reusing a cached copy when one exists.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    regex_cache().get_or_compile(pattern)
}

/// Check if a string matches a regex pattern.
///
/// An invalid pattern never matches; the compile error is logged.
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    match compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "Invalid regex pattern in validation, treating as non-match"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(matches_pattern("test@example.com", EMAIL_PATTERN));
        assert!(matches_pattern("user.name+tag@domain.org", EMAIL_PATTERN));
        assert!(!matches_pattern("invalid", EMAIL_PATTERN));
        assert!(!matches_pattern("@example.com", EMAIL_PATTERN));
        assert!(!matches_pattern("test@", EMAIL_PATTERN));
    }

    #[test]
    fn test_url_pattern() {
        assert!(matches_pattern("https://example.com", URL_PATTERN));
        assert!(matches_pattern("http://localhost:8080/a?b=c#d", URL_PATTERN));
        assert!(!matches_pattern("example.com", URL_PATTERN));
        assert!(!matches_pattern("https://", URL_PATTERN));
        assert!(!matches_pattern("not a url", URL_PATTERN));
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        assert!(!matches_pattern("anything", r"[unclosed"));
        assert!(compile(r"[unclosed").is_err());
    }

    #[test]
    fn test_cache_returns_equivalent_regex() {
        let a = compile(r"^\d+$").unwrap();
        let b = compile(r"^\d+$").unwrap();
        assert_eq!(a.as_str(), b.as_str());
    }
}
