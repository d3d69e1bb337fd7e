//! # Static Patterns
//!
//! [`StaticRegex`] compiles a literal regex the first time it is used and
//! shares it across threads. A literal that fails to compile matches
//! nothing, so a broken pattern fails closed instead of panicking.

use once_cell::sync::OnceCell;
use regex::Regex;

/// A lazily compiled regex built from a `'static` literal.
#[derive(Debug)]
pub struct StaticRegex {
    source: &'static str,
    compiled: OnceCell<Option<Regex>>,
}

impl StaticRegex {
    /// Declare a pattern. Compilation is deferred to the first match.
    pub const fn new(source: &'static str) -> Self {
        Self {
            source,
            compiled: OnceCell::new(),
        }
    }

    /// The pattern text.
    pub fn as_str(&self) -> &'static str {
        self.source
    }

    /// Whether `input` matches. Always `false` if the pattern is broken.
    pub fn is_match(&self, input: &str) -> bool {
        self.compiled
            .get_or_init(|| match Regex::new(self.source) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!(pattern = self.source, error = %e, "static pattern failed to compile");
                    None
                }
            })
            .as_ref()
            .is_some_and(|re| re.is_match(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static DIGITS: StaticRegex = StaticRegex::new(r"^\d+$");
    static BROKEN: StaticRegex = StaticRegex::new(r"([a-z");

    #[test]
    fn test_static_regex_matches() {
        assert!(DIGITS.is_match("12345"));
        assert!(!DIGITS.is_match("12a"));
        assert_eq!(DIGITS.as_str(), r"^\d+$");
    }

    #[test]
    fn test_broken_static_regex_fails_closed() {
        assert!(!BROKEN.is_match("abc"));
        assert!(!BROKEN.is_match(""));
    }
}
