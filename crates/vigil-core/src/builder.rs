//! # Rule Builders
//!
//! Fluent construction of rule graphs.
//!
//! ```
//! use vigil_core::{RuleBuilder, ValidationContext, Value};
//!
//! let rule = RuleBuilder::new()
//!     .required()
//!     .string()
//!     .min_length(3)
//!     .max_length(50)
//!     .build();
//!
//! let ctx = ValidationContext::new();
//! assert!(rule.validate(&ctx, &Value::from("alice")).is_ok());
//! assert!(rule.validate(&ctx, &Value::from("al")).is_err());
//! ```
//!
//! ## Ownership
//!
//! A sub-builder ([`StringRuleBuilder`], [`NumberRuleBuilder`],
//! [`DateTimeRuleBuilder`]) owns its parent [`RuleBuilder`] by value plus
//! its own rule list. `done()` appends the local rules to the parent and
//! hands it back; `build()` on a sub-builder does the same and builds.
//!
//! `build()` borrows the builder and returns a fresh immutable rule, so a
//! builder can be built any number of times.

use std::sync::Arc;

use crate::composite::{CompositeRule, Optional};
use crate::context::ValidationContext;
use crate::error::RuleError;
use crate::rules::{
    code, Custom, DateBound, DateTimeFormat, Email, FractionDigits, MaxLength, MaxValue,
    MinLength, MinValue, Pattern, Required, Rule, SharedRule, Url, Uuid,
};
use crate::temporal::{Layout, ISO8601_LAYOUT};
use crate::value::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Presence {
    #[default]
    Unspecified,
    Required,
    Optional,
}

/// Root builder: presence mode plus the accumulated rules.
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    rules: Vec<SharedRule>,
    presence: Presence,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a [`Required`] check in front of every other rule.
    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    /// Let `Null` pass without running the other rules.
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Append any rule.
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Append an already shared rule.
    pub fn shared(mut self, rule: SharedRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a named custom check.
    pub fn custom<F>(self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ValidationContext, &Value) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        self.rule(Custom::new(name, check))
    }

    pub fn string(self) -> StringRuleBuilder {
        StringRuleBuilder {
            parent: self,
            rules: Vec::new(),
        }
    }

    pub fn number(self) -> NumberRuleBuilder {
        NumberRuleBuilder {
            parent: self,
            rules: Vec::new(),
        }
    }

    pub fn datetime(self) -> DateTimeRuleBuilder {
        DateTimeRuleBuilder {
            parent: self,
            rules: Vec::new(),
        }
    }

    /// Build the accumulated rules. A single rule is returned as-is, several
    /// are wrapped in a [`CompositeRule`].
    pub fn build(&self) -> SharedRule {
        let mut rules = Vec::with_capacity(self.rules.len() + 1);
        if self.presence == Presence::Required {
            rules.push(Arc::new(Required) as SharedRule);
        }
        rules.extend(self.rules.iter().cloned());

        let rule: SharedRule = match rules.len() {
            1 => Arc::clone(&rules[0]),
            _ => Arc::new(CompositeRule::new(rules)),
        };
        if self.presence == Presence::Optional {
            Arc::new(Optional::new(rule))
        } else {
            rule
        }
    }

    fn extend(mut self, rules: Vec<SharedRule>) -> Self {
        self.rules.extend(rules);
        self
    }
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

/// String constraints.
#[derive(Debug, Clone)]
pub struct StringRuleBuilder {
    parent: RuleBuilder,
    rules: Vec<SharedRule>,
}

impl StringRuleBuilder {
    fn push(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn min_length(self, min: usize) -> Self {
        self.push(MinLength(min))
    }

    pub fn max_length(self, max: usize) -> Self {
        self.push(MaxLength(max))
    }

    /// Regex match. See [`Pattern`] for how a broken pattern behaves.
    pub fn pattern(self, pattern: &str) -> Self {
        self.push(Pattern::new(pattern))
    }

    pub fn email(self) -> Self {
        self.push(Email)
    }

    pub fn url(self) -> Self {
        self.push(Url)
    }

    pub fn uuid(self) -> Self {
        self.push(Uuid)
    }

    /// Predicate over the string. Non-string input is a contract violation.
    pub fn custom<F>(self, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.push(Custom::new("string_custom", move |_ctx, value| {
            let s = value
                .as_str()
                .ok_or_else(|| RuleError::type_mismatch("string_custom", "a string", value))?;
            if predicate(s) {
                Ok(())
            } else {
                Err(RuleError::invalid(code::CUSTOM, message.clone()))
            }
        }))
    }

    /// Return to the root builder.
    pub fn done(self) -> RuleBuilder {
        self.parent.extend(self.rules)
    }

    pub fn build(&self) -> SharedRule {
        self.clone().done().build()
    }
}

// ---------------------------------------------------------------------------
// Number
// ---------------------------------------------------------------------------

/// Numeric constraints. Inputs may be any integer width, a float, a decimal
/// literal or a numeric string.
#[derive(Debug, Clone)]
pub struct NumberRuleBuilder {
    parent: RuleBuilder,
    rules: Vec<SharedRule>,
}

impl NumberRuleBuilder {
    fn push(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn min(self, min: impl Into<Number>) -> Self {
        self.push(MinValue::new(min))
    }

    pub fn max(self, max: impl Into<Number>) -> Self {
        self.push(MaxValue::new(max))
    }

    /// Inclusive on both ends.
    pub fn range(self, min: impl Into<Number>, max: impl Into<Number>) -> Self {
        self.min(min).max(max)
    }

    /// Strictly greater than zero.
    pub fn positive(self) -> Self {
        self.push(MinValue::exclusive(0))
    }

    pub fn non_negative(self) -> Self {
        self.push(MinValue::new(0))
    }

    /// No fractional part. Exact for integers and decimal literals; a float
    /// is checked against its shortest representation, which only tells
    /// integers apart reliably up to 2^53.
    pub fn integer(self) -> Self {
        self.push(FractionDigits::integer())
    }

    /// At most `precision` significant digits after the decimal point.
    pub fn decimal(self, precision: usize) -> Self {
        self.push(FractionDigits::new(precision))
    }

    /// Predicate over the value as `f64`.
    pub fn custom<F>(self, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.push(Custom::new("number_custom", move |_ctx, value| {
            let n = value
                .as_number()
                .and_then(|n| n.as_f64())
                .ok_or_else(|| RuleError::type_mismatch("number_custom", "a number", value))?;
            if predicate(n) {
                Ok(())
            } else {
                Err(RuleError::invalid(code::CUSTOM, message.clone()))
            }
        }))
    }

    pub fn done(self) -> RuleBuilder {
        self.parent.extend(self.rules)
    }

    pub fn build(&self) -> SharedRule {
        self.clone().done().build()
    }
}

// ---------------------------------------------------------------------------
// DateTime
// ---------------------------------------------------------------------------

/// Date/time string constraints.
#[derive(Debug, Clone)]
pub struct DateTimeRuleBuilder {
    parent: RuleBuilder,
    rules: Vec<SharedRule>,
}

impl DateTimeRuleBuilder {
    fn push(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Match a layout by name (`RFC3339`) or strftime pattern.
    pub fn format(self, layout: &str) -> Self {
        self.push(DateTimeFormat::new(Layout::parse(layout)))
    }

    pub fn rfc3339(self) -> Self {
        self.push(DateTimeFormat::new(Layout::Rfc3339))
    }

    /// `%Y-%m-%dT%H:%M:%S%.f%:z`.
    pub fn iso8601(self) -> Self {
        self.push(DateTimeFormat::new(Layout::Pattern(ISO8601_LAYOUT.to_string())))
    }

    /// Strictly earlier than an RFC 3339 boundary.
    pub fn before(self, date: impl Into<String>) -> Self {
        self.push(DateBound::before(date))
    }

    /// Strictly later than an RFC 3339 boundary.
    pub fn after(self, date: impl Into<String>) -> Self {
        self.push(DateBound::after(date))
    }

    /// Strictly between `start` and `end`.
    pub fn range(self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.after(start).before(end)
    }

    pub fn custom<F>(self, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.push(Custom::new("datetime_custom", move |_ctx, value| {
            let s = value
                .as_str()
                .ok_or_else(|| RuleError::type_mismatch("datetime_custom", "a string", value))?;
            if predicate(s) {
                Ok(())
            } else {
                Err(RuleError::invalid(code::CUSTOM, message.clone()))
            }
        }))
    }

    pub fn done(self) -> RuleBuilder {
        self.parent.extend(self.rules)
    }

    pub fn build(&self) -> SharedRule {
        self.clone().done().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: &SharedRule, value: impl Into<Value>) -> Result<(), RuleError> {
        rule.validate(&ValidationContext::new(), &value.into())
    }

    #[test]
    fn test_required_runs_first() {
        let rule = RuleBuilder::new().string().min_length(3).done().required().build();
        assert_eq!(run(&rule, Value::Null).unwrap_err().code(), code::REQUIRED);
        assert_eq!(run(&rule, "ab").unwrap_err().code(), code::MIN_LENGTH);
        assert!(run(&rule, "abc").is_ok());
    }

    #[test]
    fn test_single_rule_is_not_wrapped() {
        let rule = RuleBuilder::new().string().email().build();
        assert_eq!(rule.name(), "email");
        let rule = RuleBuilder::new().required().string().email().build();
        assert_eq!(rule.name(), "composite");
    }

    #[test]
    fn test_build_is_repeatable() {
        let builder = RuleBuilder::new().required().string().max_length(3);
        let first = builder.build();
        let second = builder.build();
        for input in ["", "abc", "abcd"] {
            assert_eq!(run(&first, input).is_ok(), run(&second, input).is_ok());
        }
    }

    #[test]
    fn test_optional_lets_null_through() {
        let rule = RuleBuilder::new().optional().string().email().build();
        assert!(run(&rule, Value::Null).is_ok());
        assert_eq!(run(&rule, "nope").unwrap_err().code(), code::INVALID_EMAIL);
    }

    #[test]
    fn test_chaining_across_sub_builders() {
        let rule = RuleBuilder::new()
            .string()
            .min_length(2)
            .done()
            .custom("not_admin", |_, v| match v.as_str() {
                Some("admin") => Err(RuleError::invalid("RESERVED", "reserved name")),
                _ => Ok(()),
            })
            .build();
        assert!(run(&rule, "bob").is_ok());
        assert_eq!(run(&rule, "admin").unwrap_err().code(), "RESERVED");
    }

    #[test]
    fn test_string_custom() {
        let rule = RuleBuilder::new()
            .string()
            .custom("must be lowercase", |s| s.chars().all(|c| c.is_lowercase()))
            .build();
        assert!(run(&rule, "abc").is_ok());
        let Err(RuleError::Invalid(e)) = run(&rule, "Abc") else {
            panic!("expected failure");
        };
        assert_eq!(e.message, "must be lowercase");
        assert!(run(&rule, 5).unwrap_err().is_contract_violation());
    }

    #[test]
    fn test_number_range_and_sign() {
        let rule = RuleBuilder::new().number().range(1, 10).build();
        assert!(run(&rule, 1).is_ok());
        assert!(run(&rule, 10.0f64).is_ok());
        assert_eq!(run(&rule, 0).unwrap_err().code(), code::MIN_VALUE);
        assert_eq!(run(&rule, 11).unwrap_err().code(), code::MAX_VALUE);

        let positive = RuleBuilder::new().number().positive().build();
        assert!(positive.validate(&ValidationContext::new(), &Value::from(0.001f64)).is_ok());
        assert!(run(&positive, 0).is_err());

        let non_negative = RuleBuilder::new().number().non_negative().build();
        assert!(run(&non_negative, 0).is_ok());
        assert!(run(&non_negative, -1).is_err());
    }

    #[test]
    fn test_number_integer_and_decimal() {
        let integer = RuleBuilder::new().number().integer().build();
        assert!(run(&integer, i64::MAX).is_ok());
        assert!(run(&integer, Number::literal("12345678901234567890")).is_ok());
        assert_eq!(run(&integer, Number::literal("1.5")).unwrap_err().code(), code::NOT_INTEGER);

        let money = RuleBuilder::new().number().decimal(2).build();
        assert!(run(&money, "19.99").is_ok());
        assert!(run(&money, 19.9f64).is_ok());
        assert_eq!(run(&money, "19.999").unwrap_err().code(), code::DECIMAL_PRECISION);
    }

    #[test]
    fn test_decimal_with_extreme_exponent() {
        let money = RuleBuilder::new().number().decimal(2).build();
        assert_eq!(
            run(&money, "1e-9223372036854775808").unwrap_err().code(),
            code::DECIMAL_PRECISION
        );
        assert!(run(&money, Number::literal("100e9223372036854775807")).is_ok());
    }

    #[test]
    fn test_number_custom() {
        let rule = RuleBuilder::new()
            .number()
            .custom("must be even", |n| n % 2.0 == 0.0)
            .build();
        assert!(run(&rule, 4).is_ok());
        assert!(run(&rule, 3).is_err());
        assert!(run(&rule, "x").unwrap_err().is_contract_violation());
    }

    #[test]
    fn test_datetime_formats() {
        let rfc = RuleBuilder::new().datetime().rfc3339().build();
        assert!(run(&rfc, "2024-01-15T10:30:00Z").is_ok());
        assert_eq!(run(&rfc, "2024-01-15").unwrap_err().code(), code::INVALID_DATETIME);

        let iso = RuleBuilder::new().datetime().iso8601().build();
        assert!(run(&iso, "2024-01-15T10:30:00.250+02:00").is_ok());

        let date = RuleBuilder::new().datetime().format("%Y-%m-%d").build();
        assert!(run(&date, "2024-01-15").is_ok());
        assert!(run(&date, "15.01.2024").is_err());
    }

    #[test]
    fn test_datetime_range() {
        let rule = RuleBuilder::new()
            .datetime()
            .range("2024-01-01T00:00:00Z", "2024-12-31T00:00:00Z")
            .build();
        assert!(run(&rule, "2024-06-01T00:00:00Z").is_ok());
        assert_eq!(run(&rule, "2023-06-01T00:00:00Z").unwrap_err().code(), code::DATE_NOT_AFTER);
        assert_eq!(run(&rule, "2025-06-01T00:00:00Z").unwrap_err().code(), code::DATE_NOT_BEFORE);
        assert!(matches!(run(&rule, "June"), Err(RuleError::Parse { .. })));
    }

    #[test]
    fn test_datetime_custom() {
        let rule = RuleBuilder::new()
            .datetime()
            .custom("must be in 2024", |s| s.starts_with("2024"))
            .build();
        assert!(run(&rule, "2024-03-01").is_ok());
        assert!(run(&rule, "2023-03-01").is_err());
    }

    #[test]
    fn test_sub_builder_build_matches_done_build() {
        let sub = RuleBuilder::new().required().number().min(5);
        let direct = sub.build();
        let via_root = sub.clone().done().build();
        for v in [4, 5, 6] {
            assert_eq!(run(&direct, v).is_ok(), run(&via_root, v).is_ok());
        }
    }
}
