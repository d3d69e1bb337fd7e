//! # Rule Library
//!
//! The [`Rule`] trait and the atomic rules every composition is built from.
//!
//! ## Contract
//!
//! - A rule is immutable after construction, `Send + Sync`, and safe to
//!   share across threads behind an [`Arc`].
//! - `validate` returns `Ok(())`, a validation failure
//!   ([`RuleError::Invalid`]) carrying a stable code from [`code`], or a
//!   contract violation when the value has the wrong shape for the rule.
//! - Messages are English and field-agnostic; the caller attaches the field.
//! - Normal invalid input never panics. A pattern that does not compile
//!   degrades to a rule that always fails.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::context::ValidationContext;
use crate::error::{RuleError, ValidationError};
use crate::patterns::StaticRegex;
use crate::temporal::{self, Layout};
use crate::value::{Number, Value};

/// A single validation unit.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Stable rule name, used in contract-violation errors and logs.
    fn name(&self) -> &str;

    /// Check `value`, returning the first violation found.
    fn validate(&self, ctx: &ValidationContext, value: &Value) -> Result<(), RuleError>;
}

/// A built rule, shareable across threads.
pub type SharedRule = Arc<dyn Rule>;

/// Stable error codes emitted by the built-in rules.
pub mod code {
    pub const REQUIRED: &str = "REQUIRED";
    pub const MIN_LENGTH: &str = "MIN_LENGTH";
    pub const MAX_LENGTH: &str = "MAX_LENGTH";
    pub const PATTERN: &str = "PATTERN";
    pub const INVALID_PATTERN: &str = "INVALID_PATTERN";
    pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
    pub const INVALID_URL: &str = "INVALID_URL";
    pub const INVALID_UUID: &str = "INVALID_UUID";
    pub const MIN_VALUE: &str = "MIN_VALUE";
    pub const MAX_VALUE: &str = "MAX_VALUE";
    pub const INVALID_DATETIME: &str = "INVALID_DATETIME";
    pub const DATE_NOT_BEFORE: &str = "DATE_NOT_BEFORE";
    pub const DATE_NOT_AFTER: &str = "DATE_NOT_AFTER";
    pub const NOT_INTEGER: &str = "NOT_INTEGER";
    pub const DECIMAL_PRECISION: &str = "DECIMAL_PRECISION";
    pub const INVALID_DIRECTIVE: &str = "INVALID_DIRECTIVE";
    pub const CUSTOM: &str = "CUSTOM";
}

static EMAIL: StaticRegex = StaticRegex::new(
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
);

fn string_input<'a>(rule: &str, value: &'a Value) -> Result<&'a str, RuleError> {
    value
        .as_str()
        .ok_or_else(|| RuleError::type_mismatch(rule, "a string", value))
}

fn numeric_input(rule: &str, value: &Value) -> Result<Number, RuleError> {
    value
        .as_number()
        .ok_or_else(|| RuleError::type_mismatch(rule, "a number", value))
}

fn failure(code: &str, message: String, value: &Value) -> RuleError {
    RuleError::Invalid(ValidationError::new(code, message).with_value(value.clone()))
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// Fails on `Null`, empty or whitespace-only strings, and empty collections.
/// `0` and `false` count as present.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Rule for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let present = match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Bool(_) | Value::Number(_) => true,
        };
        if present {
            Ok(())
        } else {
            Err(RuleError::invalid(code::REQUIRED, "value is required"))
        }
    }
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Minimum string length, counted in Unicode scalar values.
#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl Rule for MinLength {
    fn name(&self) -> &str {
        "min_length"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let s = string_input(self.name(), value)?;
        if s.chars().count() < self.0 {
            return Err(failure(code::MIN_LENGTH, format!("minimum length is {}", self.0), value));
        }
        Ok(())
    }
}

/// Maximum string length, counted in Unicode scalar values.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl Rule for MaxLength {
    fn name(&self) -> &str {
        "max_length"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let s = string_input(self.name(), value)?;
        if s.chars().count() > self.0 {
            return Err(failure(code::MAX_LENGTH, format!("maximum length is {}", self.0), value));
        }
        Ok(())
    }
}

/// Regex match. Unanchored unless the pattern anchors itself.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, String>,
}

impl Pattern {
    /// Compile `pattern`. A pattern that does not compile yields a rule that
    /// always fails with `INVALID_PATTERN`.
    pub fn new(pattern: &str) -> Self {
        let compiled = Regex::new(pattern).map_err(|e| {
            tracing::warn!(pattern, error = %e, "pattern does not compile; rule will always fail");
            e.to_string()
        });
        Self {
            source: pattern.to_string(),
            compiled,
        }
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern failed to compile.
    pub fn is_degraded(&self) -> bool {
        self.compiled.is_err()
    }
}

impl Rule for Pattern {
    fn name(&self) -> &str {
        "pattern"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let re = match &self.compiled {
            Ok(re) => re,
            Err(_) => {
                return Err(failure(
                    code::INVALID_PATTERN,
                    format!("invalid pattern {}", self.source),
                    value,
                ))
            }
        };
        let s = string_input(self.name(), value)?;
        if !re.is_match(s) {
            return Err(failure(
                code::PATTERN,
                format!("value does not match pattern {}", self.source),
                value,
            ));
        }
        Ok(())
    }
}

/// Email address syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Rule for Email {
    fn name(&self) -> &str {
        "email"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let s = string_input(self.name(), value)?;
        if !EMAIL.is_match(s) {
            return Err(failure(code::INVALID_EMAIL, "invalid email address".into(), value));
        }
        Ok(())
    }
}

/// Absolute URL with a scheme and a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct Url;

impl Rule for Url {
    fn name(&self) -> &str {
        "url"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let s = string_input(self.name(), value)?;
        match url::Url::parse(s) {
            Ok(parsed) if parsed.has_host() => Ok(()),
            _ => Err(failure(code::INVALID_URL, "invalid URL".into(), value)),
        }
    }
}

/// UUID in any of the textual forms `uuid` accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uuid;

impl Rule for Uuid {
    fn name(&self) -> &str {
        "uuid"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let s = string_input(self.name(), value)?;
        if uuid::Uuid::parse_str(s).is_err() {
            return Err(failure(code::INVALID_UUID, "invalid UUID".into(), value));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Lower numeric bound. Inclusive unless built with [`MinValue::exclusive`].
#[derive(Debug, Clone)]
pub struct MinValue {
    bound: Number,
    exclusive: bool,
}

impl MinValue {
    /// `value >= bound`.
    pub fn new(bound: impl Into<Number>) -> Self {
        Self {
            bound: bound.into(),
            exclusive: false,
        }
    }

    /// `value > bound`.
    pub fn exclusive(bound: impl Into<Number>) -> Self {
        Self {
            bound: bound.into(),
            exclusive: true,
        }
    }
}

impl Rule for MinValue {
    fn name(&self) -> &str {
        "min_value"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let n = numeric_input(self.name(), value)?;
        let ordering = compare(self.name(), &n, &self.bound)?;
        match (ordering, self.exclusive) {
            (Ordering::Less, false) => Err(failure(
                code::MIN_VALUE,
                format!("minimum value is {}", self.bound),
                value,
            )),
            (Ordering::Less | Ordering::Equal, true) => Err(failure(
                code::MIN_VALUE,
                format!("value must be greater than {}", self.bound),
                value,
            )),
            _ => Ok(()),
        }
    }
}

/// Inclusive upper numeric bound.
#[derive(Debug, Clone)]
pub struct MaxValue {
    bound: Number,
}

impl MaxValue {
    /// `value <= bound`.
    pub fn new(bound: impl Into<Number>) -> Self {
        Self { bound: bound.into() }
    }
}

impl Rule for MaxValue {
    fn name(&self) -> &str {
        "max_value"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let n = numeric_input(self.name(), value)?;
        if compare(self.name(), &n, &self.bound)? == Ordering::Greater {
            return Err(failure(
                code::MAX_VALUE,
                format!("maximum value is {}", self.bound),
                value,
            ));
        }
        Ok(())
    }
}

fn compare(rule: &str, value: &Number, bound: &Number) -> Result<Ordering, RuleError> {
    value.compare(bound).ok_or_else(|| RuleError::Parse {
        rule: rule.to_string(),
        input: format!("{value} vs {bound}"),
        reason: "values are not comparable".into(),
    })
}

/// Caps the number of significant digits after the decimal point.
/// With a cap of zero the rule demands an integral value.
#[derive(Debug, Clone, Copy)]
pub struct FractionDigits {
    max: usize,
}

impl FractionDigits {
    /// At most `max` fraction digits.
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    /// No fraction digits at all.
    pub fn integer() -> Self {
        Self { max: 0 }
    }
}

impl Rule for FractionDigits {
    fn name(&self) -> &str {
        if self.max == 0 {
            "integer"
        } else {
            "decimal"
        }
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let n = numeric_input(self.name(), value)?;
        let digits = n.fraction_digits().ok_or_else(|| RuleError::Parse {
            rule: self.name().to_string(),
            input: n.to_string(),
            reason: "not a finite number".into(),
        })?;
        if digits <= self.max {
            return Ok(());
        }
        if self.max == 0 {
            Err(failure(code::NOT_INTEGER, "value must be an integer".into(), value))
        } else {
            Err(failure(
                code::DECIMAL_PRECISION,
                format!("at most {} decimal places allowed", self.max),
                value,
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Dates and times
// ---------------------------------------------------------------------------

/// The string must parse under one layout.
#[derive(Debug, Clone)]
pub struct DateTimeFormat {
    layout: Layout,
}

impl DateTimeFormat {
    /// Match against `layout`.
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// The layout this rule checks.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl Rule for DateTimeFormat {
    fn name(&self) -> &str {
        "datetime_format"
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let s = string_input(self.name(), value)?;
        if !self.layout.matches(s) {
            return Err(failure(
                code::INVALID_DATETIME,
                format!("invalid format, expected: {}", self.layout),
                value,
            ));
        }
        Ok(())
    }
}

/// Which side of the boundary a date must fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    /// Strictly earlier than the boundary.
    Before,
    /// Strictly later than the boundary.
    After,
}

/// Exclusive RFC 3339 date bound. Both the candidate and the boundary are
/// parsed as RFC 3339; either failing to parse is a contract violation.
#[derive(Debug, Clone)]
pub struct DateBound {
    boundary: String,
    side: BoundSide,
}

impl DateBound {
    /// Candidate must be earlier than `boundary`.
    pub fn before(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            side: BoundSide::Before,
        }
    }

    /// Candidate must be later than `boundary`.
    pub fn after(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            side: BoundSide::After,
        }
    }

    fn parse(&self, input: &str) -> Result<chrono::DateTime<chrono::FixedOffset>, RuleError> {
        temporal::parse_rfc3339(input).map_err(|e| RuleError::Parse {
            rule: self.name().to_string(),
            input: input.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Rule for DateBound {
    fn name(&self) -> &str {
        match self.side {
            BoundSide::Before => "before",
            BoundSide::After => "after",
        }
    }

    fn validate(&self, _ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        let s = string_input(self.name(), value)?;
        let candidate = self.parse(s)?;
        let boundary = self.parse(&self.boundary)?;
        match self.side {
            BoundSide::Before if candidate >= boundary => Err(failure(
                code::DATE_NOT_BEFORE,
                format!("date must be before {}", self.boundary),
                value,
            )),
            BoundSide::After if candidate <= boundary => Err(failure(
                code::DATE_NOT_AFTER,
                format!("date must be after {}", self.boundary),
                value,
            )),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Custom and degraded rules
// ---------------------------------------------------------------------------

type CheckFn = dyn Fn(&ValidationContext, &Value) -> Result<(), RuleError> + Send + Sync;

/// Caller-supplied check.
#[derive(Clone)]
pub struct Custom {
    name: String,
    check: Arc<CheckFn>,
}

impl Custom {
    /// Wrap a full check function.
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ValidationContext, &Value) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Wrap a boolean predicate; a `false` result fails with code `CUSTOM`
    /// and `message`.
    pub fn predicate<F>(name: impl Into<String>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Self::new(name, move |_ctx, value| {
            if predicate(value) {
                Ok(())
            } else {
                Err(failure(code::CUSTOM, message.clone(), value))
            }
        })
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Rule for Custom {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        (self.check)(ctx, value)
    }
}

/// Stands in for a rule that could not be configured. Always fails.
#[derive(Debug, Clone)]
pub struct Misconfigured {
    reason: String,
}

impl Misconfigured {
    /// Record why configuration failed.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl Rule for Misconfigured {
    fn name(&self) -> &str {
        "misconfigured"
    }

    fn validate(&self, _ctx: &ValidationContext, _value: &Value) -> Result<(), RuleError> {
        Err(RuleError::invalid(
            code::INVALID_DIRECTIVE,
            format!("invalid validation directive: {}", self.reason),
        ))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Length rules agree with a code point count for arbitrary text.
        #[test]
        fn length_rules_count_code_points(s in "\\PC{0,40}", n in 0usize..40) {
            let ctx = ValidationContext::new();
            let value = Value::from(s.as_str());
            let len = s.chars().count();
            prop_assert_eq!(MinLength(n).validate(&ctx, &value).is_ok(), len >= n);
            prop_assert_eq!(MaxLength(n).validate(&ctx, &value).is_ok(), len <= n);
        }

        /// Integer bounds agree with native integer comparison.
        #[test]
        fn min_value_matches_integer_order(v in any::<i64>(), bound in any::<i64>()) {
            let ok = MinValue::new(bound).validate(&ValidationContext::new(), &Value::from(v)).is_ok();
            prop_assert_eq!(ok, v >= bound);
        }

        /// Arbitrary patterns never panic: they either compile or always fail.
        #[test]
        fn patterns_never_panic(pattern in "\\PC{0,12}", input in "\\PC{0,12}") {
            let rule = Pattern::new(&pattern);
            let outcome = rule.validate(&ValidationContext::new(), &Value::from(input.as_str()));
            if rule.is_degraded() {
                prop_assert!(outcome.is_err());
            }
        }
    }
}
