//! # Format Checkers
//!
//! A [`FormatValidator`] is a named predicate the schema engine consults for
//! the `format` keyword. This module defines the trait, a closure adapter,
//! and the built-in checkers pre-registered by every
//! [`SchemaValidator`](crate::SchemaValidator).
//!
//! ## Built-ins
//!
//! | Name | Accepts |
//! |---|---|
//! | `date_time` | time, time with offset, date, RFC 3339 (any fraction), ISO 8601 with milliseconds |
//! | `iso_8601_date` | `YYYY-MM-DD` naming a real calendar date |
//! | `strong_name` | a letter, then letters, digits, `_` or `-` |
//! | `text_match` | letters, `_` and spaces |
//! | `text_match_with_number` | letters, digits `1`-`9`, `_` and spaces (no `0`) |
//! | `json_number` | numeric text only, never an already-decoded number |
//! | `decimal` | same as `json_number` |
//! | `decimal_by_factor_of_8` | `decimal` with at most 8 significant fraction digits |
//! | `empty_string` | `""` |
//! | `string` | any string |
//!
//! `text_match_with_number` rejects the digit zero. Existing schemas depend
//! on that, so it stays.
//!
//! A checker sees a [`Value::String`] for string instances, a
//! [`Number::Decimal`] literal for numbers and a [`Value::Bool`] for
//! booleans. The numeric-text checkers accept the first two and reject
//! already-decoded `Integer`/`Float` values.

use vigil_core::temporal;
use vigil_core::{Number, StaticRegex, Value};

/// A named predicate for the schema `format` keyword.
pub trait FormatValidator: Send + Sync {
    /// Whether `value` is in this format.
    fn is_format(&self, value: &Value) -> bool;
}

/// Adapts a closure or function into a [`FormatValidator`].
#[derive(Debug, Clone, Copy)]
pub struct FormatFn<F>(pub F);

impl<F> FormatValidator for FormatFn<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn is_format(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

/// Names and checkers registered on every construction.
pub const BUILTIN_FORMATS: [(&str, fn(&Value) -> bool); 10] = [
    ("date_time", date_time),
    ("iso_8601_date", iso_8601_date),
    ("text_match", text_match),
    ("text_match_with_number", text_match_with_number),
    ("strong_name", strong_name),
    ("json_number", json_number),
    ("decimal", decimal),
    ("decimal_by_factor_of_8", decimal_by_factor_of_8),
    ("empty_string", empty_string),
    ("string", string),
];

static ISO_DATE: StaticRegex = StaticRegex::new(r"^\d{4}-\d{2}-\d{2}$");
static STRONG_NAME: StaticRegex = StaticRegex::new(r"^[A-Za-z][A-Za-z0-9_-]*$");
static TEXT: StaticRegex = StaticRegex::new(r"^[a-zA-Z_ ]*$");
static TEXT_WITH_NUMBER: StaticRegex = StaticRegex::new(r"^[a-zA-Z1-9_ ]*$");
static JSON_NUMBER: StaticRegex =
    StaticRegex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?$");

/// Maximum fraction digits accepted by `decimal_by_factor_of_8`.
const MAX_FRACTION_DIGITS: usize = 8;

/// Time, time with offset, date, RFC 3339 or ISO 8601 with milliseconds.
pub fn date_time(value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    temporal::parse_time(s).is_some()
        || temporal::parse_time_with_offset(s).is_some()
        || temporal::parse_date(s).is_some()
        || temporal::parse_rfc3339(s).is_ok()
        || temporal::parse_iso8601_millis(s).is_some()
}

/// `YYYY-MM-DD` that names a real date.
pub fn iso_8601_date(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| ISO_DATE.is_match(s) && temporal::parse_date(s).is_some())
}

pub fn strong_name(value: &Value) -> bool {
    value.as_str().is_some_and(|s| STRONG_NAME.is_match(s))
}

pub fn text_match(value: &Value) -> bool {
    value.as_str().is_some_and(|s| TEXT.is_match(s))
}

pub fn text_match_with_number(value: &Value) -> bool {
    value.as_str().is_some_and(|s| TEXT_WITH_NUMBER.is_match(s))
}

/// The numeric text of a value that arrived undecoded.
fn numeric_text(value: &Value) -> Option<&str> {
    let text = match value {
        Value::Number(Number::Decimal(text)) => text.as_str(),
        Value::String(s) => s.as_str(),
        _ => return None,
    };
    JSON_NUMBER.is_match(text).then_some(text)
}

pub fn json_number(value: &Value) -> bool {
    numeric_text(value).is_some()
}

pub fn decimal(value: &Value) -> bool {
    numeric_text(value).is_some()
}

pub fn decimal_by_factor_of_8(value: &Value) -> bool {
    numeric_text(value)
        .and_then(|text| Number::literal(text).fraction_digits())
        .is_some_and(|digits| digits <= MAX_FRACTION_DIGITS)
}

pub fn empty_string(value: &Value) -> bool {
    value.as_str().is_some_and(str::is_empty)
}

pub fn string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The fraction limit agrees with a count of significant digits.
        #[test]
        fn factor_of_8_matches_digit_count(int in "0|[1-9][0-9]{0,6}", frac in "[0-9]{0,12}") {
            let text = if frac.is_empty() { int.clone() } else { format!("{int}.{frac}") };
            let significant = frac.trim_end_matches('0').len();
            prop_assert!(decimal(&Value::from(text.as_str())));
            prop_assert_eq!(decimal_by_factor_of_8(&Value::from(text.as_str())), significant <= 8);
            prop_assert_eq!(
                decimal_by_factor_of_8(&Value::Number(Number::literal(text))),
                significant <= 8
            );
        }

        /// Any `i64` exponent is handled without overflow.
        #[test]
        fn factor_of_8_handles_any_exponent(digit in 1u8..=9, exponent in any::<i64>()) {
            let text = format!("{digit}e{exponent}");
            prop_assert_eq!(decimal_by_factor_of_8(&Value::from(text.as_str())), exponent >= -8);
        }
    }
}
