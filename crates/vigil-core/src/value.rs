//! # Dynamic Values
//!
//! Defines [`Value`], the dynamic representation every rule operates on, and
//! [`Number`], an explicit tagged union over the numeric representations a
//! caller can hand us.
//!
//! ## Numeric Model
//!
//! Numbers are never silently downcast to `f64`. A [`Number`] is one of:
//!
//! - `Integer(i128)`: every Rust integer width (`i8`..`i64`, `u8`..`u64`)
//!   fits without loss.
//! - `Float(f64)`: an already-decoded floating point value.
//! - `Decimal(String)`: a tagged numeric literal: numeric text that has not
//!   been decoded yet (e.g. a JSON number kept as text, or a numeric string).
//!
//! Comparisons resolve a `Decimal` literal first (integer literal → `Integer`,
//! anything else → `Float`) and then compare per pair:
//!
//! - `Integer` vs `Integer`: exact.
//! - `Integer` vs `Float`: exact when the float is integral and inside the
//!   `i128` range, otherwise ordered by the float's floor/range.
//! - `Float` vs `Float`: IEEE ordering; `NaN` is incomparable.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A numeric value with its representation kept explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    /// An integer of any width up to 128 bits.
    Integer(i128),
    /// A decoded floating point value.
    Float(f64),
    /// Unparsed numeric text.
    Decimal(String),
}

/// A [`Number`] after its literal (if any) has been decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved {
    /// Exact integer.
    Integer(i128),
    /// Floating point value (always finite).
    Float(f64),
}

impl Number {
    /// Wrap numeric text as a tagged literal without decoding it.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Decimal(text.into())
    }

    /// Decode the number. Returns `None` for a literal that is not numeric
    /// text, or for a non-finite literal.
    pub fn resolve(&self) -> Option<Resolved> {
        match self {
            Number::Integer(i) => Some(Resolved::Integer(*i)),
            Number::Float(f) => Some(Resolved::Float(*f)),
            Number::Decimal(text) => {
                let text = text.trim();
                if let Ok(i) = text.parse::<i128>() {
                    return Some(Resolved::Integer(i));
                }
                text.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(Resolved::Float)
            }
        }
    }

    /// Lossy `f64` view, used only where a predicate is defined over floats.
    pub fn as_f64(&self) -> Option<f64> {
        self.resolve().map(|r| match r {
            Resolved::Integer(i) => i as f64,
            Resolved::Float(f) => f,
        })
    }

    /// Order two numbers following the per-pair conversion rules.
    ///
    /// Returns `None` when either side is not a number (unparsable literal)
    /// or when a `NaN` is involved.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        match (self.resolve()?, other.resolve()?) {
            (Resolved::Integer(a), Resolved::Integer(b)) => Some(a.cmp(&b)),
            (Resolved::Float(a), Resolved::Float(b)) => a.partial_cmp(&b),
            (Resolved::Integer(a), Resolved::Float(b)) => compare_integer_float(a, b),
            (Resolved::Float(a), Resolved::Integer(b)) => {
                compare_integer_float(b, a).map(Ordering::reverse)
            }
        }
    }

    /// Number of significant digits after the decimal point.
    ///
    /// Exact for `Integer` and `Decimal` literals (exponents and trailing
    /// zeros are taken into account). For `Float` it reflects the shortest
    /// round-trip representation of the `f64`, so integral checks on floats
    /// are only meaningful up to 2^53.
    pub fn fraction_digits(&self) -> Option<usize> {
        match self {
            Number::Integer(_) => Some(0),
            Number::Float(f) if f.is_finite() => significant_fraction_digits(&f.to_string()),
            Number::Float(_) => None,
            Number::Decimal(text) => significant_fraction_digits(text),
        }
    }

    /// Whether the number has no fractional part.
    pub fn is_integral(&self) -> Option<bool> {
        self.fraction_digits().map(|digits| digits == 0)
    }
}

/// Compare an exact integer against a float without going through `f64`
/// for the integer side.
fn compare_integer_float(i: i128, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    // 2^127: the first float above every i128.
    let upper = i128::MAX as f64;
    if f >= upper {
        return Some(Ordering::Less);
    }
    if f < -upper {
        return Some(Ordering::Greater);
    }
    let floor = f.floor() as i128;
    if f.fract() == 0.0 {
        Some(i.cmp(&floor))
    } else if i <= floor {
        Some(Ordering::Less)
    } else {
        Some(Ordering::Greater)
    }
}

/// Count significant fraction digits of numeric text such as `-12.50e-1`.
pub(crate) fn significant_fraction_digits(text: &str) -> Option<usize> {
    let text = text.trim();
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], unsigned[idx + 1..].parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    // i128 holds any usize length minus any i64 exponent.
    let mut digits: String = format!("{int_part}{frac_part}");
    let mut scale = frac_part.len() as i128 - i128::from(exponent);
    while digits.ends_with('0') {
        digits.pop();
        scale -= 1;
    }
    if digits.is_empty() {
        return Some(0);
    }
    Some(usize::try_from(scale.max(0)).unwrap_or(usize::MAX))
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
            Number::Decimal(text) => f.write_str(text),
        }
    }
}

macro_rules! integer_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(v: $t) -> Self {
                    Number::Integer(v as i128)
                }
            }

            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Number(Number::from(v))
                }
            }
        )*
    };
}

integer_number!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::Float(f64::from(v))
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A dynamically typed value handed to rules.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value (`None`, JSON `null`).
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Any numeric representation.
    Number(Number),
    /// Text.
    String(String),
    /// Ordered collection.
    List(Vec<Value>),
    /// String-keyed map.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the value's kind, used in contract-violation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Whether the value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value.
    ///
    /// Numbers are returned as-is; strings holding numeric text are coerced
    /// into a `Decimal` literal. Anything else is not numeric.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(n.clone()),
            Value::String(s) => {
                let literal = Number::literal(s.as_str());
                literal.resolve().map(|_| literal)
            }
            _ => None,
        }
    }

    /// Convert back into a `serde_json::Value` for serialization.
    ///
    /// Integers outside the JSON-native `i64`/`u64` range and literals that
    /// are not valid JSON number text are emitted as strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(Number::Integer(i)) => {
                if let Ok(v) = i64::try_from(*i) {
                    serde_json::Value::from(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    serde_json::Value::from(v)
                } else {
                    serde_json::Value::String(i.to_string())
                }
            }
            Value::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Number(Number::Decimal(text)) => serde_json::from_str::<serde_json::Number>(text)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|_| serde_json::Value::String(text.clone())),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(_) | Value::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(Number::Float(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Value::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::Integer(i128::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::Integer(i128::from(u)))
                } else {
                    n.as_f64()
                        .map(|f| Value::Number(Number::Float(f)))
                        .unwrap_or_else(|| Value::Number(Number::Decimal(n.to_string())))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from(&v)
    }
}
