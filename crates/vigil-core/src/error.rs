//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout vigil. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! Two channels are kept apart and never conflated:
//!
//! - **Validation failures**: the input is well-typed but violates a
//!   constraint. Carried as [`RuleError::Invalid`] with a
//!   [`ValidationError`] and accumulated into a
//!   [`ValidationResult`](crate::ValidationResult).
//! - **Contract violations**: a rule was applied to a value it cannot
//!   interpret (a length rule on a number, an unparsable date boundary).
//!   Carried as [`RuleError::TypeMismatch`] or [`RuleError::Parse`].
//!
//! [`DomainError`] is the structured error a caller surfaces once a
//! result is known to be failing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::ValidationResult;
use crate::value::Value;

/// Key under which global errors are reported in a [`DomainError`].
pub const GLOBAL_ERROR_KEY: &str = "_global";

/// Code carried by every [`DomainError`].
pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";

/// A single rule's validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field the failure belongs to, attached by the caller.
    pub field: Option<String>,
    /// Human-readable, field-agnostic message.
    pub message: String,
    /// Opaque, stable error code (e.g. `MIN_LENGTH`).
    pub code: String,
    /// The offending value. Diagnostics only.
    pub value: Option<Value>,
}

impl ValidationError {
    /// Create a failure with a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
            code: code.into(),
            value: None,
        }
    }

    /// Attach the field name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Attach the offending value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Error returned by [`Rule::validate`](crate::Rule::validate).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// The value violates the rule's constraint.
    #[error("{0}")]
    Invalid(ValidationError),

    /// The rule cannot interpret a value of this kind.
    #[error("rule `{rule}` expects {expected}, got {found}")]
    TypeMismatch {
        /// Name of the rule that rejected the value.
        rule: String,
        /// What the rule accepts.
        expected: &'static str,
        /// Kind of the value actually supplied.
        found: &'static str,
    },

    /// The rule could not parse an input or one of its own arguments.
    #[error("rule `{rule}` could not parse {input:?}: {reason}")]
    Parse {
        /// Name of the rule.
        rule: String,
        /// The text that failed to parse.
        input: String,
        /// Parser error text.
        reason: String,
    },
}

impl RuleError {
    /// Shorthand for a validation failure with a code and message.
    pub fn invalid(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid(ValidationError::new(code, message))
    }

    /// Contract violation for a value of the wrong kind.
    pub fn type_mismatch(rule: &str, expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            rule: rule.to_string(),
            expected,
            found: found.kind(),
        }
    }

    /// Whether this is a contract violation rather than a validation failure.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }

    /// Stable code for this error.
    pub fn code(&self) -> &str {
        match self {
            Self::Invalid(e) => &e.code,
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::Parse { .. } => "PARSE_ERROR",
        }
    }

    /// Message recorded into a [`ValidationResult`].
    pub fn message(&self) -> String {
        match self {
            Self::Invalid(e) => e.message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for RuleError {
    fn from(e: ValidationError) -> Self {
        Self::Invalid(e)
    }
}

/// A malformed token in a record field's directive string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// The directive name is not part of the language.
    #[error("unknown directive `{0}`")]
    Unknown(String),

    /// A directive that needs `=value` was given none.
    #[error("directive `{0}` requires a value")]
    MissingArgument(String),

    /// The directive's argument could not be used.
    #[error("directive `{name}` has invalid argument {value:?}")]
    InvalidArgument {
        /// Directive name.
        name: String,
        /// The argument as written.
        value: String,
    },

    /// The directive cannot apply to the field's kind.
    #[error("directive `{directive}` does not apply to {kind} fields")]
    NotApplicable {
        /// Directive name.
        directive: String,
        /// Field kind it was attached to.
        kind: &'static str,
    },
}

/// Structured error produced from a failing [`ValidationResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct DomainError {
    /// Always [`VALIDATION_FAILED`].
    pub code: String,
    /// Summary message.
    pub message: String,
    /// Field → messages. Global errors appear under [`GLOBAL_ERROR_KEY`].
    pub details: BTreeMap<String, Vec<String>>,
}

impl DomainError {
    /// Build a domain error from a result, or `None` if the result is valid.
    pub fn from_result(result: &ValidationResult) -> Option<Self> {
        if result.is_valid() {
            return None;
        }
        let mut details = result.errors().clone();
        if !result.global_errors().is_empty() {
            details
                .entry(GLOBAL_ERROR_KEY.to_string())
                .or_default()
                .extend(result.global_errors().iter().cloned());
        }
        Some(Self {
            code: VALIDATION_FAILED.to_string(),
            message: format!("validation failed with {} error(s)", result.error_count()),
            details,
        })
    }

    /// Messages recorded for one field (or [`GLOBAL_ERROR_KEY`]).
    pub fn field(&self, field: &str) -> &[String] {
        self.details.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}
