//! # Validation Results
//!
//! [`ValidationResult`] aggregates per-field errors, global errors and
//! warnings across any number of rules and fields.
//!
//! ## Invariants
//!
//! - `valid == errors.is_empty() && global_errors.is_empty()` at all times.
//! - A fresh result is valid. Recording an error makes it invalid for good;
//!   there is no removal API.
//! - Warnings never affect validity.
//! - [`merge`](ValidationResult::merge) appends the other result's messages
//!   after this result's, per key, so merging is associative and preserves
//!   order.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::DomainError;

/// Outcome of validating a value, a record or a schema instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    errors: BTreeMap<String, Vec<String>>,
    global_errors: Vec<String>,
    warnings: BTreeMap<String, Vec<String>>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// An empty, valid result.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: BTreeMap::new(),
            global_errors: Vec::new(),
            warnings: BTreeMap::new(),
        }
    }

    /// Record an error against a field.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
        self.valid = false;
    }

    /// Record an error not tied to a field.
    pub fn add_global_error(&mut self, message: impl Into<String>) {
        self.global_errors.push(message.into());
        self.valid = false;
    }

    /// Record a warning against a field. Does not affect validity.
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.entry(field.into()).or_default().push(message.into());
    }

    /// Append everything from `other` after this result's entries.
    pub fn merge(&mut self, other: &ValidationResult) -> &mut Self {
        for (field, messages) in &other.errors {
            self.errors
                .entry(field.clone())
                .or_default()
                .extend(messages.iter().cloned());
        }
        self.global_errors.extend(other.global_errors.iter().cloned());
        for (field, messages) in &other.warnings {
            self.warnings
                .entry(field.clone())
                .or_default()
                .extend(messages.iter().cloned());
        }
        self.valid = self.valid && other.valid;
        self
    }

    /// Owned variant of [`merge`](Self::merge).
    pub fn merged(mut self, other: &ValidationResult) -> Self {
        self.merge(other);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Field → messages, in insertion order per field.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Messages recorded for one field.
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn global_errors(&self) -> &[String] {
        &self.global_errors
    }

    pub fn warnings(&self) -> &BTreeMap<String, Vec<String>> {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Total error messages, field and global.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum::<usize>() + self.global_errors.len()
    }

    /// JSON rendering with the keys `valid`, `errors`, `global_errors`,
    /// `warnings` and `error_count`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "valid": self.valid,
            "errors": self.errors,
            "global_errors": self.global_errors,
            "warnings": self.warnings,
            "error_count": self.error_count(),
        })
    }

    /// Structured error for a failing result; `None` when valid.
    pub fn to_domain_error(&self) -> Option<DomainError> {
        DomainError::from_result(self)
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("valid", &self.valid)?;
        map.serialize_entry("errors", &self.errors)?;
        map.serialize_entry("global_errors", &self.global_errors)?;
        map.serialize_entry("warnings", &self.warnings)?;
        map.serialize_entry("error_count", &self.error_count())?;
        map.end()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        write!(f, "{} error(s)", self.error_count())?;
        for message in &self.global_errors {
            write!(f, "\n  {message}")?;
        }
        for (field, messages) in &self.errors {
            for message in messages {
                write!(f, "\n  {field}: {message}")?;
            }
        }
        Ok(())
    }
}
