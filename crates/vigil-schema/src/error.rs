//! Errors raised before an instance can be checked against a schema.
//!
//! [`SchemaValidator::validate_schema`](crate::SchemaValidator::validate_schema)
//! turns any of these into a single global error on the result; callers of
//! [`SchemaValidator::check`](crate::SchemaValidator::check) receive them
//! directly.

use thiserror::Error;

/// Failure to prepare a schema or instance for validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema document is not valid JSON.
    #[error("invalid schema: malformed JSON: {reason}")]
    MalformedSchema {
        /// Parser error text.
        reason: String,
    },

    /// The engine refused to compile the schema.
    #[error("invalid schema: {reason}")]
    CompileFailed {
        /// Engine error text.
        reason: String,
    },

    /// The instance could not be serialized to JSON.
    #[error("instance could not be serialized: {reason}")]
    InstanceSerialization {
        /// Serializer error text.
        reason: String,
    },
}
