//! # vigil-schema — JSON Schema Validation with Custom Formats
//!
//! Validates instances against JSON Schema documents through the
//! `jsonschema` engine and reports results as
//! [`vigil_core::ValidationResult`], so schema-driven and rule-driven
//! validation share one error shape.
//!
//! ## Modules
//!
//! - [`formats`]: the [`FormatValidator`] trait and the built-in checkers.
//! - [`registry`]: [`FormatRegistry`], the process-wide format namespace.
//! - [`codes`]: violation type to error code translation.
//! - [`engine`]: compilation, offline `$ref` retrieval, field keys.
//! - `walk` (internal): format checks on number and boolean instances.
//! - [`validate`]: [`SchemaValidator`].
//!
//! ## Crate Policy
//!
//! - Depends only on `vigil-core` internally.
//! - The code table in [`codes`] is consumed by other services. Codes are
//!   never renamed.
//! - No network access: `$ref` targets must be registered with
//!   [`SchemaValidator::add_resource`].

pub mod codes;
pub mod engine;
pub mod error;
pub mod formats;
pub mod registry;
pub mod validate;
mod walk;

// Re-export primary types for ergonomic imports.
pub use engine::Violation;
pub use error::SchemaError;
pub use formats::{FormatFn, FormatValidator, BUILTIN_FORMATS};
pub use jsonschema::Draft;
pub use registry::{FormatRegistry, SharedFormat};
pub use validate::{SchemaValidator, SchemaValidatorConfig, SCHEMA_FIELD};
