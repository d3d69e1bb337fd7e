//! # Violation Codes
//!
//! Translates engine violations into the violation-type strings and error
//! codes downstream services match on. The code table is an external
//! contract: codes are never renamed, and unknown violation types fall
//! back to [`VALIDATION_ERROR`].
//!
//! | Violation type | Code |
//! |---|---|
//! | `required` | `REQUIRED_ATTRIBUTE_MISSING` |
//! | `invalid_type` | `INVALID_DATA_TYPE` |
//! | `enum`, `const` | `INVALID_VALUE` |
//! | `format` | `INVALID_FORMAT` |
//! | `string_gte`, `string_lte` | `INVALID_LENGTH` |
//! | anything else | `VALIDATION_ERROR` |

use jsonschema::error::ValidationErrorKind;

pub const REQUIRED_ATTRIBUTE_MISSING: &str = "REQUIRED_ATTRIBUTE_MISSING";
pub const INVALID_DATA_TYPE: &str = "INVALID_DATA_TYPE";
pub const INVALID_VALUE: &str = "INVALID_VALUE";
pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
pub const INVALID_LENGTH: &str = "INVALID_LENGTH";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// Code for a violation-type string.
pub fn code_for(violation_type: &str) -> &'static str {
    match violation_type {
        "required" => REQUIRED_ATTRIBUTE_MISSING,
        "invalid_type" => INVALID_DATA_TYPE,
        "enum" | "const" => INVALID_VALUE,
        "format" => INVALID_FORMAT,
        "string_gte" | "string_lte" => INVALID_LENGTH,
        _ => VALIDATION_ERROR,
    }
}

/// Violation-type string for an engine error kind.
pub fn violation_type(kind: &ValidationErrorKind) -> &'static str {
    match kind {
        ValidationErrorKind::Required { .. } => "required",
        ValidationErrorKind::Type { .. } => "invalid_type",
        ValidationErrorKind::Enum { .. } => "enum",
        ValidationErrorKind::Constant { .. } => "const",
        ValidationErrorKind::Format { .. } => "format",
        ValidationErrorKind::MinLength { .. } => "string_gte",
        ValidationErrorKind::MaxLength { .. } => "string_lte",
        ValidationErrorKind::Minimum { .. } => "number_gte",
        ValidationErrorKind::Maximum { .. } => "number_lte",
        ValidationErrorKind::ExclusiveMinimum { .. } => "number_gt",
        ValidationErrorKind::ExclusiveMaximum { .. } => "number_lt",
        ValidationErrorKind::MultipleOf { .. } => "multiple_of",
        ValidationErrorKind::Pattern { .. } => "pattern",
        ValidationErrorKind::AdditionalProperties { .. } => "additional_property_not_allowed",
        ValidationErrorKind::MinItems { .. } => "array_min_items",
        ValidationErrorKind::MaxItems { .. } => "array_max_items",
        ValidationErrorKind::MinProperties { .. } => "array_min_properties",
        ValidationErrorKind::MaxProperties { .. } => "array_max_properties",
        _ => "validation",
    }
}
