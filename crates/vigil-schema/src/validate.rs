//! # Schema Validation
//!
//! [`SchemaValidator`] checks instances against JSON Schema documents and
//! reports the result in the same [`ValidationResult`] shape as rule-based
//! validation.
//!
//! ## Format Registration
//!
//! A validator keeps its own map of format checkers and also publishes every
//! registration to [`FormatRegistry::global`], which is what the engine
//! actually consults. The validator's map starts with the built-in
//! checkers; the global registry gets them once, when first used.
//! Constructing a validator never touches the global registry. See the
//! registry docs for the shared-namespace hazard.
//!
//! ## Failure Modes
//!
//! - Instance violations: one error per violation, keyed by field, message
//!   is the stable code from [`crate::codes`]. Registered formats also
//!   apply to numbers and booleans, which the engine skips.
//! - Malformed or uncompilable schema, unserializable instance: exactly one
//!   global error.
//! - `format` names the engine does not know and nothing registered: a
//!   warning under `(schema)`. The engine does not check those values.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::Draft;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value as JsonValue;
use vigil_core::{DomainError, ValidationContext, ValidationResult, Value};

use crate::engine::{self, Violation, ENGINE_FORMATS};
use crate::error::SchemaError;
use crate::formats::{FormatFn, FormatValidator, BUILTIN_FORMATS};
use crate::registry::{FormatRegistry, SharedFormat};
use crate::walk;

/// Field key for warnings about the schema document itself.
pub const SCHEMA_FIELD: &str = "(schema)";

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaValidatorConfig {
    /// Draft to validate under; `None` lets the engine read `$schema`.
    pub draft: Option<Draft>,
    /// Whether `format` is an assertion (`true`) or an annotation.
    pub validate_formats: bool,
}

impl Default for SchemaValidatorConfig {
    fn default() -> Self {
        Self {
            draft: None,
            validate_formats: true,
        }
    }
}

/// JSON Schema validator with pluggable format checkers.
pub struct SchemaValidator {
    config: SchemaValidatorConfig,
    formats: RwLock<HashMap<String, SharedFormat>>,
    registry: &'static FormatRegistry,
    resources: HashMap<String, JsonValue>,
}

impl SchemaValidator {
    /// A validator with the default config and the built-in formats.
    pub fn new() -> Self {
        Self::with_config(SchemaValidatorConfig::default())
    }

    pub fn with_config(config: SchemaValidatorConfig) -> Self {
        let formats = BUILTIN_FORMATS
            .iter()
            .map(|(name, check)| (name.to_string(), Arc::new(FormatFn(*check)) as SharedFormat))
            .collect();
        Self {
            config,
            formats: RwLock::new(formats),
            registry: FormatRegistry::global(),
            resources: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SchemaValidatorConfig {
        &self.config
    }

    /// Register a predicate as the checker for `name`.
    pub fn register_format_validator<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.add_custom_format(name, FormatFn(predicate));
    }

    /// Register `validator` as the checker for `name`, here and process-wide.
    pub fn add_custom_format(&self, name: impl Into<String>, validator: impl FormatValidator + 'static) {
        let name = name.into();
        let shared: SharedFormat = Arc::new(validator);
        self.formats.write().insert(name.clone(), Arc::clone(&shared));
        if self.registry.register(name.clone(), shared).is_some() {
            tracing::warn!(format = %name, "format checker replaced in the process-wide registry");
        }
    }

    /// Names registered through this validator, sorted.
    pub fn format_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.formats.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Make `schema` resolvable by `$ref` under `uri`.
    ///
    /// Remote references are never fetched; anything not added here fails
    /// to compile.
    pub fn add_resource(&mut self, uri: impl Into<String>, schema: JsonValue) -> &mut Self {
        self.resources.insert(uri.into(), schema);
        self
    }

    /// Every violation `instance` has against `schema`.
    pub fn check(&self, instance: &JsonValue, schema: &JsonValue) -> Result<Vec<Violation>, SchemaError> {
        let formats = self.registry.snapshot();
        let validator = engine::compile(schema, &self.config, formats.clone(), &self.resources)?;
        tracing::debug!(draft = ?self.config.draft, "schema compiled");
        let mut violations = engine::violations(&validator, instance);
        if self.config.validate_formats {
            let formats: HashMap<String, SharedFormat> = formats.into_iter().collect();
            violations.extend(walk::format_violations(schema, instance, &formats, &self.resources));
        }
        Ok(violations)
    }

    /// Validate a serializable instance against a schema document.
    pub fn validate_schema(
        &self,
        ctx: &ValidationContext,
        instance: &impl Serialize,
        schema_document: &str,
    ) -> ValidationResult {
        let schema = match serde_json::from_str::<JsonValue>(schema_document) {
            Ok(schema) => schema,
            Err(e) => return global_failure(SchemaError::MalformedSchema { reason: e.to_string() }),
        };
        let instance = match serde_json::to_value(instance) {
            Ok(instance) => instance,
            Err(e) => {
                return global_failure(SchemaError::InstanceSerialization { reason: e.to_string() })
            }
        };
        self.validate_value(ctx, &instance, &schema)
    }

    /// Validate an already-parsed instance against an already-parsed schema.
    pub fn validate_value(
        &self,
        ctx: &ValidationContext,
        instance: &JsonValue,
        schema: &JsonValue,
    ) -> ValidationResult {
        let mut result = match self.check(instance, schema) {
            Ok(violations) => {
                let mut result = ValidationResult::new();
                for violation in &violations {
                    result.add_error(violation.field.clone(), violation.code);
                }
                tracing::debug!(
                    field = ctx.field(),
                    violations = violations.len(),
                    "schema validation finished"
                );
                result
            }
            Err(e) => global_failure(e),
        };
        for name in engine::referenced_formats(schema) {
            if !ENGINE_FORMATS.contains(&name.as_str()) && !self.registry.contains(&name) {
                result.add_warning(SCHEMA_FIELD, format!("unknown format `{name}` is not checked"));
            }
        }
        result
    }

    /// Structured error for a failing result; `None` when it is valid.
    pub fn to_domain_error(&self, result: &ValidationResult) -> Option<DomainError> {
        DomainError::from_result(result)
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("config", &self.config)
            .field("formats", &self.format_names())
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn global_failure(error: SchemaError) -> ValidationResult {
    tracing::warn!(error = %error, "schema validation could not run");
    let mut result = ValidationResult::new();
    result.add_global_error(error.to_string());
    result
}
