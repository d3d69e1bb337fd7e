//! # Engine Adapter
//!
//! Thin layer over the `jsonschema` crate: compiles a schema with the
//! registered format checkers and an offline `$ref` retriever, and turns
//! engine errors into [`Violation`]s keyed the way callers expect.
//!
//! ## Field Keys
//!
//! The instance path (a JSON pointer) is rendered in dotted form:
//! `/items/0/name` becomes `items.0.name`. The root is `(root)`, except
//! that a `required` violation at the root is keyed by the missing
//! property's name.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri};
use serde_json::Value as JsonValue;

use crate::codes;
use crate::error::SchemaError;
use crate::registry::SharedFormat;
use crate::validate::SchemaValidatorConfig;

/// Field key used for violations at the instance root.
pub const ROOT_FIELD: &str = "(root)";

/// Formats the engine validates natively.
pub const ENGINE_FORMATS: &[&str] = &[
    "date",
    "date-time",
    "time",
    "duration",
    "email",
    "idn-email",
    "hostname",
    "idn-hostname",
    "ipv4",
    "ipv6",
    "iri",
    "iri-reference",
    "uri",
    "uri-reference",
    "uri-template",
    "json-pointer",
    "relative-json-pointer",
    "regex",
    "uuid",
];

/// A single engine-reported violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted field key.
    pub field: String,
    /// JSON pointer to the violating value in the instance.
    pub instance_path: String,
    /// JSON pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Violation-type string (`required`, `format`, ...).
    pub violation_type: &'static str,
    /// Stable error code from [`codes`].
    pub code: &'static str,
    /// The engine's own description. Diagnostics only.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.code, self.message)
    }
}

/// Resolves `$ref`s against schemas registered in memory and never touches
/// the network or the filesystem.
struct OfflineRetriever {
    resources: HashMap<String, JsonValue>,
}

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<JsonValue, Box<dyn std::error::Error + Send + Sync>> {
        let uri = uri.as_str();
        lookup_resource(&self.resources, uri)
            .cloned()
            .ok_or_else(|| format!("schema {uri} is not registered").into())
    }
}

/// The registered schema for `uri`, matched in full or by its last path
/// segment, so `schemas/address.json` and `https://host/schemas/address.json`
/// both resolve.
pub(crate) fn lookup_resource<'r>(resources: &'r HashMap<String, JsonValue>, uri: &str) -> Option<&'r JsonValue> {
    resources.get(uri).or_else(|| {
        let name = uri.rsplit('/').next().unwrap_or(uri);
        resources.get(name)
    })
}

/// Compile `schema` with `formats` registered as engine format checkers.
pub(crate) fn compile(
    schema: &JsonValue,
    config: &SchemaValidatorConfig,
    formats: Vec<(String, SharedFormat)>,
    resources: &HashMap<String, JsonValue>,
) -> Result<jsonschema::Validator, SchemaError> {
    let mut options = jsonschema::options();
    if let Some(draft) = config.draft {
        options.with_draft(draft);
    }
    options.should_validate_formats(config.validate_formats);
    for (name, checker) in formats {
        options.with_format(name, move |s: &str| {
            checker.is_format(&vigil_core::Value::String(s.to_owned()))
        });
    }
    options.with_retriever(OfflineRetriever {
        resources: resources.clone(),
    });
    options.build(schema).map_err(|e| SchemaError::CompileFailed {
        reason: e.to_string(),
    })
}

/// Every violation `instance` has against `validator`.
pub(crate) fn violations(validator: &jsonschema::Validator, instance: &JsonValue) -> Vec<Violation> {
    validator
        .iter_errors(instance)
        .map(|error| {
            let instance_path = error.instance_path.to_string();
            let violation_type = codes::violation_type(&error.kind);
            let property = match &error.kind {
                ValidationErrorKind::Required { property } => property.as_str(),
                _ => None,
            };
            Violation {
                field: field_key(&instance_path, property),
                schema_path: error.schema_path.to_string(),
                violation_type,
                code: codes::code_for(violation_type),
                message: error.to_string(),
                instance_path,
            }
        })
        .collect()
}

/// Dotted field key for a JSON pointer. `property` replaces the root marker.
pub fn field_key(pointer: &str, property: Option<&str>) -> String {
    if pointer.is_empty() || pointer == "/" {
        return property.unwrap_or(ROOT_FIELD).to_string();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

/// Every `format` name a schema document references.
pub fn referenced_formats(schema: &JsonValue) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect_formats(schema, &mut found);
    found
}

fn collect_formats(node: &JsonValue, found: &mut BTreeSet<String>) {
    match node {
        JsonValue::Object(map) => {
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("format", JsonValue::String(name)) => {
                        found.insert(name.clone());
                    }
                    // Literal instance data, not subschemas.
                    ("enum" | "const" | "examples" | "default", _) => {}
                    _ => collect_formats(value, found),
                }
            }
        }
        JsonValue::Array(items) => items.iter().for_each(|item| collect_formats(item, found)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_key_dotted_form() {
        assert_eq!(field_key("/a/b/0", None), "a.b.0");
        assert_eq!(field_key("/name", None), "name");
        assert_eq!(field_key("/a~1b/c~0d", None), "a/b.c~d");
    }

    #[test]
    fn test_field_key_root() {
        assert_eq!(field_key("", None), ROOT_FIELD);
        assert_eq!(field_key("", Some("email")), "email");
        assert_eq!(field_key("/address", Some("city")), "address");
    }

    #[test]
    fn test_referenced_formats_skips_literal_data() {
        let schema = json!({
            "properties": {
                "d": {"type": "string", "format": "iso_8601_date"},
                "format": {"type": "string", "format": "strong_name"},
                "items": {"type": "array", "items": {"format": "decimal"}},
                "fixed": {"const": {"format": "not_a_format"}}
            }
        });
        let names: Vec<_> = referenced_formats(&schema).into_iter().collect();
        assert_eq!(names, ["decimal", "iso_8601_date", "strong_name"]);
    }
}
