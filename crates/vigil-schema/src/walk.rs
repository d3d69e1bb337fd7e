//! # Format Walk
//!
//! The engine applies `format` to strings only. This pass follows the
//! schema alongside the instance and runs registered checkers against
//! numbers and booleans, so `{"amount": 1.123456789}` under
//! `decimal_by_factor_of_8` fails the same way `"1.123456789"` does.
//!
//! Numbers reach a checker as undecoded literals
//! ([`Number::Decimal`](vigil_core::Number)), the form a number has in the
//! document text. Booleans arrive as [`Value::Bool`].
//!
//! ## Keywords Followed
//!
//! `properties`, `patternProperties`, `additionalProperties`, `items`,
//! `prefixItems`, `additionalItems`, `allOf` and `$ref` (local pointers
//! and registered resources). Alternatives and conditionals (`anyOf`,
//! `oneOf`, `not`, `if`/`then`/`else`) are not followed: whether their
//! formats apply depends on which branch matched.

use std::collections::HashMap;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use vigil_core::{Number, Value};

use crate::codes;
use crate::engine::{self, Violation};
use crate::registry::SharedFormat;

/// Deepest schema nesting followed; guards recursive `$ref`s.
const MAX_DEPTH: usize = 64;

/// Format violations on number and boolean instances.
pub(crate) fn format_violations(
    schema: &JsonValue,
    instance: &JsonValue,
    formats: &HashMap<String, SharedFormat>,
    resources: &HashMap<String, JsonValue>,
) -> Vec<Violation> {
    let mut walk = Walk {
        formats,
        resources,
        found: Vec::new(),
    };
    walk.visit(schema, schema, instance, "", "", 0);
    walk.found
}

struct Walk<'a> {
    formats: &'a HashMap<String, SharedFormat>,
    resources: &'a HashMap<String, JsonValue>,
    found: Vec<Violation>,
}

impl<'a> Walk<'a> {
    /// `root` is the document `schema` lives in, for local `$ref`s.
    fn visit(
        &mut self,
        root: &'a JsonValue,
        schema: &'a JsonValue,
        instance: &JsonValue,
        instance_path: &str,
        schema_path: &str,
        depth: usize,
    ) {
        if depth > MAX_DEPTH {
            tracing::debug!(schema_path, "format walk depth limit reached");
            return;
        }
        let JsonValue::Object(keywords) = schema else {
            return;
        };

        if let Some(JsonValue::String(name)) = keywords.get("format") {
            self.check_format(name, instance, instance_path, schema_path);
        }

        if let Some(JsonValue::String(reference)) = keywords.get("$ref") {
            if let Some((target_root, target)) = self.resolve(root, reference) {
                let path = format!("{schema_path}/$ref");
                self.visit(target_root, target, instance, instance_path, &path, depth + 1);
            }
        }

        if let Some(JsonValue::Array(branches)) = keywords.get("allOf") {
            for (i, branch) in branches.iter().enumerate() {
                let path = format!("{schema_path}/allOf/{i}");
                self.visit(root, branch, instance, instance_path, &path, depth + 1);
            }
        }

        match instance {
            JsonValue::Object(members) => {
                self.visit_members(root, keywords, members, instance_path, schema_path, depth)
            }
            JsonValue::Array(elements) => {
                self.visit_elements(root, keywords, elements, instance_path, schema_path, depth)
            }
            _ => {}
        }
    }

    fn visit_members(
        &mut self,
        root: &'a JsonValue,
        keywords: &'a Map<String, JsonValue>,
        members: &Map<String, JsonValue>,
        instance_path: &str,
        schema_path: &str,
        depth: usize,
    ) {
        let properties = keywords.get("properties").and_then(JsonValue::as_object);
        let patterns: Vec<(&str, Regex, &JsonValue)> = keywords
            .get("patternProperties")
            .and_then(JsonValue::as_object)
            .into_iter()
            .flatten()
            .filter_map(|(pattern, sub)| Some((pattern.as_str(), Regex::new(pattern).ok()?, sub)))
            .collect();
        let additional = keywords.get("additionalProperties");

        for (key, member) in members {
            let member_path = format!("{instance_path}/{}", escape(key));
            let mut matched = false;
            if let Some(sub) = properties.and_then(|p| p.get(key)) {
                matched = true;
                let path = format!("{schema_path}/properties/{}", escape(key));
                self.visit(root, sub, member, &member_path, &path, depth + 1);
            }
            for (pattern, regex, sub) in &patterns {
                if regex.is_match(key) {
                    matched = true;
                    let path = format!("{schema_path}/patternProperties/{}", escape(pattern));
                    self.visit(root, *sub, member, &member_path, &path, depth + 1);
                }
            }
            if let (false, Some(sub)) = (matched, additional) {
                let path = format!("{schema_path}/additionalProperties");
                self.visit(root, sub, member, &member_path, &path, depth + 1);
            }
        }
    }

    fn visit_elements(
        &mut self,
        root: &'a JsonValue,
        keywords: &'a Map<String, JsonValue>,
        elements: &[JsonValue],
        instance_path: &str,
        schema_path: &str,
        depth: usize,
    ) {
        // Positional schemas, then the schema for the rest.
        let prefix = keywords.get("prefixItems");
        let items = keywords.get("items");
        let (positional, positional_key, rest, rest_key) = match (prefix, items) {
            (Some(JsonValue::Array(prefix)), rest) => (&prefix[..], "prefixItems", rest, "items"),
            (_, Some(JsonValue::Array(tuple))) => {
                (&tuple[..], "items", keywords.get("additionalItems"), "additionalItems")
            }
            (_, rest) => (&[][..], "items", rest, "items"),
        };
        for (i, element) in elements.iter().enumerate() {
            let element_path = format!("{instance_path}/{i}");
            let (sub, path) = match positional.get(i) {
                Some(sub) => (sub, format!("{schema_path}/{positional_key}/{i}")),
                None => match rest {
                    Some(sub) => (sub, format!("{schema_path}/{rest_key}")),
                    None => continue,
                },
            };
            self.visit(root, sub, element, &element_path, &path, depth + 1);
        }
    }

    fn check_format(&mut self, name: &str, instance: &JsonValue, instance_path: &str, schema_path: &str) {
        let value = match instance {
            JsonValue::Number(n) => Value::Number(Number::literal(n.to_string())),
            JsonValue::Bool(b) => Value::Bool(*b),
            _ => return,
        };
        let Some(checker) = self.formats.get(name) else {
            return;
        };
        if checker.is_format(&value) {
            return;
        }
        self.found.push(Violation {
            field: engine::field_key(instance_path, None),
            instance_path: instance_path.to_string(),
            schema_path: format!("{schema_path}/format"),
            violation_type: "format",
            code: codes::code_for("format"),
            message: format!("{instance} is not a \"{name}\""),
        });
    }

    /// The document and subschema a `$ref` names.
    fn resolve(&self, root: &'a JsonValue, reference: &str) -> Option<(&'a JsonValue, &'a JsonValue)> {
        let (base, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        let document = if base.is_empty() {
            root
        } else {
            engine::lookup_resource(self.resources, base)?
        };
        let target = if fragment.is_empty() {
            document
        } else {
            document.pointer(fragment)?
        };
        Some((document, target))
    }
}

/// One JSON pointer segment.
fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{FormatFn, BUILTIN_FORMATS};
    use serde_json::json;
    use std::sync::Arc;

    fn builtins() -> HashMap<String, SharedFormat> {
        BUILTIN_FORMATS
            .iter()
            .map(|(name, check)| (name.to_string(), Arc::new(FormatFn(*check)) as SharedFormat))
            .collect()
    }

    fn fields(schema: JsonValue, instance: JsonValue) -> Vec<String> {
        format_violations(&schema, &instance, &builtins(), &HashMap::new())
            .into_iter()
            .map(|v| v.field)
            .collect()
    }

    #[test]
    fn test_numbers_reach_checkers_as_literals() {
        let schema = json!({"properties": {"amount": {"format": "decimal_by_factor_of_8"}}});
        assert!(fields(schema.clone(), json!({"amount": 1.12345678})).is_empty());
        assert!(fields(schema.clone(), json!({"amount": 100})).is_empty());
        assert_eq!(fields(schema, json!({"amount": 1.123456789})), ["amount"]);
    }

    #[test]
    fn test_strings_are_left_to_the_engine() {
        let schema = json!({"format": "decimal_by_factor_of_8"});
        assert!(fields(schema, json!("0.123456789")).is_empty());
    }

    #[test]
    fn test_unregistered_formats_are_skipped() {
        assert!(fields(json!({"format": "email"}), json!(5)).is_empty());
    }

    #[test]
    fn test_items_and_tuples() {
        let list = json!({"items": {"format": "decimal_by_factor_of_8"}});
        assert_eq!(fields(list, json!([0.5, 0.123456789])), ["1"]);

        let tuple = json!({
            "prefixItems": [{"format": "string"}],
            "items": {"format": "json_number"}
        });
        assert_eq!(fields(tuple, json!([1, 2, true])), ["0", "2"]);
    }

    #[test]
    fn test_pattern_and_additional_properties() {
        let schema = json!({
            "properties": {"id": {"type": "integer"}},
            "patternProperties": {"^rate_": {"format": "decimal_by_factor_of_8"}},
            "additionalProperties": {"format": "json_number"}
        });
        let instance = json!({"id": 1, "rate_a": 0.123456789, "flag": false});
        let mut found = fields(schema, instance);
        found.sort();
        assert_eq!(found, ["flag", "rate_a"]);
    }

    #[test]
    fn test_local_and_registered_refs() {
        let schema = json!({
            "$defs": {"amount": {"format": "decimal_by_factor_of_8"}},
            "properties": {
                "net": {"$ref": "#/$defs/amount"},
                "gross": {"$ref": "https://example.com/money.json#/amount"}
            }
        });
        let mut resources = HashMap::new();
        resources.insert(
            "money.json".to_string(),
            json!({"amount": {"allOf": [{"format": "decimal_by_factor_of_8"}]}}),
        );
        let instance = json!({"net": 0.123456789, "gross": 0.123456789});
        let found = format_violations(&schema, &instance, &builtins(), &resources);
        let mut keys: Vec<_> = found.iter().map(|v| v.field.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["gross", "net"]);
        assert!(found.iter().all(|v| v.code == codes::INVALID_FORMAT));
    }

    #[test]
    fn test_recursive_ref_terminates() {
        let schema = json!({"$ref": "#"});
        assert!(fields(schema, json!(1)).is_empty());
    }

    #[test]
    fn test_escaped_keys_keep_their_field_key() {
        let schema = json!({"properties": {"a/b": {"format": "json_number"}}});
        let found = format_violations(&schema, &json!({"a/b": true}), &builtins(), &HashMap::new());
        assert_eq!(found[0].field, "a/b");
        assert_eq!(found[0].instance_path, "/a~1b");
        assert_eq!(found[0].schema_path, "/properties/a~1b/format");
    }
}
