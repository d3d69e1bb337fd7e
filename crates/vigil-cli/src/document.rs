//! # Document Loading
//!
//! Reads schema and instance documents from disk. Files ending in `.yaml`
//! or `.yml` are parsed as YAML; everything else is parsed as JSON.
//!
//! YAML goes through the [`vigil_core::Value`] model on its way to JSON:
//! integers stay exact and other numbers keep the text YAML printed for
//! them, so a format checker sees the same literal a JSON document would
//! have carried.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use vigil_core::{Number, Value};

/// Whether `path` names a YAML document.
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Load a JSON or YAML document as a JSON value.
pub fn load_document(path: &Path) -> Result<JsonValue> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&content, is_yaml(path)).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse document text, as YAML when `yaml` is set.
pub fn parse_document(content: &str, yaml: bool) -> Result<JsonValue> {
    if yaml {
        let doc: YamlValue = serde_yaml::from_str(content).context("invalid YAML")?;
        Ok(value_from_yaml(&doc)?.to_json())
    } else {
        serde_json::from_str(content).context("invalid JSON")
    }
}

/// Read a YAML node into a [`Value`].
///
/// Map keys must be strings, numbers or booleans. Tags are dropped.
pub fn value_from_yaml(node: &YamlValue) -> Result<Value> {
    Ok(match node {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => Value::Number(yaml_number(n)?),
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(items) => {
            Value::List(items.iter().map(value_from_yaml).collect::<Result<_>>()?)
        }
        YamlValue::Mapping(map) => Value::Map(
            map.iter()
                .map(|(key, value)| Ok((map_key(key)?, value_from_yaml(value)?)))
                .collect::<Result<_>>()?,
        ),
        YamlValue::Tagged(tagged) => value_from_yaml(&tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Number> {
    if let Some(i) = n.as_i64() {
        return Ok(Number::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Number::from(u));
    }
    if n.is_nan() || n.is_infinite() {
        bail!("YAML number {n} has no JSON representation");
    }
    Ok(Number::literal(n.to_string()))
}

fn map_key(key: &YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Tagged(tagged) => map_key(&tagged.value),
        other => bail!("unsupported YAML map key: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_detection() {
        assert!(is_yaml(Path::new("a/b.yaml")));
        assert!(is_yaml(Path::new("b.YML")));
        assert!(!is_yaml(Path::new("b.json")));
        assert!(!is_yaml(Path::new("yaml")));
    }

    #[test]
    fn test_yaml_converts_to_json() {
        let yaml = "name: Ada\nage: 36\nscore: 1.5\ntags: [a, b]\n1: numeric key\nactive: true\nnote: ~\n";
        let value = parse_document(yaml, true).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Ada",
                "age": 36,
                "score": 1.5,
                "tags": ["a", "b"],
                "1": "numeric key",
                "active": true,
                "note": null
            })
        );
    }

    #[test]
    fn test_yaml_tags_are_dropped() {
        let value = parse_document("when: !date 2024-01-15\n", true).unwrap();
        assert_eq!(value, json!({"when": "2024-01-15"}));
    }

    #[test]
    fn test_yaml_numbers_keep_their_text() {
        let doc: YamlValue = serde_yaml::from_str("big: 18446744073709551615\nrate: 0.125\n").unwrap();
        let value = value_from_yaml(&doc).unwrap();
        let Value::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map["big"], Value::from(u64::MAX));
        assert_eq!(map["rate"], Value::Number(Number::literal("0.125")));
    }

    #[test]
    fn test_non_finite_yaml_number_is_rejected() {
        let err = parse_document("rate: .nan\n", true).unwrap_err();
        assert!(err.to_string().contains("no JSON representation"));
    }

    #[test]
    fn test_unsupported_yaml_key() {
        let err = parse_document("? [a, b]\n: value\n", true).unwrap_err();
        assert!(err.to_string().contains("unsupported YAML map key"));
    }

    #[test]
    fn test_json_parse_error() {
        let err = parse_document("{", false).unwrap_err();
        assert_eq!(err.to_string(), "invalid JSON");
    }

    #[test]
    fn test_load_document_missing_file() {
        let err = load_document(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
