//! Format registration racing with validation must neither deadlock nor
//! disturb checks on formats that are not being re-registered.

use std::sync::Arc;
use std::thread;

use serde_json::json;
use vigil_core::ValidationContext;
use vigil_schema::{codes, FormatRegistry, SchemaValidator};

const SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "d": {"type": "string", "format": "iso_8601_date"},
        "n": {"type": "string", "format": "strong_name"}
    }
}"#;

#[test]
fn registration_during_validation() {
    let validator = Arc::new(SchemaValidator::new());

    let writers: Vec<_> = (0..4)
        .map(|i| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                for j in 0..50 {
                    validator.register_format_validator(format!("race_{i}_{j}"), move |value| {
                        value.as_str().is_some_and(|s| s.len() == j)
                    });
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let ctx = ValidationContext::new();
                for _ in 0..20 {
                    let ok = validator.validate_schema(&ctx, &json!({"d": "2024-02-29", "n": "Alpha"}), SCHEMA);
                    assert!(ok.is_valid(), "{ok}");
                    let bad = validator.validate_schema(&ctx, &json!({"d": "2025-02-30", "n": "1x"}), SCHEMA);
                    assert_eq!(bad.field_errors("d"), [codes::INVALID_FORMAT]);
                    assert_eq!(bad.field_errors("n"), [codes::INVALID_FORMAT]);
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().expect("thread panicked");
    }

    let names = validator.format_names();
    assert!(names.iter().any(|n| n == "race_0_0"));
    assert!(names.iter().any(|n| n == "race_3_49"));
    assert!(FormatRegistry::global().contains("race_2_25"));
}
