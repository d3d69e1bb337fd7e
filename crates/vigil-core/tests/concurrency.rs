//! Shared rules and validators used from many threads at once must give
//! the same answer as a single-threaded run.

use std::sync::Arc;
use std::thread;

use serde::Serialize;
use vigil_core::{FieldSet, Record, RuleBuilder, ValidationContext, Validator, Value};

#[derive(Serialize)]
struct Order {
    sku: String,
    quantity: i64,
}

impl Record for Order {
    fn describe(fields: &mut FieldSet) {
        fields
            .field::<String>("sku", "required,pattern=^[A-Z]{3}-[0-9]{4}$")
            .field::<i64>("quantity", "min=1,max=500");
    }
}

#[test]
fn built_rule_is_shareable_across_threads() {
    let rule = RuleBuilder::new().required().string().min_length(3).max_length(8).build();
    let inputs = ["", "ab", "abc", "abcdefgh", "abcdefghi"];
    let expected: Vec<bool> = inputs
        .iter()
        .map(|s| rule.validate(&ValidationContext::new(), &Value::from(*s)).is_ok())
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let rule = Arc::clone(&rule);
            thread::spawn(move || {
                inputs
                    .iter()
                    .map(|s| rule.validate(&ValidationContext::new(), &Value::from(*s)).is_ok())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn validator_is_deterministic_under_concurrent_reads() {
    let validator = Arc::new(Validator::new());
    let orders = vec![
        Order { sku: "ABC-1234".into(), quantity: 10 },
        Order { sku: "abc".into(), quantity: 0 },
        Order { sku: String::new(), quantity: 501 },
    ];
    let baseline: Vec<_> = orders
        .iter()
        .map(|o| validator.validate_struct(&ValidationContext::new(), o))
        .collect();
    let orders = Arc::new(orders);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let validator = Arc::clone(&validator);
            let orders = Arc::clone(&orders);
            thread::spawn(move || {
                orders
                    .iter()
                    .map(|o| validator.validate_struct(&ValidationContext::new(), o))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), baseline);
    }
    assert!(baseline[0].is_valid());
    assert_eq!(baseline[1].error_count(), 2);
    assert_eq!(baseline[2].field_errors("sku").len(), 2);
}
