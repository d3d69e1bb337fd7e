//! # Validator
//!
//! Applies rules to a single value ([`Validator::validate`]) or to every
//! declared field of a [`Record`] ([`Validator::validate_struct`]).
//!
//! Unlike [`CompositeRule`](crate::CompositeRule), a validator never stops
//! early: every rule runs and every failure is recorded, so a caller sees
//! all problems with an input at once.
//!
//! Contract violations (a rule applied to a value it cannot interpret) are
//! recorded as errors too, so a misapplied rule never silently passes, and
//! logged at `warn`.
//!
//! Registration takes `&mut self`; a shared `&Validator` is read-only and
//! can validate from any number of threads.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::ValidationContext;
use crate::error::RuleError;
use crate::record::{self, Record};
use crate::result::ValidationResult;
use crate::rules::{Required, Rule, SharedRule};
use crate::value::Value;

/// Ordered global rules plus ordered rules per field name.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: Vec<SharedRule>,
    field_rules: BTreeMap<String, Vec<SharedRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule applied by [`validate`](Self::validate).
    pub fn add_rule(&mut self, rule: SharedRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Register a rule for a record field, applied by
    /// [`validate_struct`](Self::validate_struct) after the field's
    /// directive rules.
    pub fn add_field_rule(&mut self, field: impl Into<String>, rule: SharedRule) -> &mut Self {
        self.field_rules.entry(field.into()).or_default().push(rule);
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn field_rule_count(&self, field: &str) -> usize {
        self.field_rules.get(field).map_or(0, Vec::len)
    }

    /// Run every global rule against `value`. Failures are global errors.
    pub fn validate(&self, ctx: &ValidationContext, value: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();
        for rule in &self.rules {
            if let Err(error) = rule.validate(ctx, value) {
                record_failure(&mut result, None, rule, error);
            }
        }
        result
    }

    /// Validate each declared field of `record`.
    ///
    /// For each field in declaration order: the rules compiled from its
    /// directives run, then rules registered with
    /// [`add_field_rule`](Self::add_field_rule). A `None` field skips its
    /// directive rules; with the `required` directive it reports only the
    /// missing value. Field rules
    /// registered for names the record does not declare are reported as
    /// warnings.
    pub fn validate_struct<R: Record>(&self, ctx: &ValidationContext, record: &R) -> ValidationResult {
        let schema = record::compiled::<R>();
        let mut result = ValidationResult::new();

        let values = match serde_json::to_value(record) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(other) => {
                result.add_global_error(format!(
                    "{} serialized to {}, expected an object",
                    schema.type_name,
                    Value::from(&other).kind()
                ));
                return result;
            }
            Err(e) => {
                result.add_global_error(format!("{} could not be serialized: {e}", schema.type_name));
                return result;
            }
        };

        for field in &schema.fields {
            let extra = self.field_rules.get(&field.name);
            if field.rules.is_empty() && extra.is_none() {
                continue;
            }
            let value = values.get(&field.name).map(Value::from).unwrap_or_default();
            let field_ctx = ctx.for_field(&field.name);
            let mut field_result = ValidationResult::new();

            // A null field gets no further directives: `required` reports
            // it, and an optional field is simply absent.
            let directive_rules = if value.is_null() { &[][..] } else { &field.rules[..] };
            if value.is_null() && field.required {
                let required: SharedRule = Arc::new(Required);
                if let Err(error) = required.validate(&field_ctx, &value) {
                    record_failure(&mut field_result, Some(field.name.as_str()), &required, error);
                }
            }
            for rule in directive_rules.iter().chain(extra.into_iter().flatten()) {
                if let Err(error) = rule.validate(&field_ctx, &value) {
                    record_failure(&mut field_result, Some(field.name.as_str()), rule, error);
                }
            }
            result.merge(&field_result);
        }

        for name in self.field_rules.keys() {
            if !schema.declares(name) {
                result.add_warning(
                    name.as_str(),
                    format!("field rules registered for `{name}`, which {} does not declare", schema.type_name),
                );
            }
        }
        result
    }
}

fn record_failure(result: &mut ValidationResult, field: Option<&str>, rule: &SharedRule, error: RuleError) {
    if error.is_contract_violation() {
        tracing::warn!(rule = rule.name(), field, error = %error, "rule contract violation");
    }
    let message = error.message();
    match field {
        Some(field) => result.add_error(field, message),
        None => result.add_global_error(message),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;
    use crate::builder::RuleBuilder;
    use crate::record::FieldSet;
    use crate::rules::{Custom, MinLength};

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: i32,
        email: Option<String>,
        #[serde(skip)]
        _secret: String,
        notes: String,
    }

    impl Record for Person {
        fn describe(fields: &mut FieldSet) {
            fields
                .field::<String>("name", "required,min=2")
                .field::<i32>("age", "min=18,max=130")
                .field::<Option<String>>("email", "email")
                .field::<String>("notes", "");
        }
    }

    fn person(name: &str, age: i32, email: Option<&str>) -> Person {
        Person {
            name: name.into(),
            age,
            email: email.map(Into::into),
            _secret: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_validate_collects_every_global_failure() {
        let mut v = Validator::new();
        v.add_rule(Arc::new(Required)).add_rule(Arc::new(MinLength(3)));
        let result = v.validate(&ValidationContext::new(), &Value::from(""));
        assert_eq!(result.global_errors().len(), 2);
        assert_eq!(v.rule_count(), 2);
    }

    #[test]
    fn test_validate_struct_valid_record() {
        let result = Validator::new().validate_struct(
            &ValidationContext::new(),
            &person("Ada", 36, Some("ada@example.com")),
        );
        assert!(result.is_valid(), "{result}");
    }

    #[test]
    fn test_independent_field_failures_all_appear() {
        let result = Validator::new().validate_struct(&ValidationContext::new(), &person("A", 17, Some("nope")));
        assert_eq!(result.field_errors("name"), ["minimum length is 2".to_string()]);
        assert_eq!(result.field_errors("age"), ["minimum value is 18".to_string()]);
        assert_eq!(result.field_errors("email"), ["invalid email address".to_string()]);
        assert_eq!(result.error_count(), 3);
    }

    #[test]
    fn test_none_option_skips_directives() {
        let result = Validator::new().validate_struct(&ValidationContext::new(), &person("Ada", 40, None));
        assert!(result.is_valid());
    }

    #[test]
    fn test_field_rules_run_after_directives() {
        let mut v = Validator::new();
        v.add_field_rule(
            "name",
            RuleBuilder::new().string().custom("must be capitalized", |s| {
                s.chars().next().is_some_and(char::is_uppercase)
            }).build(),
        );
        let result = v.validate_struct(&ValidationContext::new(), &person("a", 20, None));
        assert_eq!(
            result.field_errors("name"),
            ["minimum length is 2".to_string(), "must be capitalized".to_string()]
        );
        assert_eq!(v.field_rule_count("name"), 1);
    }

    #[test]
    fn test_field_rules_see_field_context() {
        let mut v = Validator::new();
        v.add_field_rule(
            "notes",
            Arc::new(Custom::new("ctx", |ctx, _| match ctx.field() {
                Some("notes") => Err(RuleError::invalid("SEEN", "saw notes")),
                _ => Ok(()),
            })),
        );
        let result = v.validate_struct(&ValidationContext::new(), &person("Ada", 20, None));
        assert_eq!(result.field_errors("notes"), ["saw notes".to_string()]);
    }

    #[test]
    fn test_undeclared_field_rule_warns() {
        let mut v = Validator::new();
        v.add_field_rule("_secret", Arc::new(Required));
        let result = v.validate_struct(&ValidationContext::new(), &person("Ada", 20, None));
        assert!(result.is_valid());
        assert_eq!(result.warnings()["_secret"].len(), 1);
    }

    #[test]
    fn test_contract_violation_is_recorded() {
        let mut v = Validator::new();
        v.add_field_rule("age", Arc::new(MinLength(1)));
        let result = v.validate_struct(&ValidationContext::new(), &person("Ada", 20, None));
        assert_eq!(result.field_errors("age"), ["rule `min_length` expects a string, got number".to_string()]);
    }

    #[test]
    fn test_non_object_record_is_global_error() {
        #[derive(Serialize)]
        struct Wrapper(u32);
        impl Record for Wrapper {
            fn describe(fields: &mut FieldSet) {
                fields.field::<u32>("0", "min=1");
            }
        }
        let result = Validator::new().validate_struct(&ValidationContext::new(), &Wrapper(0));
        assert_eq!(result.global_errors().len(), 1);
        assert!(result.errors().is_empty());
    }
}
