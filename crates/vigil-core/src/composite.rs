//! # Composite Rules
//!
//! [`CompositeRule`] runs an ordered list of rules and stops at the first
//! failure. [`Optional`] lets absent values through before delegating.

use crate::context::ValidationContext;
use crate::error::RuleError;
use crate::rules::{Rule, SharedRule};
use crate::value::Value;

/// Ordered, fail-fast conjunction of rules. Never mutated after build.
#[derive(Debug, Clone, Default)]
pub struct CompositeRule {
    rules: Vec<SharedRule>,
}

impl CompositeRule {
    /// Compose `rules` in evaluation order.
    pub fn new(rules: Vec<SharedRule>) -> Self {
        Self { rules }
    }

    /// The composed rules, in evaluation order.
    pub fn rules(&self) -> &[SharedRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Rule for CompositeRule {
    fn name(&self) -> &str {
        "composite"
    }

    fn validate(&self, ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        self.rules.iter().try_for_each(|rule| rule.validate(ctx, value))
    }
}

/// Passes `Null` without consulting the inner rule.
#[derive(Debug, Clone)]
pub struct Optional {
    inner: SharedRule,
}

impl Optional {
    pub fn new(inner: SharedRule) -> Self {
        Self { inner }
    }
}

impl Rule for Optional {
    fn name(&self) -> &str {
        "optional"
    }

    fn validate(&self, ctx: &ValidationContext, value: &Value) -> Result<(), RuleError> {
        if value.is_null() {
            return Ok(());
        }
        self.inner.validate(ctx, value)
    }
}
