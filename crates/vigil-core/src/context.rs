//! # Validation Context
//!
//! Caller-supplied context threaded through every rule invocation. Rules
//! that do not need it ignore it; custom rules may read the field being
//! validated or arbitrary string-keyed data (tenant, locale, request id).

use std::collections::HashMap;

/// Context passed to [`Rule::validate`](crate::Rule::validate).
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    field: Option<String>,
    data: HashMap<String, String>,
}

impl ValidationContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a data entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// A child context scoped to `field`, sharing this context's data.
    pub fn for_field(&self, field: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            data: self.data.clone(),
        }
    }

    /// Field currently being validated, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Look up a data entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_context_keeps_data() {
        let ctx = ValidationContext::new().with_data("tenant", "acme");
        let child = ctx.for_field("email");
        assert_eq!(child.field(), Some("email"));
        assert_eq!(child.get("tenant"), Some("acme"));
        assert_eq!(ctx.field(), None);
        assert_eq!(ctx.get("missing"), None);
    }
}
