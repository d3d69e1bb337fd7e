//! # Format Registry
//!
//! The process-wide namespace of format checkers the schema engine
//! consults. Every [`SchemaValidator`](crate::SchemaValidator) in the
//! process registers into, and validates against, the same
//! [`FormatRegistry::global`] instance.
//!
//! ## Shared Namespace Hazard
//!
//! Names are global. Two validators registering different checkers under
//! the same name overwrite each other; the last registration wins for every
//! validator. Populate the registry at startup and treat names as
//! process-wide identifiers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use vigil_core::Value;

use crate::formats::{FormatFn, FormatValidator, BUILTIN_FORMATS};

/// A shared checker.
pub type SharedFormat = Arc<dyn FormatValidator>;

static GLOBAL: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::with_builtins);

/// Name → checker map behind a read-write lock.
#[derive(Default)]
pub struct FormatRegistry {
    formats: RwLock<HashMap<String, SharedFormat>>,
}

impl FormatRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in checkers.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.install_builtins();
        registry
    }

    /// The process-wide registry, built-ins included.
    pub fn global() -> &'static FormatRegistry {
        &GLOBAL
    }

    /// (Re-)register the built-in checkers.
    pub fn install_builtins(&self) {
        let mut formats = self.formats.write();
        for (name, check) in BUILTIN_FORMATS {
            formats.insert(name.to_string(), Arc::new(FormatFn(check)));
        }
    }

    /// Register `validator` under `name`, returning the checker it replaced.
    pub fn register(&self, name: impl Into<String>, validator: SharedFormat) -> Option<SharedFormat> {
        self.formats.write().insert(name.into(), validator)
    }

    pub fn get(&self, name: &str) -> Option<SharedFormat> {
        self.formats.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.read().contains_key(name)
    }

    /// Run the checker registered under `name`; `None` if there is none.
    pub fn check(&self, name: &str, value: &Value) -> Option<bool> {
        self.get(name).map(|validator| validator.is_format(value))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.formats.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Point-in-time copy of every registration, taken under the read lock.
    pub fn snapshot(&self) -> Vec<(String, SharedFormat)> {
        self.formats
            .read()
            .iter()
            .map(|(name, validator)| (name.clone(), Arc::clone(validator)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.formats.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.read().is_empty()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry").field("formats", &self.names()).finish()
    }
}
