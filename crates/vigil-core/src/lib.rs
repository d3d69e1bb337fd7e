//! # vigil-core — Composable Validation
//!
//! The rule engine at the center of vigil. Every other crate in the
//! workspace depends on `vigil-core`; it depends on nothing internal.
//!
//! ## Building Blocks
//!
//! 1. **[`Value`] and [`Number`].** Rules validate a dynamic value. Numbers
//!    keep their representation (`Integer(i128)`, `Float(f64)`, or an
//!    unparsed `Decimal` literal) so large integers and decimal text never
//!    round through `f64`.
//!
//! 2. **[`Rule`].** An immutable, `Send + Sync` unit of validation. The
//!    [`rules`] module holds the atomic library; [`CompositeRule`] chains
//!    rules and stops at the first failure.
//!
//! 3. **[`RuleBuilder`].** Fluent construction with typed sub-builders for
//!    strings, numbers and date/times.
//!
//! 4. **[`Validator`] and [`Record`].** Non-fail-fast validation of a value
//!    or of every declared field of a record, driven by per-field directive
//!    strings (`"required,min=2,max=50"`).
//!
//! 5. **[`ValidationResult`].** Field errors, global errors and warnings,
//!    mergeable and serializable; [`DomainError`] for surfacing failures.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests. Bad configuration (an
//!   uncompilable pattern, a malformed directive) degrades to a rule that
//!   always fails.
//! - Validation failures and contract violations are separate
//!   [`RuleError`] variants and are never conflated.

pub mod builder;
pub mod composite;
pub mod context;
pub mod error;
pub mod patterns;
pub mod record;
pub mod result;
pub mod rules;
pub mod temporal;
pub mod validator;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use builder::{DateTimeRuleBuilder, NumberRuleBuilder, RuleBuilder, StringRuleBuilder};
pub use composite::{CompositeRule, Optional};
pub use context::ValidationContext;
pub use error::{DirectiveError, DomainError, RuleError, ValidationError, GLOBAL_ERROR_KEY};
pub use patterns::StaticRegex;
pub use record::{declared_fields, Directive, FieldKind, FieldSet, FieldSpec, FieldType, Record};
pub use result::ValidationResult;
pub use rules::{Rule, SharedRule};
pub use temporal::Layout;
pub use validator::Validator;
pub use value::{Number, Value};
