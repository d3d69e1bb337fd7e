//! # vigil-cli — Command-Line Validation
//!
//! Provides the `vigil` binary on top of `vigil-schema`.
//!
//! ## Subcommands
//!
//! - `vigil check`: validate JSON/YAML documents against a JSON Schema.
//! - `vigil formats`: list registered format names.
//! - `vigil probe`: run one format checker against a value.
//!
//! ```bash
//! vigil check --schema customer.schema.json alice.yaml bob.json
//! vigil probe iso_8601_date 2024-02-29
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives beside its handler; handlers return the
//!   process exit status and leave printing errors to `main`.
//! - No validation logic here: everything delegates to `vigil-schema`.

pub mod check;
pub mod document;
pub mod formats;
