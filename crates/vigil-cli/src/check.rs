//! # Check Subcommand
//!
//! Validates one or more JSON/YAML documents against a JSON Schema.
//!
//! ```bash
//! vigil check --schema customer.schema.json customers/*.yaml
//! vigil check --schema order.schema.json order.json --json
//! vigil check --schema legacy.json doc.json --draft 7 --no-formats
//! ```
//!
//! Exit status: `0` when every document is valid, `1` when any document has
//! errors, `2` when a file cannot be read or parsed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use vigil_core::{ValidationContext, ValidationResult};
use vigil_schema::{Draft, SchemaValidator, SchemaValidatorConfig};

use crate::document::load_document;

/// JSON Schema drafts selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftArg {
    #[value(name = "4")]
    Draft4,
    #[value(name = "6")]
    Draft6,
    #[value(name = "7")]
    Draft7,
    #[value(name = "2019-09")]
    Draft201909,
    #[value(name = "2020-12")]
    Draft202012,
}

impl From<DraftArg> for Draft {
    fn from(arg: DraftArg) -> Self {
        match arg {
            DraftArg::Draft4 => Draft::Draft4,
            DraftArg::Draft6 => Draft::Draft6,
            DraftArg::Draft7 => Draft::Draft7,
            DraftArg::Draft201909 => Draft::Draft201909,
            DraftArg::Draft202012 => Draft::Draft202012,
        }
    }
}

/// Arguments for `vigil check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (JSON or YAML).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Documents to validate.
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Print a JSON report instead of text.
    #[arg(long)]
    pub json: bool,

    /// Validate under this draft instead of the schema's `$schema`.
    #[arg(long, value_enum)]
    pub draft: Option<DraftArg>,

    /// Treat `format` as an annotation only.
    #[arg(long)]
    pub no_formats: bool,
}

impl CheckArgs {
    pub fn config(&self) -> SchemaValidatorConfig {
        SchemaValidatorConfig {
            draft: self.draft.map(Draft::from),
            validate_formats: !self.no_formats,
        }
    }
}

/// Per-document results, keyed by path as given.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub results: BTreeMap<String, ValidationResult>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.results.values().all(ValidationResult::is_valid)
    }

    pub fn invalid_count(&self) -> usize {
        self.results.values().filter(|r| !r.is_valid()).count()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let documents: serde_json::Map<String, serde_json::Value> = self
            .results
            .iter()
            .map(|(path, result)| (path.clone(), result.to_json()))
            .collect();
        serde_json::json!({
            "valid": self.is_valid(),
            "documents": documents,
        })
    }

    /// Human-readable report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (path, result) in &self.results {
            let status = if result.is_valid() { "OK" } else { "FAIL" };
            out.push_str(&format!("{status:<4} {path}\n"));
            for (field, messages) in result.errors() {
                for message in messages {
                    out.push_str(&format!("     {field}: {message}\n"));
                }
            }
            for message in result.global_errors() {
                out.push_str(&format!("     {message}\n"));
            }
            for (field, messages) in result.warnings() {
                for message in messages {
                    out.push_str(&format!("     warning {field}: {message}\n"));
                }
            }
        }
        out.push_str(&format!(
            "\n{} document(s) checked, {} invalid\n",
            self.results.len(),
            self.invalid_count()
        ));
        out
    }
}

/// Validate every document in `args` and collect the results.
pub fn check_documents(args: &CheckArgs) -> Result<CheckReport> {
    let schema = load_document(&args.schema).context("loading schema")?;
    let validator = SchemaValidator::with_config(args.config());
    let ctx = ValidationContext::new();

    let mut report = CheckReport::default();
    for path in &args.documents {
        let instance = load_document(path)?;
        let result = validator.validate_value(&ctx.for_field(&display(path)), &instance, &schema);
        tracing::info!(document = %path.display(), valid = result.is_valid(), "checked");
        report.results.insert(display(path), result);
    }
    Ok(report)
}

/// Execute `vigil check`.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let report = check_documents(args)?;
    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report.to_json()).context("serializing report")?;
        println!("{rendered}");
    } else {
        print!("{}", report.render_text());
    }
    Ok(if report.is_valid() { 0 } else { 1 })
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
