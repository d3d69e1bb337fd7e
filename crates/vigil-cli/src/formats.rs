//! # Format Subcommands
//!
//! `vigil formats` lists every format name a schema can use; `vigil probe`
//! runs one registered checker against a single value.

use anyhow::{bail, Result};
use clap::Args;
use vigil_core::{Number, Value};
use vigil_schema::engine::ENGINE_FORMATS;
use vigil_schema::FormatRegistry;

/// Arguments for `vigil formats`.
#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// Also list the formats the schema engine checks natively.
    #[arg(long)]
    pub all: bool,
}

/// Arguments for `vigil probe`.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Registered format name.
    pub format: String,

    /// Value to check.
    pub value: String,

    /// Pass the value as an undecoded numeric literal instead of a string.
    #[arg(long)]
    pub number: bool,
}

/// Execute `vigil formats`.
pub fn run_formats(args: &FormatsArgs) -> Result<u8> {
    for name in FormatRegistry::global().names() {
        println!("{name}");
    }
    if args.all {
        for name in ENGINE_FORMATS {
            println!("{name} (engine)");
        }
    }
    Ok(0)
}

/// Evaluate one checker. `None` when no checker is registered under the name.
pub fn probe(args: &ProbeArgs) -> Option<bool> {
    let value = if args.number {
        Value::Number(Number::literal(args.value.clone()))
    } else {
        Value::String(args.value.clone())
    };
    FormatRegistry::global().check(&args.format, &value)
}

/// Execute `vigil probe`: exit `0` when the value matches, `1` when not.
pub fn run_probe(args: &ProbeArgs) -> Result<u8> {
    match probe(args) {
        Some(true) => {
            println!("{}: {:?} matches", args.format, args.value);
            Ok(0)
        }
        Some(false) => {
            println!("{}: {:?} does not match", args.format, args.value);
            Ok(1)
        }
        None => bail!("no format checker registered under `{}`", args.format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(format: &str, value: &str, number: bool) -> ProbeArgs {
        ProbeArgs {
            format: format.to_string(),
            value: value.to_string(),
            number,
        }
    }

    #[test]
    fn test_probe_builtin() {
        assert_eq!(probe(&args("iso_8601_date", "2024-02-29", false)), Some(true));
        assert_eq!(probe(&args("iso_8601_date", "2025-02-30", false)), Some(false));
        assert_eq!(probe(&args("json_number", "1.25", true)), Some(true));
    }

    #[test]
    fn test_probe_unknown_format() {
        assert_eq!(probe(&args("no_such_format", "x", false)), None);
        assert!(run_probe(&args("no_such_format", "x", false)).is_err());
    }

    #[test]
    fn test_probe_exit_codes() {
        assert_eq!(run_probe(&args("strong_name", "Alpha", false)).unwrap(), 0);
        assert_eq!(run_probe(&args("strong_name", "9lives", false)).unwrap(), 1);
    }
}
