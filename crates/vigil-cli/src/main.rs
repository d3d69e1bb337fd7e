//! # vigil CLI entry point
//!
//! Parses arguments, installs logging and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vigil_cli::check::{run_check, CheckArgs};
use vigil_cli::formats::{run_formats, run_probe, FormatsArgs, ProbeArgs};

/// Exit status for errors that prevented validation from running.
const OPERATIONAL_ERROR: u8 = 2;

/// Validate JSON and YAML documents against JSON Schema.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents against a schema.
    Check(CheckArgs),

    /// List registered format names.
    Formats(FormatsArgs),

    /// Check one value against one registered format.
    Probe(ProbeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match &cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Formats(args) => run_formats(args),
        Commands::Probe(args) => run_probe(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(OPERATIONAL_ERROR)
        }
    }
}
