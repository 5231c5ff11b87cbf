// crates/caseflow-cli/src/main.rs
// ============================================================================
// Module: Caseflow CLI Entry Point
// Description: Command dispatcher for pipeline and standalone stage runs.
// Purpose: Provide `caseflow run` plus per-stage troubleshooting commands.
// Dependencies: caseflow-cli, caseflow-config, clap, tracing
// ============================================================================

//! ## Overview
//! The binary loads configuration (explicit `--config` path, then the
//! `CASEFLOW_CONFIG` environment variable, then `caseflow.toml`, then
//! built-in defaults), installs the combined console + file log sink, and
//! dispatches to the full pipeline or a single stage. Stage commands exist
//! for manual troubleshooting; `run` is the normal entry point.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use caseflow_cli::PipelineError;
use caseflow_cli::logging;
use caseflow_cli::run_extract;
use caseflow_cli::run_load;
use caseflow_cli::run_pipeline;
use caseflow_cli::run_transform;
use caseflow_config::PipelineConfig;
use clap::Parser;
use clap::Subcommand;

// ============================================================================
// SECTION: Command Tree
// ============================================================================

/// Batch ETL pipeline for epidemiological time-series case data.
#[derive(Debug, Parser)]
#[command(name = "caseflow", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Command to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full pipeline: extract, transform, load.
    Run,
    /// Run only the extraction stage.
    Extract,
    /// Run only the transform stage.
    Transform,
    /// Run only the load stage.
    Load,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(&cli) {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            // The log sink may not be installed yet (config/logging errors),
            // so the failure also goes directly to stderr.
            tracing::error!(error = %err, "command failed");
            let _ = write_stderr_line(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Loads configuration, installs logging, and dispatches the command.
///
/// Returns the command's success flag.
fn execute(cli: &Cli) -> Result<bool, PipelineError> {
    let config = PipelineConfig::load(cli.config.as_deref())
        .map_err(|err| PipelineError::Config(err.to_string()))?;
    logging::init(config.log_level, &config.log_file)?;

    match cli.command {
        Command::Run => {
            let outcome = run_pipeline(&config)?;
            Ok(outcome.is_success())
        }
        Command::Extract => {
            let report = run_extract(&config)?;
            Ok(report.is_success())
        }
        Command::Transform => {
            let summary = run_transform(&config)?;
            tracing::info!(records = summary.records, "transform complete");
            Ok(true)
        }
        Command::Load => {
            let report = run_load(&config)?;
            tracing::info!(rows = report.total_rows(), "load complete");
            Ok(true)
        }
    }
}
