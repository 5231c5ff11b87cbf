// crates/caseflow-cli/src/logging.rs
// ============================================================================
// Module: Caseflow Logging
// Description: Combined console + file diagnostic sink installation.
// Purpose: Route all pipeline diagnostics through one tracing subscriber.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! All diagnostics go to a combined sink: a console layer and an append-mode
//! file layer, both filtered by the configured log level. The sink is
//! installed once per process; the terminal run status additionally goes to
//! the separate durable run-log regardless of this sink's fate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use caseflow_config::LogLevel;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::PipelineError;

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Installs the combined console + file subscriber at the configured level.
///
/// # Errors
///
/// Returns [`PipelineError::Logging`] when the log file cannot be opened or
/// a global subscriber is already installed.
pub fn init(level: LogLevel, log_file: &Path) -> Result<(), PipelineError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|err| PipelineError::Logging(err.to_string()))?;
    let filter = EnvFilter::try_new(level.as_str())
        .map_err(|err| PipelineError::Logging(err.to_string()))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .try_init()
        .map_err(|err| PipelineError::Logging(err.to_string()))
}
