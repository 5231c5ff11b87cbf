// crates/caseflow-cli/src/pipeline.rs
// ============================================================================
// Module: Caseflow Pipeline Orchestration
// Description: Stage sequencing, terminal states, and the durable run log.
// Purpose: Run extract, then transform, then load, stopping on the first failure.
// Dependencies: caseflow-config, time, tracing
// ============================================================================

//! ## Overview
//! The pipeline walks `Pending -> Extracting -> Transforming -> Loading` and
//! ends in `Succeeded` or `Failed`; each arrow requires the prior stage's
//! success and a failing stage skips everything after it. Both terminal
//! states append one line to the durable run-log file with timestamp,
//! status, duration, and (for failures) the failing stage and error text,
//! regardless of which stage failed or why.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::Instant;

use caseflow_config::PipelineConfig;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::PipelineError;
use crate::stages;

// ============================================================================
// SECTION: Pipeline State
// ============================================================================

/// Pipeline state machine positions.
///
/// # Invariants
/// - `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Run not yet started.
    Pending,
    /// Extraction stage in progress.
    Extracting,
    /// Transform stage in progress.
    Transforming,
    /// Load stage in progress.
    Loading,
    /// Terminal: every stage succeeded.
    Succeeded,
    /// Terminal: a stage failed; later stages were skipped.
    Failed,
}

impl PipelineState {
    /// Returns the stable lowercase label for the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting",
            Self::Transforming => "transforming",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Run Outcome
// ============================================================================

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Terminal state (`Succeeded` or `Failed`).
    pub state: PipelineState,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
    /// Stage that failed, for failed runs.
    pub failed_stage: Option<PipelineState>,
    /// Error text, for failed runs.
    pub error: Option<String>,
    /// Total rows loaded, for successful runs.
    pub rows_loaded: Option<usize>,
}

impl RunOutcome {
    /// Returns true when the run reached `Succeeded`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Succeeded
    }
}

// ============================================================================
// SECTION: Orchestration
// ============================================================================

/// Runs the full pipeline and appends the terminal run-log line.
///
/// Stage failures are converted into a `Failed` outcome, never raised; the
/// only error this function returns is a failure to append the run log
/// itself.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] when the run-log line cannot be written.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunOutcome, PipelineError> {
    let started = Instant::now();
    tracing::info!("starting pipeline run");

    let outcome = match execute_stages(config) {
        Ok(rows_loaded) => RunOutcome {
            state: PipelineState::Succeeded,
            duration_ms: started.elapsed().as_millis(),
            failed_stage: None,
            error: None,
            rows_loaded: Some(rows_loaded),
        },
        Err((stage, error)) => {
            tracing::error!(stage = %stage, %error, "pipeline failed");
            RunOutcome {
                state: PipelineState::Failed,
                duration_ms: started.elapsed().as_millis(),
                failed_stage: Some(stage),
                error: Some(error),
                rows_loaded: None,
            }
        }
    };

    append_run_log(config, &outcome)?;
    tracing::info!(
        state = %outcome.state,
        duration_ms = outcome.duration_ms,
        "pipeline run finished"
    );
    Ok(outcome)
}

/// Executes the stages in order, stopping at the first failure.
///
/// Returns the total rows loaded on success or the failing stage and error
/// text on failure.
fn execute_stages(config: &PipelineConfig) -> Result<usize, (PipelineState, String)> {
    tracing::info!(stage = %PipelineState::Extracting, "stage starting");
    let report = stages::run_extract(config)
        .map_err(|err| (PipelineState::Extracting, err.to_string()))?;
    if !report.is_success() {
        return Err((
            PipelineState::Extracting,
            format!("no category downloaded (0/{} succeeded)", report.attempted),
        ));
    }

    tracing::info!(stage = %PipelineState::Transforming, "stage starting");
    stages::run_transform(config)
        .map_err(|err| (PipelineState::Transforming, err.to_string()))?;

    tracing::info!(stage = %PipelineState::Loading, "stage starting");
    let load = stages::run_load(config)
        .map_err(|err| (PipelineState::Loading, err.to_string()))?;
    Ok(load.total_rows())
}

// ============================================================================
// SECTION: Run Log
// ============================================================================

/// Appends one terminal status line to the durable run log.
fn append_run_log(config: &PipelineConfig, outcome: &RunOutcome) -> Result<(), PipelineError> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| PipelineError::Io(err.to_string()))?;
    let mut line = format!(
        "{timestamp}, status: {}, duration_ms: {}",
        outcome.state, outcome.duration_ms
    );
    if let Some(stage) = outcome.failed_stage {
        line.push_str(&format!(", stage: {stage}"));
    }
    if let Some(error) = &outcome.error {
        line.push_str(&format!(", error: {error}"));
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.run_log_path)
        .map_err(|err| PipelineError::Io(err.to_string()))?;
    writeln!(file, "{line}").map_err(|err| PipelineError::Io(err.to_string()))
}
