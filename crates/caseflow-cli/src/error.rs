// crates/caseflow-cli/src/error.rs
// ============================================================================
// Module: Caseflow Pipeline Errors
// Description: Stage-level error taxonomy for the orchestration layer.
// Purpose: Carry each failure class to the terminal run-log entry.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Stage drivers return these errors to the orchestrator instead of crashing
//! the process. Per the pipeline's propagation policy, store failures are the
//! only class that originates as a raised error below this layer; the
//! orchestrator catches every variant at the top level and converts it into
//! a terminal run-log entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Pipeline Error
// ============================================================================

/// Stage-level failures surfaced to the orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration could not be loaded or validated.
    #[error("config error: {0}")]
    Config(String),
    /// The extraction stage failed before any category could be attempted.
    #[error("extract error: {0}")]
    Extract(String),
    /// The transform stage hit a hard error (malformed input, missing
    /// backbone, or intermediate-file I/O).
    #[error("transform error: {0}")]
    Transform(String),
    /// The load stage failed; the store transaction was rolled back.
    #[error("store error: {0}")]
    Store(String),
    /// Run-log or metadata file could not be written.
    #[error("io error: {0}")]
    Io(String),
    /// The diagnostic log sink could not be installed.
    #[error("logging error: {0}")]
    Logging(String),
}
