// crates/caseflow-cli/src/lib.rs
// ============================================================================
// Module: Caseflow CLI Library
// Description: Stage drivers and pipeline orchestration for the binary.
// Purpose: Expose the run/extract/transform/load entry points for testing.
// Dependencies: caseflow-config, caseflow-core, caseflow-fetch, caseflow-store-sqlite
// ============================================================================

//! ## Overview
//! The CLI library wires the pipeline together: stage drivers read and write
//! the intermediate files, the pipeline module sequences the stages through
//! the `Pending -> Extracting -> Transforming -> Loading` state machine, and
//! the logging module installs the combined console + file diagnostic sink.
//! The binary in `main.rs` is a thin clap dispatcher over these entry
//! points.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod logging;
pub mod pipeline;
pub mod stages;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::PipelineError;
pub use pipeline::PipelineState;
pub use pipeline::RunOutcome;
pub use pipeline::run_pipeline;
pub use stages::TransformSummary;
pub use stages::run_extract;
pub use stages::run_load;
pub use stages::run_transform;
