// crates/caseflow-config/src/lib.rs
// ============================================================================
// Module: Caseflow Configuration
// Description: Configuration loading and validation for the pipeline.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Pipeline configuration is loaded from a TOML file with strict size and
//! path limits and validated before any stage runs. The loaded value is
//! passed explicitly into each stage entry point; there is no process-wide
//! implicit configuration state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::LogLevel;
pub use config::PipelineConfig;
pub use config::SourceUrls;
