// crates/caseflow-config/tests/validation.rs
// ============================================================================
// Module: Configuration Validation Tests
// Description: Fail-closed behavior for malformed or out-of-range config.
// Purpose: Pin the hard limits and rejection of unknown keys.
// ============================================================================

//! ## Overview
//! Configuration parsing fails closed: unknown keys, out-of-range values,
//! and non-http(s) source URLs are rejected before any stage runs.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;

use caseflow_config::ConfigError;
use caseflow_config::PipelineConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn load_literal(contents: &str) -> Result<PipelineConfig, ConfigError> {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("caseflow.toml");
    fs::write(&path, contents).expect("write config");
    PipelineConfig::load_from_path(&path)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn unknown_keys_are_rejected() {
    let err = load_literal("mystery_knob = 1\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn zero_timeout_is_rejected() {
    let err = load_literal("fetch_timeout_secs = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("fetch_timeout_secs"));
}

#[test]
fn oversized_timeout_is_rejected() {
    let err = load_literal("fetch_timeout_secs = 3600\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn zero_top_countries_limit_is_rejected() {
    let err = load_literal("top_countries_limit = 0\n").unwrap_err();
    assert!(err.to_string().contains("top_countries_limit"));
}

#[test]
fn non_http_source_url_is_rejected() {
    let err = load_literal("[sources]\nconfirmed = \"ftp://example.com/a.csv\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("http"));
}

#[test]
fn relative_source_url_is_rejected() {
    let err = load_literal("[sources]\ndeaths = \"not a url\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn empty_path_is_rejected() {
    let err = load_literal("raw_data_dir = \"\"\n").unwrap_err();
    assert!(err.to_string().contains("raw_data_dir"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = load_literal("not toml at all [[[").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
