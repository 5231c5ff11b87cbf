// crates/caseflow-config/src/config.rs
// ============================================================================
// Module: Caseflow Configuration Loading
// Description: TOML-backed pipeline configuration with fail-closed checks.
// Purpose: Resolve, parse, and validate the run configuration.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration resolution order: an explicit `--config` path, then the
//! `CASEFLOW_CONFIG` environment variable, then `caseflow.toml` in the
//! working directory. When no file exists at the default location the
//! built-in defaults apply. Explicitly named files must exist and validate;
//! unknown keys, oversized files, and out-of-range values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "caseflow.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CASEFLOW_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum allowed fetch timeout in seconds.
pub(crate) const MIN_FETCH_TIMEOUT_SECS: u64 = 1;
/// Maximum allowed fetch timeout in seconds.
pub(crate) const MAX_FETCH_TIMEOUT_SECS: u64 = 300;
/// Maximum allowed row limit for the top-countries view.
pub(crate) const MAX_TOP_COUNTRIES_LIMIT: u32 = 100;

/// Default upstream URL for the confirmed category.
const DEFAULT_CONFIRMED_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_global.csv";
/// Default upstream URL for the deaths category.
const DEFAULT_DEATHS_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_global.csv";
/// Default upstream URL for the recovered category.
const DEFAULT_RECOVERED_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_recovered_global.csv";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving, parsing, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Configuration file exceeded the size limit.
    #[error("config file too large: {actual_bytes} bytes (max {MAX_CONFIG_FILE_SIZE})")]
    TooLarge {
        /// Actual file size in bytes.
        actual_bytes: u64,
    },
    /// Configuration file failed to parse as TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A configuration value failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Log Level
// ============================================================================

/// Log verbosity recognized by the pipeline.
///
/// # Invariants
/// - Labels map 1:1 to tracing level filter directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// Informational events (default).
    #[default]
    Info,
    /// Debug-level detail.
    Debug,
    /// Full trace detail.
    Trace,
}

impl LogLevel {
    /// Returns the tracing filter directive for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

// ============================================================================
// SECTION: Source URLs
// ============================================================================

/// Upstream URLs for the three source categories.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceUrls {
    /// Confirmed category URL.
    #[serde(default = "default_confirmed_url")]
    pub confirmed: String,
    /// Deaths category URL.
    #[serde(default = "default_deaths_url")]
    pub deaths: String,
    /// Recovered category URL.
    #[serde(default = "default_recovered_url")]
    pub recovered: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            confirmed: default_confirmed_url(),
            deaths: default_deaths_url(),
            recovered: default_recovered_url(),
        }
    }
}

/// Returns the default confirmed category URL.
fn default_confirmed_url() -> String {
    DEFAULT_CONFIRMED_URL.to_string()
}

/// Returns the default deaths category URL.
fn default_deaths_url() -> String {
    DEFAULT_DEATHS_URL.to_string()
}

/// Returns the default recovered category URL.
fn default_recovered_url() -> String {
    DEFAULT_RECOVERED_URL.to_string()
}

// ============================================================================
// SECTION: Pipeline Config
// ============================================================================

/// Validated pipeline configuration passed into each stage entry point.
///
/// # Invariants
/// - All paths satisfy component and total length limits.
/// - `fetch_timeout_secs` lies within the allowed bounds.
/// - Source URLs are absolute `http`/`https` URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory receiving the raw category downloads.
    #[serde(default = "default_raw_data_dir")]
    pub raw_data_dir: PathBuf,
    /// Directory receiving the processed long-format CSVs.
    #[serde(default = "default_processed_data_dir")]
    pub processed_data_dir: PathBuf,
    /// Destination SQLite database path.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Log verbosity for the combined console + file sink.
    #[serde(default)]
    pub log_level: LogLevel,
    /// Path of the durable diagnostic log file.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Path of the terminal run-status log (one line per run).
    #[serde(default = "default_run_log_path")]
    pub run_log_path: PathBuf,
    /// Per-request fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Row limit for the top-countries view.
    #[serde(default = "default_top_countries_limit")]
    pub top_countries_limit: u32,
    /// Upstream category URLs.
    #[serde(default)]
    pub sources: SourceUrls,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_data_dir: default_raw_data_dir(),
            processed_data_dir: default_processed_data_dir(),
            database_path: default_database_path(),
            log_level: LogLevel::default(),
            log_file: default_log_file(),
            run_log_path: default_run_log_path(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            top_countries_limit: default_top_countries_limit(),
            sources: SourceUrls::default(),
        }
    }
}

/// Returns the default raw data directory.
fn default_raw_data_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

/// Returns the default processed data directory.
fn default_processed_data_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

/// Returns the default destination database path.
fn default_database_path() -> PathBuf {
    PathBuf::from("case_analytics.db")
}

/// Returns the default diagnostic log file path.
fn default_log_file() -> PathBuf {
    PathBuf::from("pipeline.log")
}

/// Returns the default run-status log path.
fn default_run_log_path() -> PathBuf {
    PathBuf::from("pipeline_metadata.txt")
}

/// Returns the default per-request fetch timeout in seconds.
const fn default_fetch_timeout_secs() -> u64 {
    30
}

/// Returns the default top-countries view limit.
const fn default_top_countries_limit() -> u32 {
    10
}

impl PipelineConfig {
    /// Loads configuration from an explicit path, the environment override,
    /// or the default location, falling back to built-in defaults when no
    /// default-location file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicitly named file is missing or
    /// unreadable, the file is oversized or malformed, or validation fails.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from);
        let (path, required) = match (explicit_path, env_path) {
            (Some(path), _) => (path.to_path_buf(), true),
            (None, Some(path)) => (path, true),
            (None, None) => (PathBuf::from(DEFAULT_CONFIG_NAME), false),
        };
        if !path.exists() {
            if required {
                return Err(ConfigError::Io(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let config = Self::load_from_path(&path)?;
        Ok(config)
    }

    /// Loads and validates configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, oversized,
    /// malformed, or fails validation.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                actual_bytes: metadata.len(),
            });
        }
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let config: Self =
            toml::from_str(&contents).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every configuration value against the hard limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_path("raw_data_dir", &self.raw_data_dir)?;
        validate_path("processed_data_dir", &self.processed_data_dir)?;
        validate_path("database_path", &self.database_path)?;
        validate_path("log_file", &self.log_file)?;
        validate_path("run_log_path", &self.run_log_path)?;
        if !(MIN_FETCH_TIMEOUT_SECS..=MAX_FETCH_TIMEOUT_SECS).contains(&self.fetch_timeout_secs) {
            return Err(ConfigError::Invalid(format!(
                "fetch_timeout_secs out of range: {} (allowed {MIN_FETCH_TIMEOUT_SECS}..={MAX_FETCH_TIMEOUT_SECS})",
                self.fetch_timeout_secs
            )));
        }
        if self.top_countries_limit == 0 || self.top_countries_limit > MAX_TOP_COUNTRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "top_countries_limit out of range: {} (allowed 1..={MAX_TOP_COUNTRIES_LIMIT})",
                self.top_countries_limit
            )));
        }
        validate_source_url("sources.confirmed", &self.sources.confirmed)?;
        validate_source_url("sources.deaths", &self.sources.deaths)?;
        validate_source_url("sources.recovered", &self.sources.recovered)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Validates a configured path against emptiness and length limits.
fn validate_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    let raw = path.as_os_str();
    if raw.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if raw.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} exceeds {MAX_TOTAL_PATH_LENGTH} bytes"
        )));
    }
    for component in path.components() {
        if let Component::Normal(part) = component
            && part.len() > MAX_PATH_COMPONENT_LENGTH
        {
            return Err(ConfigError::Invalid(format!(
                "{field} has a component longer than {MAX_PATH_COMPONENT_LENGTH} bytes"
            )));
        }
    }
    Ok(())
}

/// Validates that a source URL is absolute http/https.
fn validate_source_url(field: &str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid URL: {err}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Invalid(format!(
            "{field} must use http or https, found '{}'",
            url.scheme()
        )));
    }
    Ok(())
}
