// crates/caseflow-fetch/src/fetcher.rs
// ============================================================================
// Module: Caseflow Source Fetcher
// Description: Per-category HTTP download with verification and metadata.
// Purpose: Persist raw wide CSVs and record extraction success counts.
// Dependencies: caseflow-core, csv, reqwest, time, tracing, url
// ============================================================================

//! ## Overview
//! [`SourceFetcher`] performs sequential blocking GETs, one per category,
//! each bounded by the configured timeout. Raw bytes are written verbatim to
//! `<raw_dir>/<category>.csv` and verified as non-empty tabular data. Every
//! failure mode short of filesystem loss is per-category: it is logged,
//! recorded in the [`FetchReport`], and the remaining categories proceed.
//! Redirect-free, scheme-checked requests follow the same fail-closed
//! posture as the rest of the pipeline's inputs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use caseflow_core::Category;
use caseflow_core::model::IDENTITY_HEADERS;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Filename of the extraction metadata record inside the raw directory.
pub const EXTRACTION_METADATA_FILE: &str = "extraction_metadata.txt";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Stage-fatal fetch errors (per-category failures are not errors).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("fetch client error: {0}")]
    Client(String),
    /// Raw directory or metadata file could not be written.
    #[error("fetch io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Sources and Report
// ============================================================================

/// One category download target.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Category the URL serves.
    pub category: Category,
    /// Absolute http/https URL of the wide CSV.
    pub url: String,
}

/// A failed category download with its reason.
#[derive(Debug, Clone)]
pub struct CategoryFailure {
    /// Category that failed.
    pub category: Category,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Aggregate outcome of the fetch stage.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Number of categories attempted.
    pub attempted: usize,
    /// Categories downloaded and verified.
    pub succeeded: Vec<Category>,
    /// Categories that failed, with reasons.
    pub failed: Vec<CategoryFailure>,
}

impl FetchReport {
    /// Returns true when at least one category arrived; the pipeline
    /// proceeds on partial failure and a zero-success stage is a failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.succeeded.is_empty()
    }
}

// ============================================================================
// SECTION: Source Fetcher
// ============================================================================

/// Blocking HTTP fetcher for the category downloads.
///
/// # Invariants
/// - Redirects are rejected.
/// - Every request is bounded by the configured timeout.
#[derive(Debug)]
pub struct SourceFetcher {
    /// HTTP client used for all category requests.
    client: Client,
}

impl SourceFetcher {
    /// Builds a fetcher with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;
        Ok(Self { client })
    }

    /// Downloads every source into `raw_dir` and writes the extraction
    /// metadata record.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Io`] when the raw directory cannot be created
    /// or the metadata record cannot be written. Per-category download
    /// failures are reported in the [`FetchReport`], not as errors.
    pub fn fetch_all(
        &self,
        sources: &[SourceSpec],
        raw_dir: &Path,
    ) -> Result<FetchReport, FetchError> {
        fs::create_dir_all(raw_dir).map_err(|err| FetchError::Io(err.to_string()))?;
        let mut report = FetchReport {
            attempted: sources.len(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for source in sources {
            let target = raw_dir.join(format!("{}.csv", source.category));
            match self.fetch_category(source, &target) {
                Ok((rows, columns)) => {
                    tracing::info!(
                        category = %source.category,
                        rows,
                        columns,
                        "downloaded category dataset"
                    );
                    report.succeeded.push(source.category);
                }
                Err(reason) => {
                    tracing::error!(
                        category = %source.category,
                        %reason,
                        "category download failed; skipping"
                    );
                    report.failed.push(CategoryFailure {
                        category: source.category,
                        reason,
                    });
                }
            }
        }
        write_metadata(raw_dir, &report)?;
        Ok(report)
    }

    /// Fetches one category, persists it, and verifies the payload.
    ///
    /// Returns the verified (rows, columns) shape on success and a reason
    /// string on any per-category failure.
    fn fetch_category(&self, source: &SourceSpec, target: &Path) -> Result<(usize, usize), String> {
        let url = Url::parse(&source.url).map_err(|err| format!("invalid url: {err}"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!("unsupported url scheme '{}'", url.scheme()));
        }
        let response =
            self.client.get(url).send().map_err(|err| format!("request failed: {err}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected http status {status}"));
        }
        let bytes = response.bytes().map_err(|err| format!("body read failed: {err}"))?;
        fs::write(target, &bytes).map_err(|err| format!("raw write failed: {err}"))?;
        if bytes.is_empty() {
            return Err("downloaded file is empty".to_string());
        }
        verify_tabular(&bytes)
    }
}

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Writes the extraction metadata record, one `key: value` line per fact.
fn write_metadata(raw_dir: &Path, report: &FetchReport) -> Result<(), FetchError> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| FetchError::Io(err.to_string()))?;
    let path = raw_dir.join(EXTRACTION_METADATA_FILE);
    let mut file = fs::File::create(&path).map_err(|err| FetchError::Io(err.to_string()))?;
    writeln!(file, "extraction_timestamp: {timestamp}")
        .map_err(|err| FetchError::Io(err.to_string()))?;
    writeln!(file, "successful_downloads: {}/{}", report.succeeded.len(), report.attempted)
        .map_err(|err| FetchError::Io(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies that a payload parses as tabular data with the identity columns.
///
/// Returns the (rows, columns) shape on success.
fn verify_tabular(bytes: &[u8]) -> Result<(usize, usize), String> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader.headers().map_err(|err| format!("not tabular data: {err}"))?;
    let columns = headers.len();
    if columns < IDENTITY_HEADERS.len() {
        return Err(format!(
            "expected at least {} columns, found {columns}",
            IDENTITY_HEADERS.len()
        ));
    }
    let mut rows = 0usize;
    for record in reader.records() {
        record.map_err(|err| format!("not tabular data: {err}"))?;
        rows += 1;
    }
    Ok((rows, columns))
}
