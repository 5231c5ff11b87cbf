// crates/caseflow-fetch/src/lib.rs
// ============================================================================
// Module: Caseflow Fetch
// Description: Best-effort HTTP extraction of wide-format source files.
// Purpose: Download, persist, and verify the three category datasets.
// Dependencies: caseflow-core, csv, reqwest, time, tracing, url
// ============================================================================

//! ## Overview
//! The fetch stage downloads each category's wide CSV over HTTP with a
//! bounded timeout, persists the raw bytes verbatim, and verifies the result
//! is non-empty tabular data before counting it successful. Failures are
//! per-category: a dead URL or empty payload is logged and skipped, never
//! fatal to the stage. The stage as a whole fails only when no category
//! arrives at all.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod fetcher;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use fetcher::CategoryFailure;
pub use fetcher::EXTRACTION_METADATA_FILE;
pub use fetcher::FetchError;
pub use fetcher::FetchReport;
pub use fetcher::SourceFetcher;
pub use fetcher::SourceSpec;
