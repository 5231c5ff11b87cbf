// crates/caseflow-core/src/error.rs
// ============================================================================
// Module: Caseflow Transform Errors
// Description: Typed errors for wide parsing and the transform engines.
// Purpose: Distinguish hard transform failures from per-category skips.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Transform errors are hard failures: a malformed date header or a missing
//! `confirmed` backbone aborts the whole run. Per-category fetch failures are
//! not represented here; they are handled upstream as "dataset absent" and
//! surface downstream only through [`TransformError::MissingConfirmed`] when
//! no backbone remains.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::model::Category;

// ============================================================================
// SECTION: Transform Error
// ============================================================================

/// Errors raised by wide-table parsing and the transform engines.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The required `confirmed` category is absent; no backbone exists.
    #[error("required category 'confirmed' is missing; cannot reconcile")]
    MissingConfirmed,
    /// Malformed header in a wide table (identity columns or date columns).
    #[error("{category} header error: {detail}")]
    Header {
        /// Category whose wide table failed to parse.
        category: Category,
        /// Human-readable description of the header defect.
        detail: String,
    },
    /// Malformed cell in a wide table data row.
    #[error("{category} row {line}: {detail}")]
    Cell {
        /// Category whose wide table failed to parse.
        category: Category,
        /// One-based line number of the offending row (header is line 1).
        line: usize,
        /// Human-readable description of the cell defect.
        detail: String,
    },
    /// Low-level CSV decoding failure.
    #[error("csv error: {0}")]
    Csv(String),
    /// Malformed record in a processed long-format file.
    #[error("invalid processed record: {0}")]
    Record(String),
}
