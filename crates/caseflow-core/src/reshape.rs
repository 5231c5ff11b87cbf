// crates/caseflow-core/src/reshape.rs
// ============================================================================
// Module: Caseflow Reshape Engine
// Description: Wide-to-long conversion for a single category table.
// Purpose: Produce one row per (region, date) from the wide layout.
// Dependencies: caseflow-core model, tracing
// ============================================================================

//! ## Overview
//! The reshape engine converts a [`WideTable`] with M rows and N date columns
//! into exactly M×N [`LongRow`] values by explicit iteration. No dataframe
//! machinery is involved; this is the one-pass melt the rest of the pipeline
//! builds on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::LongRow;
use crate::wide::WideTable;

// ============================================================================
// SECTION: Reshape
// ============================================================================

/// Converts a wide table into long-format rows, one per (region, date).
///
/// Output length is exactly `table.rows.len() * table.dates.len()`.
#[must_use]
pub fn reshape(table: &WideTable) -> Vec<LongRow> {
    let mut rows = Vec::with_capacity(table.rows.len() * table.dates.len());
    for wide_row in &table.rows {
        for (date, value) in table.dates.iter().zip(&wide_row.values) {
            rows.push(LongRow {
                region: wide_row.region.clone(),
                lat: wide_row.lat,
                long: wide_row.long,
                date: *date,
                value: *value,
            });
        }
    }
    tracing::debug!(
        category = %table.category,
        wide_rows = table.rows.len(),
        dates = table.dates.len(),
        long_rows = rows.len(),
        "reshaped wide table"
    );
    rows
}
