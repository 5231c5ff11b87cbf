// crates/caseflow-core/tests/wide_parse.rs
// ============================================================================
// Module: Wide Table Parsing Tests
// Description: Validation of identity columns, date headers, and cells.
// Purpose: Pin the hard-error behavior for malformed source tables.
// ============================================================================

//! ## Overview
//! Wide parsing is the boundary where the fixed-format assumption is
//! enforced: identity columns must match exactly, every date header must
//! parse as `M/D/YY`, and unparseable cells abort the category.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use caseflow_core::Category;
use caseflow_core::TransformError;
use caseflow_core::UNKNOWN_PROVINCE;
use caseflow_core::WideTable;
use time::macros::date;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const HEADER: &str = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20";

fn parse(csv: &str) -> Result<WideTable, TransformError> {
    WideTable::parse(Category::Confirmed, csv.as_bytes())
}

// ============================================================================
// SECTION: Success Path Tests
// ============================================================================

#[test]
fn parses_dates_and_rows() {
    let csv = format!("{HEADER}\nHubei,China,30.97,112.27,444,549\n");
    let table = parse(&csv).expect("wide table");
    assert_eq!(table.dates, vec![date!(2020 - 01 - 22), date!(2020 - 01 - 23)]);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].values, vec![444, 549]);
    assert_eq!(table.rows[0].region.country_region, "China");
    assert_eq!(table.rows[0].region.province_state, "Hubei");
}

#[test]
fn blank_province_normalizes_to_unknown() {
    let csv = format!("{HEADER}\n,Italy,41.87,12.56,0,2\n");
    let table = parse(&csv).expect("wide table");
    assert_eq!(table.rows[0].region.province_state, UNKNOWN_PROVINCE);
}

#[test]
fn empty_metric_cell_parses_as_zero() {
    let csv = format!("{HEADER}\nHubei,China,30.97,112.27,,549\n");
    let table = parse(&csv).expect("wide table");
    assert_eq!(table.rows[0].values, vec![0, 549]);
}

#[test]
fn blank_coordinates_default_to_zero() {
    let csv = format!("{HEADER}\nHubei,China,,,1,2\n");
    let table = parse(&csv).expect("wide table");
    assert_eq!(table.rows[0].lat, 0.0);
    assert_eq!(table.rows[0].long, 0.0);
}

#[test]
fn table_without_date_columns_is_allowed() {
    let csv = "Province/State,Country/Region,Lat,Long\nHubei,China,30.97,112.27\n";
    let table = parse(csv).expect("wide table");
    assert!(table.dates.is_empty());
    assert!(table.rows[0].values.is_empty());
}

// ============================================================================
// SECTION: Hard Error Tests
// ============================================================================

#[test]
fn unparseable_date_header_is_a_hard_error() {
    let csv = "Province/State,Country/Region,Lat,Long,not-a-date\nHubei,China,1,2,3\n";
    let err = parse(csv).unwrap_err();
    assert!(matches!(err, TransformError::Header { .. }));
    assert!(err.to_string().contains("not-a-date"));
}

#[test]
fn impossible_calendar_date_is_a_hard_error() {
    let csv = "Province/State,Country/Region,Lat,Long,2/30/20\nHubei,China,1,2,3\n";
    let err = parse(csv).unwrap_err();
    assert!(matches!(err, TransformError::Header { .. }));
}

#[test]
fn wrong_identity_columns_are_a_hard_error() {
    let csv = "State,Country/Region,Lat,Long,1/22/20\nHubei,China,1,2,3\n";
    let err = parse(csv).unwrap_err();
    assert!(matches!(err, TransformError::Header { .. }));
    assert!(err.to_string().contains("Province/State"));
}

#[test]
fn empty_country_is_a_cell_error() {
    let csv = format!("{HEADER}\nHubei,,30.97,112.27,444,549\n");
    let err = parse(&csv).unwrap_err();
    assert!(matches!(err, TransformError::Cell { line: 2, .. }));
}

#[test]
fn unparseable_value_is_a_cell_error() {
    let csv = format!("{HEADER}\nHubei,China,30.97,112.27,444,oops\n");
    let err = parse(&csv).unwrap_err();
    assert!(matches!(err, TransformError::Cell { line: 2, .. }));
    assert!(err.to_string().contains("oops"));
}
