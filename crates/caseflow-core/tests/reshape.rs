// crates/caseflow-core/tests/reshape.rs
// ============================================================================
// Module: Reshape Engine Tests
// Description: Wide-to-long conversion properties.
// Purpose: Pin the N×M row-count invariant and value placement.
// ============================================================================

//! ## Overview
//! For a wide table with M rows and N date columns the reshape output must
//! have exactly M×N rows, each carrying the source cell under its date.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use caseflow_core::Category;
use caseflow_core::WideTable;
use caseflow_core::reshape;
use time::macros::date;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sample_table() -> WideTable {
    let csv = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20\n\
               Hubei,China,30.97,112.27,444,549,761\n\
               ,Italy,41.87,12.56,0,0,2\n";
    WideTable::parse(Category::Confirmed, csv.as_bytes()).expect("wide table")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn output_has_rows_times_dates_rows() {
    let table = sample_table();
    let long = reshape(&table);
    assert_eq!(long.len(), table.rows.len() * table.dates.len());
    assert_eq!(long.len(), 6);
}

#[test]
fn each_row_carries_its_date_and_value() {
    let table = sample_table();
    let long = reshape(&table);
    let hubei: Vec<_> =
        long.iter().filter(|row| row.region.province_state == "Hubei").collect();
    assert_eq!(hubei.len(), 3);
    assert_eq!(hubei[0].date, date!(2020 - 01 - 22));
    assert_eq!(hubei[0].value, 444);
    assert_eq!(hubei[2].date, date!(2020 - 01 - 24));
    assert_eq!(hubei[2].value, 761);
}

#[test]
fn attributes_are_carried_onto_every_long_row() {
    let table = sample_table();
    let long = reshape(&table);
    for row in long.iter().filter(|row| row.region.country_region == "China") {
        assert_eq!(row.lat, 30.97);
        assert_eq!(row.long, 112.27);
    }
}

#[test]
fn empty_table_reshapes_to_no_rows() {
    let csv = "Province/State,Country/Region,Lat,Long,1/22/20\n";
    let table = WideTable::parse(Category::Deaths, csv.as_bytes()).expect("wide table");
    assert!(reshape(&table).is_empty());
}
