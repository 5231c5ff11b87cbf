// crates/caseflow-core/tests/records.rs
// ============================================================================
// Module: Processed Record Tests
// Description: Deterministic encoding and strict decoding of processed CSVs.
// Purpose: Pin persisted column names, date format, and idempotent bytes.
// ============================================================================

//! ## Overview
//! Processed files are the contract between the transform and load stages.
//! Column names are sanitized (`Province/State` becomes `province_state`),
//! dates are ISO, and writing the same data twice must produce identical
//! bytes, the basis of the pipeline's idempotence guarantee.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use caseflow_core::Observation;
use caseflow_core::RegionKey;
use caseflow_core::TransformError;
use caseflow_core::aggregate_by_country;
use caseflow_core::daily_changes;
use caseflow_core::records::read_daily_changes;
use caseflow_core::records::read_full_data;
use caseflow_core::records::write_country_summary;
use caseflow_core::records::write_daily_changes;
use caseflow_core::records::write_full_data;
use time::macros::date;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sample_observations() -> Vec<Observation> {
    vec![
        Observation::from_metrics(
            RegionKey::new("China", "Hubei"),
            30.97,
            112.27,
            date!(2020 - 01 - 22),
            444,
            17,
            28,
        ),
        Observation::from_metrics(
            RegionKey::new("Italy", ""),
            41.87,
            12.56,
            date!(2020 - 01 - 22),
            0,
            0,
            0,
        ),
    ]
}

fn encode_full(observations: &[Observation]) -> Vec<u8> {
    let mut bytes = Vec::new();
    write_full_data(&mut bytes, observations).expect("write full data");
    bytes
}

// ============================================================================
// SECTION: Encoding Tests
// ============================================================================

#[test]
fn full_data_headers_are_sanitized() {
    let bytes = encode_full(&sample_observations());
    let text = String::from_utf8(bytes).expect("utf8");
    let header = text.lines().next().expect("header line");
    assert_eq!(
        header,
        "province_state,country_region,lat,long,date,confirmed,deaths,recovered,active,\
         mortality_rate"
    );
}

#[test]
fn dates_are_written_as_iso() {
    let bytes = encode_full(&sample_observations());
    let text = String::from_utf8(bytes).expect("utf8");
    assert!(text.contains("2020-01-22"));
    assert!(!text.contains("1/22/20"));
}

#[test]
fn encoding_is_byte_identical_across_writes() {
    let observations = sample_observations();
    assert_eq!(encode_full(&observations), encode_full(&observations));
}

#[test]
fn summary_and_changes_headers_match_contract() {
    let observations = sample_observations();
    let summaries = aggregate_by_country(&observations);
    let mut bytes = Vec::new();
    write_country_summary(&mut bytes, &summaries).expect("write summary");
    let text = String::from_utf8(bytes).expect("utf8");
    assert!(text.starts_with(
        "country_region,date,confirmed,deaths,recovered,active,mortality_rate"
    ));

    let changes = daily_changes(&observations);
    let mut bytes = Vec::new();
    write_daily_changes(&mut bytes, &changes).expect("write changes");
    let text = String::from_utf8(bytes).expect("utf8");
    let header = text.lines().next().expect("header line");
    assert!(header.ends_with("new_confirmed,new_deaths,new_recovered"));
}

// ============================================================================
// SECTION: Decoding Tests
// ============================================================================

#[test]
fn full_data_reads_back_what_was_written() {
    let observations = sample_observations();
    let bytes = encode_full(&observations);
    let decoded = read_full_data(bytes.as_slice()).expect("read full data");
    assert_eq!(decoded, observations);
}

#[test]
fn daily_changes_read_back_with_increments() {
    let observations = sample_observations();
    let changes = daily_changes(&observations);
    let mut bytes = Vec::new();
    write_daily_changes(&mut bytes, &changes).expect("write changes");
    let decoded = read_daily_changes(bytes.as_slice()).expect("read changes");
    assert_eq!(decoded, changes);
}

#[test]
fn unexpected_header_row_is_rejected() {
    let bytes = b"wrong,header\n1,2\n".to_vec();
    let err = read_full_data(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, TransformError::Record(_)));
}

#[test]
fn malformed_date_field_is_rejected() {
    let observations = sample_observations();
    let bytes = encode_full(&observations);
    let text = String::from_utf8(bytes).expect("utf8").replace("2020-01-22", "not-a-date");
    let err = read_full_data(text.as_bytes()).unwrap_err();
    assert!(matches!(err, TransformError::Record(_)));
}
