// crates/caseflow-core/tests/quality.rs
// ============================================================================
// Module: Data Quality Check Tests
// Description: Warn-only validation over the three transform outputs.
// Purpose: Pin which defects are reported and that clean data reports none.
// ============================================================================

//! ## Overview
//! Quality checks never fail the run; they return findings the pipeline logs
//! as warnings. These tests cover the clean path and each defect class.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use caseflow_core::Observation;
use caseflow_core::RegionKey;
use caseflow_core::aggregate_by_country;
use caseflow_core::daily_changes;
use caseflow_core::run_quality_checks;
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
            date!(2020 - 03 - 01),
            100,
            10,
            30,
        ),
        Observation::from_metrics(
            RegionKey::new("China", "Hubei"),
            30.97,
            112.27,
            date!(2020 - 03 - 02),
            120,
            12,
            40,
        ),
    ]
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn clean_outputs_report_no_findings() {
    let observations = sample_observations();
    let summaries = aggregate_by_country(&observations);
    let changes = daily_changes(&observations);
    let findings = run_quality_checks(&observations, &summaries, &changes);
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[test]
fn empty_full_grain_is_reported() {
    let findings = run_quality_checks(&[], &[], &[]);
    assert!(findings.iter().any(|finding| finding.check == "non_empty_output"));
}

#[test]
fn duplicate_full_grain_keys_are_reported() {
    let mut observations = sample_observations();
    observations.push(observations[0].clone());
    let summaries = aggregate_by_country(&observations);
    let changes = daily_changes(&observations);
    let findings = run_quality_checks(&observations, &summaries, &changes);
    assert!(findings.iter().any(|finding| finding.check == "unique_full_grain_key"));
}

#[test]
fn mortality_above_100_is_reported() {
    // Deaths exceed confirmed: an upstream inconsistency, passed through by
    // the engines and surfaced here.
    let observations = vec![Observation::from_metrics(
        RegionKey::new("X", ""),
        0.0,
        0.0,
        date!(2020 - 03 - 01),
        10,
        20,
        0,
    )];
    let summaries = aggregate_by_country(&observations);
    let changes = daily_changes(&observations);
    let findings = run_quality_checks(&observations, &summaries, &changes);
    assert!(findings.iter().any(|finding| finding.check == "mortality_bounds"));
}

#[test]
fn delta_row_count_mismatch_is_reported() {
    let observations = sample_observations();
    let summaries = aggregate_by_country(&observations);
    let findings = run_quality_checks(&observations, &summaries, &[]);
    assert!(findings.iter().any(|finding| finding.check == "delta_row_count"));
}

#[test]
fn summary_sum_mismatch_is_reported() {
    let observations = sample_observations();
    let mut summaries = aggregate_by_country(&observations);
    summaries[0].confirmed += 1;
    let changes = daily_changes(&observations);
    let findings = run_quality_checks(&observations, &summaries, &changes);
    assert!(findings.iter().any(|finding| finding.check == "summary_confirmed_sum"));
}
