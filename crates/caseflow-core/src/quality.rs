// crates/caseflow-core/src/quality.rs
// ============================================================================
// Module: Caseflow Data Quality Checks
// Description: Post-transform validation over the three output entities.
// Purpose: Surface data defects as warnings without failing the run.
// Dependencies: caseflow-core model
// ============================================================================

//! ## Overview
//! Quality checks run after the transform stage and report findings; the
//! pipeline logs them as warnings and still succeeds. The checks re-verify
//! the invariants the engines are supposed to uphold (derived-field
//! identities, non-negative increments, grain consistency) plus defects the
//! engines pass through untouched (duplicate source keys, mortality above
//! 100 from inconsistent source counters).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use time::Date;

use crate::dates::format_iso;
use crate::model::CountrySummary;
use crate::model::DailyChange;
use crate::model::Observation;
use crate::model::RegionKey;
use crate::model::active_cases;

// ============================================================================
// SECTION: Findings
// ============================================================================

/// One named data-quality finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityFinding {
    /// Stable name of the check that produced the finding.
    pub check: &'static str,
    /// Human-readable description of the defect.
    pub detail: String,
}

impl QualityFinding {
    /// Creates a finding for the named check.
    fn new(check: &'static str, detail: impl Into<String>) -> Self {
        Self {
            check,
            detail: detail.into(),
        }
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Runs all quality checks over the transformed outputs.
///
/// An empty result means every check passed.
#[must_use]
pub fn run_quality_checks(
    observations: &[Observation],
    summaries: &[CountrySummary],
    changes: &[DailyChange],
) -> Vec<QualityFinding> {
    let mut findings = Vec::new();
    if observations.is_empty() {
        findings.push(QualityFinding::new("non_empty_output", "full-grain output is empty"));
    }
    check_duplicate_keys(observations, &mut findings);
    check_derived_fields(observations, &mut findings);
    check_summary_sums(observations, summaries, &mut findings);
    check_changes(observations, changes, &mut findings);
    findings
}

/// Flags duplicate (region, date) keys at full grain.
fn check_duplicate_keys(observations: &[Observation], findings: &mut Vec<QualityFinding>) {
    let mut seen: BTreeSet<(&RegionKey, Date)> = BTreeSet::new();
    for observation in observations {
        if !seen.insert((&observation.region, observation.date)) {
            findings.push(QualityFinding::new(
                "unique_full_grain_key",
                format!(
                    "duplicate key ({}, {}, {})",
                    observation.region.country_region,
                    observation.region.province_state,
                    format_iso(observation.date)
                ),
            ));
        }
    }
}

/// Re-verifies the derived-field identities and mortality bounds.
fn check_derived_fields(observations: &[Observation], findings: &mut Vec<QualityFinding>) {
    for observation in observations {
        let expected =
            active_cases(observation.confirmed, observation.deaths, observation.recovered);
        if observation.active != expected {
            findings.push(QualityFinding::new(
                "active_identity",
                format!(
                    "active {} != confirmed - deaths - recovered ({}) for ({}, {})",
                    observation.active,
                    expected,
                    observation.region.country_region,
                    format_iso(observation.date)
                ),
            ));
        }
        // Mortality above 100 is reachable only when deaths exceed confirmed,
        // an upstream inconsistency worth surfacing.
        if !(0.0..=100.0).contains(&observation.mortality_rate) {
            findings.push(QualityFinding::new(
                "mortality_bounds",
                format!(
                    "mortality rate {} outside [0, 100] for ({}, {})",
                    observation.mortality_rate,
                    observation.region.country_region,
                    format_iso(observation.date)
                ),
            ));
        }
    }
}

/// Cross-checks summary sums against the full-grain rows.
fn check_summary_sums(
    observations: &[Observation],
    summaries: &[CountrySummary],
    findings: &mut Vec<QualityFinding>,
) {
    let mut expected: BTreeMap<(&str, Date), i64> = BTreeMap::new();
    for observation in observations {
        *expected
            .entry((observation.region.country_region.as_str(), observation.date))
            .or_default() += observation.confirmed;
    }
    for summary in summaries {
        let key = (summary.country_region.as_str(), summary.date);
        let total = expected.get(&key).copied().unwrap_or(0);
        if summary.confirmed != total {
            findings.push(QualityFinding::new(
                "summary_confirmed_sum",
                format!(
                    "summary confirmed {} != full-grain sum {} for ({}, {})",
                    summary.confirmed,
                    total,
                    summary.country_region,
                    format_iso(summary.date)
                ),
            ));
        }
    }
}

/// Verifies delta grain consistency and non-negative increments.
fn check_changes(
    observations: &[Observation],
    changes: &[DailyChange],
    findings: &mut Vec<QualityFinding>,
) {
    if observations.len() != changes.len() {
        findings.push(QualityFinding::new(
            "delta_row_count",
            format!(
                "daily changes carry {} rows but full grain has {}",
                changes.len(),
                observations.len()
            ),
        ));
    }
    for change in changes {
        if change.new_confirmed < 0 || change.new_deaths < 0 || change.new_recovered < 0 {
            findings.push(QualityFinding::new(
                "non_negative_increments",
                format!(
                    "negative increment for ({}, {}, {})",
                    change.observation.region.country_region,
                    change.observation.region.province_state,
                    format_iso(change.observation.date)
                ),
            ));
        }
    }
}
