// crates/caseflow-core/src/delta.rs
// ============================================================================
// Module: Caseflow Delta Engine
// Description: Day-over-day increments per region time series.
// Purpose: Compute clipped first differences of the cumulative counters.
// Dependencies: caseflow-core model, tracing
// ============================================================================

//! ## Overview
//! The delta engine sorts observations by (country, province, date) and walks
//! each distinct (country, province) series in order, emitting the first
//! difference of confirmed/deaths/recovered against the previous date. The
//! first date of a series has no predecessor and its diffs are 0. Cumulative
//! counters are assumed non-decreasing; a downward correction in the source
//! yields a clipped 0, never a negative "new" count.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::DailyChange;
use crate::model::Observation;

// ============================================================================
// SECTION: Deltas
// ============================================================================

/// Computes per-series daily increments over the full observation set.
///
/// Output carries every input row (sorted by country, province, date) plus
/// the three `new_*` fields.
#[must_use]
pub fn daily_changes(observations: &[Observation]) -> Vec<DailyChange> {
    let mut sorted: Vec<Observation> = observations.to_vec();
    sorted.sort_by(|a, b| (&a.region, a.date).cmp(&(&b.region, b.date)));

    let mut changes = Vec::with_capacity(sorted.len());
    let mut previous: Option<&Observation> = None;
    for current in &sorted {
        let (new_confirmed, new_deaths, new_recovered) = match previous {
            Some(prior) if prior.region == current.region => (
                clipped_diff(current.confirmed, prior.confirmed),
                clipped_diff(current.deaths, prior.deaths),
                clipped_diff(current.recovered, prior.recovered),
            ),
            _ => (0, 0, 0),
        };
        changes.push(DailyChange {
            observation: current.clone(),
            new_confirmed,
            new_deaths,
            new_recovered,
        });
        previous = Some(current);
    }
    tracing::debug!(rows = changes.len(), "computed daily changes");
    changes
}

/// First difference clipped at zero for downward data corrections.
const fn clipped_diff(current: i64, prior: i64) -> i64 {
    let diff = current - prior;
    if diff < 0 { 0 } else { diff }
}
