// crates/caseflow-core/src/aggregate.rs
// ============================================================================
// Module: Caseflow Aggregation Engine
// Description: Country-grain rollup of reconciled observations.
// Purpose: Sum metrics per (country, date) and recompute mortality.
// Dependencies: caseflow-core model, tracing
// ============================================================================

//! ## Overview
//! Aggregation groups observations by (country, date) and sums confirmed,
//! deaths, recovered, and active. The mortality rate is recomputed from the
//! summed values, never averaged across sub-regions, with the usual
//! division-by-zero guard. The result is a distinct entity written to its own
//! output; full-grain rows are not replaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use time::Date;

use crate::model::CountrySummary;
use crate::model::Observation;
use crate::model::mortality_rate;

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Accumulated counters for one (country, date) group.
#[derive(Debug, Default, Clone, Copy)]
struct GroupTotals {
    /// Summed confirmed cases.
    confirmed: i64,
    /// Summed deaths.
    deaths: i64,
    /// Summed recoveries.
    recovered: i64,
    /// Summed active cases.
    active: i64,
}

/// Rolls observations up to (country, date) grain.
///
/// Output is sorted by country then date.
#[must_use]
pub fn aggregate_by_country(observations: &[Observation]) -> Vec<CountrySummary> {
    let mut groups: BTreeMap<(String, Date), GroupTotals> = BTreeMap::new();
    for observation in observations {
        let key = (observation.region.country_region.clone(), observation.date);
        let totals = groups.entry(key).or_default();
        totals.confirmed += observation.confirmed;
        totals.deaths += observation.deaths;
        totals.recovered += observation.recovered;
        totals.active += observation.active;
    }
    let summaries: Vec<CountrySummary> = groups
        .into_iter()
        .map(|((country_region, date), totals)| CountrySummary {
            country_region,
            date,
            confirmed: totals.confirmed,
            deaths: totals.deaths,
            recovered: totals.recovered,
            active: totals.active,
            mortality_rate: mortality_rate(totals.deaths, totals.confirmed),
        })
        .collect();
    tracing::debug!(groups = summaries.len(), "aggregated country summaries");
    summaries
}
