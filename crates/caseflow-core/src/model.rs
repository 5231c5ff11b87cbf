// crates/caseflow-core/src/model.rs
// ============================================================================
// Module: Caseflow Data Model
// Description: Core entities for the epidemiological ETL pipeline.
// Purpose: Provide typed rows for long, reconciled, summary, and delta data.
// Dependencies: time
// ============================================================================

//! ## Overview
//! The model follows the grain progression of the pipeline: a [`LongRow`] is
//! one (region, date, value) triple for a single category; an [`Observation`]
//! is the reconciled full-grain row carrying all three metrics plus derived
//! fields; [`CountrySummary`] and [`DailyChange`] are the coarser and the
//! differenced outputs. Sub-region identity is normalized to
//! [`UNKNOWN_PROVINCE`] at parse time so it participates in join and group-by
//! keys without null handling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use time::Date;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel sub-region name used when the source leaves the field blank.
pub const UNKNOWN_PROVINCE: &str = "Unknown";

/// Identity column headers expected at the front of every wide table.
pub const IDENTITY_HEADERS: [&str; 4] = ["Province/State", "Country/Region", "Lat", "Long"];

// ============================================================================
// SECTION: Category
// ============================================================================

/// Metric category of a source dataset.
///
/// # Invariants
/// - Labels are stable; they name raw files and persisted columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Cumulative confirmed case counts.
    Confirmed,
    /// Cumulative death counts.
    Deaths,
    /// Cumulative recovered counts.
    Recovered,
}

impl Category {
    /// All categories in pipeline order.
    pub const ALL: [Self; 3] = [Self::Confirmed, Self::Deaths, Self::Recovered];

    /// Returns the stable lowercase label for the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Deaths => "deaths",
            Self::Recovered => "recovered",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Region Identity
// ============================================================================

/// Join and group-by identity of a reporting region.
///
/// # Invariants
/// - `province_state` is never empty; blank sources normalize to
///   [`UNKNOWN_PROVINCE`].
/// - Latitude/longitude are deliberately excluded: they are attributes, not
///   identity, and are carried from the confirmed (left) side of the join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey {
    /// Primary region name (country or region).
    pub country_region: String,
    /// Sub-region name, normalized to [`UNKNOWN_PROVINCE`] when absent.
    pub province_state: String,
}

impl RegionKey {
    /// Creates a region key, normalizing a blank sub-region to the sentinel.
    #[must_use]
    pub fn new(country_region: impl Into<String>, province_state: &str) -> Self {
        Self {
            country_region: country_region.into(),
            province_state: normalize_province(province_state),
        }
    }
}

/// Normalizes a raw sub-region value to the sentinel when blank.
#[must_use]
pub fn normalize_province(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_PROVINCE.to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// SECTION: Row Types
// ============================================================================

/// One (region, date, value) triple produced by the reshape engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    /// Region identity.
    pub region: RegionKey,
    /// Latitude attribute from the source row.
    pub lat: f64,
    /// Longitude attribute from the source row.
    pub long: f64,
    /// Observation date.
    pub date: Date,
    /// Cumulative metric value for the row's category.
    pub value: i64,
}

/// Reconciled full-grain row carrying all three metrics and derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Region identity.
    pub region: RegionKey,
    /// Latitude carried from the confirmed side of the join.
    pub lat: f64,
    /// Longitude carried from the confirmed side of the join.
    pub long: f64,
    /// Observation date.
    pub date: Date,
    /// Cumulative confirmed cases.
    pub confirmed: i64,
    /// Cumulative deaths.
    pub deaths: i64,
    /// Cumulative recoveries.
    pub recovered: i64,
    /// Derived: `confirmed - deaths - recovered`; may be negative.
    pub active: i64,
    /// Derived: `deaths / confirmed * 100`, or 0 when confirmed is 0.
    pub mortality_rate: f64,
}

impl Observation {
    /// Builds an observation, computing the derived fields from the metrics.
    #[must_use]
    pub fn from_metrics(
        region: RegionKey,
        lat: f64,
        long: f64,
        date: Date,
        confirmed: i64,
        deaths: i64,
        recovered: i64,
    ) -> Self {
        Self {
            region,
            lat,
            long,
            date,
            confirmed,
            deaths,
            recovered,
            active: active_cases(confirmed, deaths, recovered),
            mortality_rate: mortality_rate(deaths, confirmed),
        }
    }
}

/// Country-grain aggregate of observations for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySummary {
    /// Primary region name.
    pub country_region: String,
    /// Observation date.
    pub date: Date,
    /// Sum of confirmed cases over all sub-regions.
    pub confirmed: i64,
    /// Sum of deaths over all sub-regions.
    pub deaths: i64,
    /// Sum of recoveries over all sub-regions.
    pub recovered: i64,
    /// Sum of active cases over all sub-regions.
    pub active: i64,
    /// Mortality recomputed from the summed values, never averaged.
    pub mortality_rate: f64,
}

/// Full-grain observation plus day-over-day increments.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyChange {
    /// The underlying reconciled observation.
    pub observation: Observation,
    /// New confirmed cases versus the prior date; first date and downward
    /// corrections yield 0.
    pub new_confirmed: i64,
    /// New deaths versus the prior date; same clipping rules.
    pub new_deaths: i64,
    /// New recoveries versus the prior date; same clipping rules.
    pub new_recovered: i64,
}

// ============================================================================
// SECTION: Derived Metrics
// ============================================================================

/// Computes active cases; inconsistent source data may yield a negative value
/// and it is not clamped.
#[must_use]
pub const fn active_cases(confirmed: i64, deaths: i64, recovered: i64) -> i64 {
    confirmed - deaths - recovered
}

/// Computes the mortality rate in percent, guarded against division by zero.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "Counters are far below 2^52.")]
pub fn mortality_rate(deaths: i64, confirmed: i64) -> f64 {
    if confirmed > 0 {
        (deaths as f64 / confirmed as f64) * 100.0
    } else {
        0.0
    }
}

// ============================================================================
// SECTION: Column Names
// ============================================================================

/// Normalizes a source column name for persistence: lower-cased with slashes
/// and spaces replaced by underscores.
#[must_use]
pub fn sanitize_column(name: &str) -> String {
    name.to_lowercase().replace(['/', ' '], "_")
}
