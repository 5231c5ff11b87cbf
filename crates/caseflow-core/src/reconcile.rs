// crates/caseflow-core/src/reconcile.rs
// ============================================================================
// Module: Caseflow Join & Reconcile Engine
// Description: Left-join of category long tables with gap filling.
// Purpose: Produce reconciled full-grain observations with derived fields.
// Dependencies: caseflow-core model, tracing
// ============================================================================

//! ## Overview
//! Reconciliation starts from the `confirmed` long table as the backbone and
//! left-joins `deaths` and `recovered` on (country, province, date). Latitude
//! and longitude never participate in the key; confirmed's values are
//! canonical and carried through. An entirely absent category becomes a
//! constant-zero column, and any unmatched key fills with 0, so the derived
//! fields are computed over gap-free metrics. Keys present only in deaths or
//! recovered never appear in the output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use time::Date;

use crate::error::TransformError;
use crate::model::Category;
use crate::model::LongRow;
use crate::model::Observation;
use crate::model::RegionKey;

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// The reshaped category tables available to a run (0–3 present).
#[derive(Debug, Default)]
pub struct ReshapedCategories {
    /// Confirmed long rows, when the category was fetched.
    pub confirmed: Option<Vec<LongRow>>,
    /// Deaths long rows, when the category was fetched.
    pub deaths: Option<Vec<LongRow>>,
    /// Recovered long rows, when the category was fetched.
    pub recovered: Option<Vec<LongRow>>,
}

impl ReshapedCategories {
    /// Creates an empty set with no categories present.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the reshaped rows for a category.
    pub fn insert(&mut self, category: Category, rows: Vec<LongRow>) {
        match category {
            Category::Confirmed => self.confirmed = Some(rows),
            Category::Deaths => self.deaths = Some(rows),
            Category::Recovered => self.recovered = Some(rows),
        }
    }

    /// Returns true when no category is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.confirmed.is_none() && self.deaths.is_none() && self.recovered.is_none()
    }
}

// ============================================================================
// SECTION: Reconcile
// ============================================================================

/// Joins the category tables into reconciled observations.
///
/// # Errors
///
/// Returns [`TransformError::MissingConfirmed`] when the confirmed backbone
/// is absent, including the case where every category failed to arrive.
pub fn reconcile(categories: ReshapedCategories) -> Result<Vec<Observation>, TransformError> {
    let confirmed = categories.confirmed.ok_or(TransformError::MissingConfirmed)?;
    let deaths = index_metric(categories.deaths);
    let recovered = index_metric(categories.recovered);

    let mut backbone = confirmed;
    backbone.sort_by(|a, b| (&a.region, a.date).cmp(&(&b.region, b.date)));

    let mut observations = Vec::with_capacity(backbone.len());
    for row in backbone {
        let key = (row.region.clone(), row.date);
        let deaths_value = lookup(&deaths, &key);
        let recovered_value = lookup(&recovered, &key);
        observations.push(Observation::from_metrics(
            row.region,
            row.lat,
            row.long,
            row.date,
            row.value,
            deaths_value,
            recovered_value,
        ));
    }
    tracing::debug!(rows = observations.len(), "reconciled observations");
    Ok(observations)
}

/// Index type for joined metric lookup.
type MetricIndex = Option<BTreeMap<(RegionKey, Date), i64>>;

/// Builds a lookup index for an optional category table.
fn index_metric(rows: Option<Vec<LongRow>>) -> MetricIndex {
    rows.map(|rows| {
        rows.into_iter().map(|row| ((row.region, row.date), row.value)).collect()
    })
}

/// Looks up a joined metric; absent categories and unmatched keys fill as 0.
fn lookup(index: &MetricIndex, key: &(RegionKey, Date)) -> i64 {
    index.as_ref().and_then(|map| map.get(key).copied()).unwrap_or(0)
}
