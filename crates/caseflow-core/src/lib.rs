// crates/caseflow-core/src/lib.rs
// ============================================================================
// Module: Caseflow Core
// Description: Data model and transform engines for epidemiological ETL runs.
// Purpose: Provide pure reshape/reconcile/aggregate/delta logic with no I/O.
// Dependencies: csv, thiserror, time, tracing
// ============================================================================

//! ## Overview
//! This crate holds the Caseflow data model and the four transform engines:
//! wide-to-long reshape, multi-category join and reconciliation, country-level
//! aggregation, and day-over-day differencing. All functions operate on
//! in-memory values and generic readers/writers; filesystem and network
//! access live in the sibling crates. Every run recomputes these entities
//! from scratch (full refresh); nothing here carries identity across runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregate;
pub mod dates;
pub mod delta;
pub mod error;
pub mod model;
pub mod quality;
pub mod reconcile;
pub mod records;
pub mod reshape;
pub mod wide;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregate::aggregate_by_country;
pub use delta::daily_changes;
pub use error::TransformError;
pub use model::Category;
pub use model::CountrySummary;
pub use model::DailyChange;
pub use model::LongRow;
pub use model::Observation;
pub use model::RegionKey;
pub use model::UNKNOWN_PROVINCE;
pub use quality::QualityFinding;
pub use quality::run_quality_checks;
pub use reconcile::ReshapedCategories;
pub use reconcile::reconcile;
pub use reshape::reshape;
pub use wide::WideRow;
pub use wide::WideTable;
