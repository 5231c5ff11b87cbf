// crates/caseflow-store-sqlite/src/lib.rs
// ============================================================================
// Module: Caseflow SQLite Sink
// Description: Destination-store writer backed by SQLite.
// Purpose: Persist the three result tables with views, indexes, and audit.
// Dependencies: caseflow-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate loads the three transformed entities into SQLite with a
//! destructive-replace policy: each run drops and recreates the destination
//! tables inside one transaction that also covers view and index recreation
//! and the audit insert. The transaction commits only after every sub-step
//! succeeds; any failure rolls the whole generation back, leaving the prior
//! tables intact. The audit table accumulates across runs and is the only
//! entity with cross-run identity.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::AUDIT_TABLE;
pub use store::LoadReport;
pub use store::RunDataset;
pub use store::SinkError;
pub use store::SqliteSink;
pub use store::SqliteSinkConfig;
