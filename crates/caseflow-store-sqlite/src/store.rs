// crates/caseflow-store-sqlite/src/store.rs
// ============================================================================
// Module: Caseflow SQLite Sink Writer
// Description: Transactional destructive-replace load into SQLite.
// Purpose: Persist full-grain, summary, and delta tables plus views/indexes.
// Dependencies: caseflow-core, rusqlite, time, tracing
// ============================================================================

//! ## Overview
//! The sink holds one connection per run. `load_run` opens a single
//! transaction spanning table replacement, bulk insert, view and index
//! recreation, and the audit insert, committing only when every sub-step
//! succeeds. Readers of the destination database may observe a table briefly
//! absent between runs; that is the documented cost of the full-refresh
//! policy. A missing audit table degrades to a warning and the run still
//! succeeds, while every other failure rolls back and propagates as a
//! typed [`SinkError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use caseflow_core::CountrySummary;
use caseflow_core::DailyChange;
use caseflow_core::Observation;
use caseflow_core::dates::format_iso;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Name of the append-only audit table.
pub const AUDIT_TABLE: &str = "etl_metadata";
/// Name of the full-grain destination table.
const FULL_DATA_TABLE: &str = "full_data";
/// Name of the country summary destination table.
const COUNTRY_SUMMARY_TABLE: &str = "country_summary";
/// Name of the daily changes destination table.
const DAILY_CHANGES_TABLE: &str = "daily_changes";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the SQLite sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Sink I/O error.
    #[error("sqlite sink io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite sink db error: {0}")]
    Db(String),
    /// Invalid sink configuration or input.
    #[error("sqlite sink invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the SQLite sink.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `top_countries_limit` must be greater than zero.
#[derive(Debug, Clone)]
pub struct SqliteSinkConfig {
    /// Path to the destination database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// Row limit applied to the top-countries view.
    pub top_countries_limit: u32,
}

impl SqliteSinkConfig {
    /// Creates a config with default timeout and view limit.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            top_countries_limit: 10,
        }
    }
}

// ============================================================================
// SECTION: Run Dataset and Report
// ============================================================================

/// Borrowed view of one run's three transformed entities.
#[derive(Debug, Clone, Copy)]
pub struct RunDataset<'a> {
    /// Reconciled full-grain observations.
    pub observations: &'a [Observation],
    /// Country-grain summaries.
    pub summaries: &'a [CountrySummary],
    /// Daily change rows.
    pub changes: &'a [DailyChange],
}

/// Outcome of a committed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows loaded into the full-grain table.
    pub full_rows: usize,
    /// Rows loaded into the summary table.
    pub summary_rows: usize,
    /// Rows loaded into the daily changes table.
    pub change_rows: usize,
    /// Whether the audit row was recorded (false when the audit table is
    /// missing).
    pub audit_recorded: bool,
}

impl LoadReport {
    /// Total rows loaded across the three destination tables.
    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.full_rows + self.summary_rows + self.change_rows
    }
}

// ============================================================================
// SECTION: Sink
// ============================================================================

/// SQLite-backed sink writer for the pipeline's load stage.
#[derive(Debug)]
pub struct SqliteSink {
    /// Connection owning the per-run transactional scope.
    connection: Connection,
    /// Row limit applied to the top-countries view.
    top_countries_limit: u32,
}

impl SqliteSink {
    /// Opens the destination database, applies pragmas, and ensures the
    /// audit table exists.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Invalid`] for a directory path or zero view
    /// limit and [`SinkError::Db`] when the database cannot be opened.
    pub fn open(config: &SqliteSinkConfig) -> Result<Self, SinkError> {
        if config.path.is_dir() {
            return Err(SinkError::Invalid(format!(
                "database path is a directory: {}",
                config.path.display()
            )));
        }
        if config.top_countries_limit == 0 {
            return Err(SinkError::Invalid(
                "top_countries_limit must be greater than zero".to_string(),
            ));
        }
        let connection =
            Connection::open(&config.path).map_err(|err| SinkError::Db(err.to_string()))?;
        apply_pragmas(&connection, config)?;
        ensure_audit_table(&connection)?;
        Ok(Self {
            connection,
            top_countries_limit: config.top_countries_limit,
        })
    }

    /// Loads one run's dataset with the destructive-replace policy.
    ///
    /// The whole load (table replacement, inserts, views, indexes, and the
    /// audit insert) runs in a single transaction and commits only when
    /// every sub-step succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Db`] on any store failure; the in-flight
    /// transaction is rolled back and the prior table generation remains
    /// visible.
    pub fn load_run(&mut self, dataset: &RunDataset<'_>) -> Result<LoadReport, SinkError> {
        let limit = self.top_countries_limit;
        let tx =
            self.connection.transaction().map_err(|err| SinkError::Db(err.to_string()))?;
        replace_full_data(&tx, dataset.observations)?;
        replace_country_summary(&tx, dataset.summaries)?;
        replace_daily_changes(&tx, dataset.changes)?;
        create_views(&tx, limit)?;
        create_indexes(&tx)?;
        let report = LoadReport {
            full_rows: dataset.observations.len(),
            summary_rows: dataset.summaries.len(),
            change_rows: dataset.changes.len(),
            audit_recorded: false,
        };
        let audit_recorded = append_audit(&tx, report.total_rows())?;
        tx.commit().map_err(|err| SinkError::Db(err.to_string()))?;
        tracing::info!(
            full_rows = report.full_rows,
            summary_rows = report.summary_rows,
            change_rows = report.change_rows,
            audit_recorded,
            "load committed"
        );
        Ok(LoadReport {
            audit_recorded,
            ..report
        })
    }
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Applies the pragmas required for durability.
fn apply_pragmas(connection: &Connection, config: &SqliteSinkConfig) -> Result<(), SinkError> {
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SinkError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SinkError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA journal_mode = wal;")
        .map_err(|err| SinkError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA synchronous = full;")
        .map_err(|err| SinkError::Db(err.to_string()))?;
    Ok(())
}

/// Creates the append-only audit table when absent.
///
/// The audit table lives outside the destructive-replace scope: its rows
/// accumulate across runs.
fn ensure_audit_table(connection: &Connection) -> Result<(), SinkError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS etl_metadata (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                operation TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                details TEXT
            );",
        )
        .map_err(|err| SinkError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Table Replacement
// ============================================================================

/// Drops and recreates the full-grain table, then bulk-inserts the rows.
fn replace_full_data(tx: &Transaction<'_>, observations: &[Observation]) -> Result<(), SinkError> {
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {FULL_DATA_TABLE};
         CREATE TABLE {FULL_DATA_TABLE} (
            province_state TEXT NOT NULL,
            country_region TEXT NOT NULL,
            lat REAL,
            long REAL,
            date TEXT NOT NULL,
            confirmed INTEGER NOT NULL,
            deaths INTEGER NOT NULL,
            recovered INTEGER NOT NULL,
            active INTEGER NOT NULL,
            mortality_rate REAL,
            PRIMARY KEY (country_region, province_state, date)
         );"
    ))
    .map_err(|err| SinkError::Db(err.to_string()))?;
    let mut statement = tx
        .prepare(&format!(
            "INSERT INTO {FULL_DATA_TABLE} (province_state, country_region, lat, long, date, \
             confirmed, deaths, recovered, active, mortality_rate) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ))
        .map_err(|err| SinkError::Db(err.to_string()))?;
    for observation in observations {
        statement
            .execute(params![
                observation.region.province_state,
                observation.region.country_region,
                observation.lat,
                observation.long,
                format_iso(observation.date),
                observation.confirmed,
                observation.deaths,
                observation.recovered,
                observation.active,
                observation.mortality_rate,
            ])
            .map_err(|err| SinkError::Db(err.to_string()))?;
    }
    Ok(())
}

/// Drops and recreates the country summary table, then bulk-inserts.
fn replace_country_summary(
    tx: &Transaction<'_>,
    summaries: &[CountrySummary],
) -> Result<(), SinkError> {
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {COUNTRY_SUMMARY_TABLE};
         CREATE TABLE {COUNTRY_SUMMARY_TABLE} (
            country_region TEXT NOT NULL,
            date TEXT NOT NULL,
            confirmed INTEGER NOT NULL,
            deaths INTEGER NOT NULL,
            recovered INTEGER NOT NULL,
            active INTEGER NOT NULL,
            mortality_rate REAL,
            PRIMARY KEY (country_region, date)
         );"
    ))
    .map_err(|err| SinkError::Db(err.to_string()))?;
    let mut statement = tx
        .prepare(&format!(
            "INSERT INTO {COUNTRY_SUMMARY_TABLE} (country_region, date, confirmed, deaths, \
             recovered, active, mortality_rate) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ))
        .map_err(|err| SinkError::Db(err.to_string()))?;
    for summary in summaries {
        statement
            .execute(params![
                summary.country_region,
                format_iso(summary.date),
                summary.confirmed,
                summary.deaths,
                summary.recovered,
                summary.active,
                summary.mortality_rate,
            ])
            .map_err(|err| SinkError::Db(err.to_string()))?;
    }
    Ok(())
}

/// Drops and recreates the daily changes table, then bulk-inserts.
fn replace_daily_changes(tx: &Transaction<'_>, changes: &[DailyChange]) -> Result<(), SinkError> {
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {DAILY_CHANGES_TABLE};
         CREATE TABLE {DAILY_CHANGES_TABLE} (
            province_state TEXT NOT NULL,
            country_region TEXT NOT NULL,
            lat REAL,
            long REAL,
            date TEXT NOT NULL,
            confirmed INTEGER NOT NULL,
            deaths INTEGER NOT NULL,
            recovered INTEGER NOT NULL,
            active INTEGER NOT NULL,
            mortality_rate REAL,
            new_confirmed INTEGER NOT NULL,
            new_deaths INTEGER NOT NULL,
            new_recovered INTEGER NOT NULL,
            PRIMARY KEY (country_region, province_state, date)
         );"
    ))
    .map_err(|err| SinkError::Db(err.to_string()))?;
    let mut statement = tx
        .prepare(&format!(
            "INSERT INTO {DAILY_CHANGES_TABLE} (province_state, country_region, lat, long, date, \
             confirmed, deaths, recovered, active, mortality_rate, new_confirmed, new_deaths, \
             new_recovered) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ))
        .map_err(|err| SinkError::Db(err.to_string()))?;
    for change in changes {
        let observation = &change.observation;
        statement
            .execute(params![
                observation.region.province_state,
                observation.region.country_region,
                observation.lat,
                observation.long,
                format_iso(observation.date),
                observation.confirmed,
                observation.deaths,
                observation.recovered,
                observation.active,
                observation.mortality_rate,
                change.new_confirmed,
                change.new_deaths,
                change.new_recovered,
            ])
            .map_err(|err| SinkError::Db(err.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Views and Indexes
// ============================================================================

/// Recreates the three analytical views (replace-if-exists).
fn create_views(tx: &Transaction<'_>, top_countries_limit: u32) -> Result<(), SinkError> {
    tx.execute_batch(&format!(
        "DROP VIEW IF EXISTS vw_latest_global_summary;
         CREATE VIEW vw_latest_global_summary AS
         SELECT
             SUM(confirmed) AS total_confirmed,
             SUM(deaths) AS total_deaths,
             SUM(recovered) AS total_recovered,
             SUM(active) AS total_active,
             (CAST(SUM(deaths) AS REAL) / NULLIF(CAST(SUM(confirmed) AS REAL), 0)) * 100
                 AS global_mortality_rate
         FROM {COUNTRY_SUMMARY_TABLE}
         WHERE date = (SELECT MAX(date) FROM {COUNTRY_SUMMARY_TABLE});

         DROP VIEW IF EXISTS vw_top_countries;
         CREATE VIEW vw_top_countries AS
         SELECT
             country_region AS country,
             confirmed,
             deaths,
             recovered,
             active,
             mortality_rate
         FROM {COUNTRY_SUMMARY_TABLE}
         WHERE date = (SELECT MAX(date) FROM {COUNTRY_SUMMARY_TABLE})
         ORDER BY confirmed DESC
         LIMIT {top_countries_limit};

         DROP VIEW IF EXISTS vw_global_daily;
         CREATE VIEW vw_global_daily AS
         SELECT
             date,
             SUM(confirmed) AS total_confirmed,
             SUM(deaths) AS total_deaths,
             SUM(recovered) AS total_recovered,
             SUM(active) AS total_active,
             SUM(new_confirmed) AS new_confirmed,
             SUM(new_deaths) AS new_deaths,
             SUM(new_recovered) AS new_recovered
         FROM {DAILY_CHANGES_TABLE}
         GROUP BY date
         ORDER BY date;"
    ))
    .map_err(|err| SinkError::Db(err.to_string()))
}

/// Creates the secondary indexes (create-if-absent).
fn create_indexes(tx: &Transaction<'_>) -> Result<(), SinkError> {
    tx.execute_batch(&format!(
        "CREATE INDEX IF NOT EXISTS idx_full_country ON {FULL_DATA_TABLE}(country_region);
         CREATE INDEX IF NOT EXISTS idx_full_date ON {FULL_DATA_TABLE}(date);
         CREATE INDEX IF NOT EXISTS idx_summary_date ON {COUNTRY_SUMMARY_TABLE}(date);
         CREATE INDEX IF NOT EXISTS idx_changes_country ON {DAILY_CHANGES_TABLE}(country_region);
         CREATE INDEX IF NOT EXISTS idx_changes_date ON {DAILY_CHANGES_TABLE}(date);"
    ))
    .map_err(|err| SinkError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Appends the load audit row when the audit table exists.
///
/// A missing audit table degrades to a warning; the load still succeeds.
fn append_audit(tx: &Transaction<'_>, rows_loaded: usize) -> Result<bool, SinkError> {
    let exists: Option<String> = tx
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![AUDIT_TABLE],
            |row| row.get(0),
        )
        .optional()
        .map_err(|err| SinkError::Db(err.to_string()))?;
    if exists.is_none() {
        tracing::warn!("audit table {AUDIT_TABLE} is missing; skipping audit insert");
        return Ok(false);
    }
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| SinkError::Io(err.to_string()))?;
    tx.execute(
        &format!("INSERT INTO {AUDIT_TABLE} (operation, timestamp, details) VALUES (?1, ?2, ?3)"),
        params!["load", timestamp, format!("total rows loaded: {rows_loaded}")],
    )
    .map_err(|err| SinkError::Db(err.to_string()))?;
    Ok(true)
}
