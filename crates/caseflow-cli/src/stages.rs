// crates/caseflow-cli/src/stages.rs
// ============================================================================
// Module: Caseflow Stage Drivers
// Description: Filesystem-facing drivers for extract, transform, and load.
// Purpose: Move data between raw files, processed files, and the store.
// Dependencies: caseflow-config, caseflow-core, caseflow-fetch, caseflow-store-sqlite
// ============================================================================

//! ## Overview
//! Each driver is a standalone stage entry point taking the explicit
//! [`PipelineConfig`] value; there is no process-wide configuration state.
//! The transform driver reads whichever raw category files are present
//! (absent categories were already logged and skipped by extraction), runs
//! the four engines, writes the three processed CSVs deterministically, and
//! records the transformation metadata. The load driver reads the processed
//! files back and hands them to the SQLite sink in one transactional load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use caseflow_config::PipelineConfig;
use caseflow_core::Category;
use caseflow_core::CountrySummary;
use caseflow_core::DailyChange;
use caseflow_core::Observation;
use caseflow_core::ReshapedCategories;
use caseflow_core::WideTable;
use caseflow_core::aggregate_by_country;
use caseflow_core::daily_changes;
use caseflow_core::dates::format_iso;
use caseflow_core::reconcile;
use caseflow_core::records;
use caseflow_core::reshape;
use caseflow_core::run_quality_checks;
use caseflow_fetch::FetchReport;
use caseflow_fetch::SourceFetcher;
use caseflow_fetch::SourceSpec;
use caseflow_store_sqlite::LoadReport;
use caseflow_store_sqlite::RunDataset;
use caseflow_store_sqlite::SqliteSink;
use caseflow_store_sqlite::SqliteSinkConfig;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::PipelineError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Processed full-grain filename.
pub const FULL_DATA_FILE: &str = "full_data.csv";
/// Processed country summary filename.
pub const COUNTRY_SUMMARY_FILE: &str = "country_summary.csv";
/// Processed daily changes filename.
pub const DAILY_CHANGES_FILE: &str = "daily_changes.csv";
/// Transformation metadata filename.
pub const TRANSFORMATION_METADATA_FILE: &str = "transformation_metadata.txt";

// ============================================================================
// SECTION: Extract
// ============================================================================

/// Runs the extraction stage: downloads the three categories into the raw
/// directory and records the extraction metadata.
///
/// # Errors
///
/// Returns [`PipelineError::Extract`] when the fetcher cannot be built or
/// the raw directory/metadata record cannot be written. Per-category
/// failures are reported inside the [`FetchReport`].
pub fn run_extract(config: &PipelineConfig) -> Result<FetchReport, PipelineError> {
    let fetcher = SourceFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .map_err(|err| PipelineError::Extract(err.to_string()))?;
    let sources = [
        SourceSpec {
            category: Category::Confirmed,
            url: config.sources.confirmed.clone(),
        },
        SourceSpec {
            category: Category::Deaths,
            url: config.sources.deaths.clone(),
        },
        SourceSpec {
            category: Category::Recovered,
            url: config.sources.recovered.clone(),
        },
    ];
    let report = fetcher
        .fetch_all(&sources, &config.raw_data_dir)
        .map_err(|err| PipelineError::Extract(err.to_string()))?;
    tracing::info!(
        succeeded = report.succeeded.len(),
        attempted = report.attempted,
        "extraction finished"
    );
    Ok(report)
}

// ============================================================================
// SECTION: Transform
// ============================================================================

/// Facts recorded about one transform run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSummary {
    /// Full-grain rows produced.
    pub records: usize,
    /// Distinct primary regions in the output.
    pub countries: usize,
    /// Minimum and maximum observation dates, when any rows exist.
    pub date_range: Option<(time::Date, time::Date)>,
}

/// Runs the transform stage: reshape, reconcile, aggregate, difference,
/// quality-check, and write the processed files.
///
/// # Errors
///
/// Returns [`PipelineError::Transform`] on malformed input (hard abort per
/// category), a missing confirmed backbone, or intermediate-file I/O
/// failures. Quality findings are logged as warnings and never fail the
/// stage.
pub fn run_transform(config: &PipelineConfig) -> Result<TransformSummary, PipelineError> {
    fs::create_dir_all(&config.processed_data_dir)
        .map_err(|err| PipelineError::Transform(err.to_string()))?;

    let mut categories = ReshapedCategories::new();
    for category in Category::ALL {
        let path = config.raw_data_dir.join(format!("{category}.csv"));
        if !path.exists() {
            tracing::warn!(category = %category, path = %path.display(), "raw file not found");
            continue;
        }
        let file = File::open(&path).map_err(|err| PipelineError::Transform(err.to_string()))?;
        let table = WideTable::parse(category, BufReader::new(file))
            .map_err(|err| PipelineError::Transform(err.to_string()))?;
        categories.insert(category, reshape(&table));
    }

    let observations =
        reconcile(categories).map_err(|err| PipelineError::Transform(err.to_string()))?;
    let summaries = aggregate_by_country(&observations);
    let changes = daily_changes(&observations);

    for finding in run_quality_checks(&observations, &summaries, &changes) {
        tracing::warn!(check = finding.check, detail = %finding.detail, "quality finding");
    }

    write_processed(&config.processed_data_dir, &observations, &summaries, &changes)?;
    let summary = summarize(&observations);
    write_transform_metadata(&config.processed_data_dir, &summary)?;
    tracing::info!(
        records = summary.records,
        countries = summary.countries,
        "transformation finished"
    );
    Ok(summary)
}

/// Writes the three processed CSVs deterministically.
fn write_processed(
    processed_dir: &Path,
    observations: &[Observation],
    summaries: &[CountrySummary],
    changes: &[DailyChange],
) -> Result<(), PipelineError> {
    let full = File::create(processed_dir.join(FULL_DATA_FILE))
        .map_err(|err| PipelineError::Transform(err.to_string()))?;
    records::write_full_data(BufWriter::new(full), observations)
        .map_err(|err| PipelineError::Transform(err.to_string()))?;

    let summary = File::create(processed_dir.join(COUNTRY_SUMMARY_FILE))
        .map_err(|err| PipelineError::Transform(err.to_string()))?;
    records::write_country_summary(BufWriter::new(summary), summaries)
        .map_err(|err| PipelineError::Transform(err.to_string()))?;

    let daily = File::create(processed_dir.join(DAILY_CHANGES_FILE))
        .map_err(|err| PipelineError::Transform(err.to_string()))?;
    records::write_daily_changes(BufWriter::new(daily), changes)
        .map_err(|err| PipelineError::Transform(err.to_string()))?;
    Ok(())
}

/// Collects the transform metadata facts from the full-grain output.
fn summarize(observations: &[Observation]) -> TransformSummary {
    let mut countries: Vec<&str> = observations
        .iter()
        .map(|observation| observation.region.country_region.as_str())
        .collect();
    countries.sort_unstable();
    countries.dedup();
    let mut date_range = None;
    for observation in observations {
        date_range = Some(match date_range {
            None => (observation.date, observation.date),
            Some((min, max)) => {
                (observation.date.min(min), observation.date.max(max))
            }
        });
    }
    TransformSummary {
        records: observations.len(),
        countries: countries.len(),
        date_range,
    }
}

/// Writes the transformation metadata record, one `key: value` line each.
fn write_transform_metadata(
    processed_dir: &Path,
    summary: &TransformSummary,
) -> Result<(), PipelineError> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| PipelineError::Io(err.to_string()))?;
    let path = processed_dir.join(TRANSFORMATION_METADATA_FILE);
    let mut file =
        File::create(&path).map_err(|err| PipelineError::Transform(err.to_string()))?;
    writeln!(file, "transformation_timestamp: {timestamp}")
        .map_err(|err| PipelineError::Transform(err.to_string()))?;
    writeln!(file, "total_records: {}", summary.records)
        .map_err(|err| PipelineError::Transform(err.to_string()))?;
    writeln!(file, "countries_included: {}", summary.countries)
        .map_err(|err| PipelineError::Transform(err.to_string()))?;
    let range = summary.date_range.map_or_else(
        || "none".to_string(),
        |(min, max)| format!("{} to {}", format_iso(min), format_iso(max)),
    );
    writeln!(file, "date_range: {range}")
        .map_err(|err| PipelineError::Transform(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Load
// ============================================================================

/// Runs the load stage: reads the processed files back and performs the
/// transactional destructive-replace load.
///
/// # Errors
///
/// Returns [`PipelineError::Transform`] when a processed file is missing or
/// malformed and [`PipelineError::Store`] when the sink fails; in the latter
/// case the in-flight transaction was rolled back.
pub fn run_load(config: &PipelineConfig) -> Result<LoadReport, PipelineError> {
    let observations =
        read_processed(&config.processed_data_dir, FULL_DATA_FILE, records::read_full_data)?;
    let summaries = read_processed(
        &config.processed_data_dir,
        COUNTRY_SUMMARY_FILE,
        records::read_country_summary,
    )?;
    let changes =
        read_processed(&config.processed_data_dir, DAILY_CHANGES_FILE, records::read_daily_changes)?;

    let sink_config = SqliteSinkConfig {
        top_countries_limit: config.top_countries_limit,
        ..SqliteSinkConfig::new(&config.database_path)
    };
    let mut sink =
        SqliteSink::open(&sink_config).map_err(|err| PipelineError::Store(err.to_string()))?;
    let report = sink
        .load_run(&RunDataset {
            observations: &observations,
            summaries: &summaries,
            changes: &changes,
        })
        .map_err(|err| PipelineError::Store(err.to_string()))?;
    tracing::info!(rows = report.total_rows(), "load finished");
    Ok(report)
}

/// Opens and decodes one processed file with the given reader function.
fn read_processed<T>(
    processed_dir: &Path,
    name: &str,
    read: impl FnOnce(BufReader<File>) -> Result<T, caseflow_core::TransformError>,
) -> Result<T, PipelineError> {
    let path = processed_dir.join(name);
    let file = File::open(&path).map_err(|err| {
        PipelineError::Transform(format!("processed file {}: {err}", path.display()))
    })?;
    read(BufReader::new(file)).map_err(|err| PipelineError::Transform(err.to_string()))
}
