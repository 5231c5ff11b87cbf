// crates/caseflow-core/src/records.rs
// ============================================================================
// Module: Caseflow Processed Records
// Description: Long-format CSV encoding and decoding for pipeline outputs.
// Purpose: Persist and reload the three processed entities deterministically.
// Dependencies: csv, time
// ============================================================================

//! ## Overview
//! The transform stage writes three processed CSVs (full grain, country
//! summary, daily changes) and the load stage reads them back. Column names
//! are the persisted forms: lower-cased with slashes and spaces replaced by
//! underscores ([`sanitize_column`]). Dates are `YYYY-MM-DD`. Encoding is
//! deterministic: identical inputs produce byte-identical files, which is
//! what makes rerunning the pipeline idempotent.
//!
//! Readers reconstruct rows from the stored values as-is; derived fields are
//! not recomputed on read, so a standalone load stage stays faithful to the
//! file contents.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;

use crate::dates::format_iso;
use crate::dates::parse_iso_date;
use crate::error::TransformError;
use crate::model::CountrySummary;
use crate::model::DailyChange;
use crate::model::IDENTITY_HEADERS;
use crate::model::Observation;
use crate::model::RegionKey;
use crate::model::sanitize_column;

// ============================================================================
// SECTION: Headers
// ============================================================================

/// Metric and derived column names shared by full grain and daily changes.
const METRIC_COLUMNS: [&str; 6] =
    ["date", "confirmed", "deaths", "recovered", "active", "mortality_rate"];

/// Increment column names specific to daily changes.
const INCREMENT_COLUMNS: [&str; 3] = ["new_confirmed", "new_deaths", "new_recovered"];

/// Returns the persisted header row for the full-grain file.
#[must_use]
pub fn full_data_headers() -> Vec<String> {
    let mut headers: Vec<String> =
        IDENTITY_HEADERS.iter().map(|name| sanitize_column(name)).collect();
    headers.extend(METRIC_COLUMNS.iter().map(|name| (*name).to_string()));
    headers
}

/// Returns the persisted header row for the country summary file.
#[must_use]
pub fn country_summary_headers() -> Vec<String> {
    let mut headers = vec![sanitize_column("Country/Region")];
    headers.extend(METRIC_COLUMNS.iter().map(|name| (*name).to_string()));
    headers
}

/// Returns the persisted header row for the daily changes file.
#[must_use]
pub fn daily_changes_headers() -> Vec<String> {
    let mut headers = full_data_headers();
    headers.extend(INCREMENT_COLUMNS.iter().map(|name| (*name).to_string()));
    headers
}

// ============================================================================
// SECTION: Writers
// ============================================================================

/// Writes the full-grain observations as a processed CSV.
///
/// # Errors
///
/// Returns [`TransformError::Csv`] when the writer fails.
pub fn write_full_data<W: Write>(
    writer: W,
    observations: &[Observation],
) -> Result<(), TransformError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    write_record(&mut csv_writer, &full_data_headers())?;
    for observation in observations {
        write_record(&mut csv_writer, &observation_fields(observation))?;
    }
    csv_writer.flush().map_err(|err| TransformError::Csv(err.to_string()))
}

/// Writes the country summaries as a processed CSV.
///
/// # Errors
///
/// Returns [`TransformError::Csv`] when the writer fails.
pub fn write_country_summary<W: Write>(
    writer: W,
    summaries: &[CountrySummary],
) -> Result<(), TransformError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    write_record(&mut csv_writer, &country_summary_headers())?;
    for summary in summaries {
        write_record(&mut csv_writer, &[
            summary.country_region.clone(),
            format_iso(summary.date),
            summary.confirmed.to_string(),
            summary.deaths.to_string(),
            summary.recovered.to_string(),
            summary.active.to_string(),
            summary.mortality_rate.to_string(),
        ])?;
    }
    csv_writer.flush().map_err(|err| TransformError::Csv(err.to_string()))
}

/// Writes the daily changes as a processed CSV.
///
/// # Errors
///
/// Returns [`TransformError::Csv`] when the writer fails.
pub fn write_daily_changes<W: Write>(
    writer: W,
    changes: &[DailyChange],
) -> Result<(), TransformError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    write_record(&mut csv_writer, &daily_changes_headers())?;
    for change in changes {
        let mut fields = observation_fields(&change.observation);
        fields.push(change.new_confirmed.to_string());
        fields.push(change.new_deaths.to_string());
        fields.push(change.new_recovered.to_string());
        write_record(&mut csv_writer, &fields)?;
    }
    csv_writer.flush().map_err(|err| TransformError::Csv(err.to_string()))
}

/// Serializes one observation into its persisted field order.
fn observation_fields(observation: &Observation) -> Vec<String> {
    vec![
        observation.region.province_state.clone(),
        observation.region.country_region.clone(),
        observation.lat.to_string(),
        observation.long.to_string(),
        format_iso(observation.date),
        observation.confirmed.to_string(),
        observation.deaths.to_string(),
        observation.recovered.to_string(),
        observation.active.to_string(),
        observation.mortality_rate.to_string(),
    ]
}

/// Writes one record, mapping writer failures to [`TransformError::Csv`].
fn write_record<W: Write>(
    csv_writer: &mut csv::Writer<W>,
    fields: &[String],
) -> Result<(), TransformError> {
    csv_writer.write_record(fields).map_err(|err| TransformError::Csv(err.to_string()))
}

// ============================================================================
// SECTION: Readers
// ============================================================================

/// Reads a processed full-grain CSV back into observations.
///
/// # Errors
///
/// Returns [`TransformError::Record`] for header or field mismatches and
/// [`TransformError::Csv`] for decoding failures.
pub fn read_full_data<R: Read>(reader: R) -> Result<Vec<Observation>, TransformError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    expect_headers(&mut csv_reader, &full_data_headers())?;
    let mut observations = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|err| TransformError::Csv(err.to_string()))?;
        observations.push(parse_observation(&record, 0)?);
    }
    Ok(observations)
}

/// Reads a processed country summary CSV back into summaries.
///
/// # Errors
///
/// Returns [`TransformError::Record`] for header or field mismatches and
/// [`TransformError::Csv`] for decoding failures.
pub fn read_country_summary<R: Read>(reader: R) -> Result<Vec<CountrySummary>, TransformError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    expect_headers(&mut csv_reader, &country_summary_headers())?;
    let mut summaries = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|err| TransformError::Csv(err.to_string()))?;
        summaries.push(CountrySummary {
            country_region: field(&record, 0)?.to_string(),
            date: parse_iso_date(field(&record, 1)?).map_err(TransformError::Record)?,
            confirmed: parse_int(&record, 2)?,
            deaths: parse_int(&record, 3)?,
            recovered: parse_int(&record, 4)?,
            active: parse_int(&record, 5)?,
            mortality_rate: parse_float(&record, 6)?,
        });
    }
    Ok(summaries)
}

/// Reads a processed daily changes CSV back into delta rows.
///
/// # Errors
///
/// Returns [`TransformError::Record`] for header or field mismatches and
/// [`TransformError::Csv`] for decoding failures.
pub fn read_daily_changes<R: Read>(reader: R) -> Result<Vec<DailyChange>, TransformError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    expect_headers(&mut csv_reader, &daily_changes_headers())?;
    let mut changes = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|err| TransformError::Csv(err.to_string()))?;
        changes.push(DailyChange {
            observation: parse_observation(&record, 0)?,
            new_confirmed: parse_int(&record, 10)?,
            new_deaths: parse_int(&record, 11)?,
            new_recovered: parse_int(&record, 12)?,
        });
    }
    Ok(changes)
}

/// Validates that the file's header row matches the expected persisted form.
fn expect_headers<R: Read>(
    csv_reader: &mut csv::Reader<R>,
    expected: &[String],
) -> Result<(), TransformError> {
    let headers = csv_reader.headers().map_err(|err| TransformError::Csv(err.to_string()))?;
    let found: Vec<&str> = headers.iter().collect();
    if found != expected.iter().map(String::as_str).collect::<Vec<&str>>() {
        return Err(TransformError::Record(format!(
            "unexpected header row {found:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

/// Parses an observation from the persisted field order starting at `base`.
fn parse_observation(
    record: &csv::StringRecord,
    base: usize,
) -> Result<Observation, TransformError> {
    Ok(Observation {
        region: RegionKey {
            province_state: field(record, base)?.to_string(),
            country_region: field(record, base + 1)?.to_string(),
        },
        lat: parse_float(record, base + 2)?,
        long: parse_float(record, base + 3)?,
        date: parse_iso_date(field(record, base + 4)?).map_err(TransformError::Record)?,
        confirmed: parse_int(record, base + 5)?,
        deaths: parse_int(record, base + 6)?,
        recovered: parse_int(record, base + 7)?,
        active: parse_int(record, base + 8)?,
        mortality_rate: parse_float(record, base + 9)?,
    })
}

/// Returns a record field or a [`TransformError::Record`] when absent.
fn field(record: &csv::StringRecord, index: usize) -> Result<&str, TransformError> {
    record
        .get(index)
        .ok_or_else(|| TransformError::Record(format!("missing field at index {index}")))
}

/// Parses an integer field.
fn parse_int(record: &csv::StringRecord, index: usize) -> Result<i64, TransformError> {
    let raw = field(record, index)?;
    raw.parse()
        .map_err(|_| TransformError::Record(format!("invalid integer '{raw}' at index {index}")))
}

/// Parses a float field.
fn parse_float(record: &csv::StringRecord, index: usize) -> Result<f64, TransformError> {
    let raw = field(record, index)?;
    raw.parse()
        .map_err(|_| TransformError::Record(format!("invalid float '{raw}' at index {index}")))
}
