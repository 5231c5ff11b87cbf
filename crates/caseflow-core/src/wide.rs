// crates/caseflow-core/src/wide.rs
// ============================================================================
// Module: Caseflow Wide Tables
// Description: Parsing of wide-format source CSVs into typed tables.
// Purpose: Validate identity columns and date headers before reshape.
// Dependencies: csv, time
// ============================================================================

//! ## Overview
//! A wide table has one row per region and one column per observation date,
//! holding a single metric category. The first four columns are the fixed
//! identity set ([`crate::model::IDENTITY_HEADERS`]); every remaining column
//! header must parse as an `M/D/YY` date or the whole category fails. An
//! empty metric cell parses as 0, which keeps the confirmed backbone
//! gap-free the way the original source data relies on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;

use time::Date;

use crate::dates::parse_wide_date;
use crate::error::TransformError;
use crate::model::Category;
use crate::model::IDENTITY_HEADERS;
use crate::model::RegionKey;

// ============================================================================
// SECTION: Wide Table
// ============================================================================

/// One source row of a wide table.
///
/// # Invariants
/// - `values.len()` equals the owning table's `dates.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    /// Region identity with the sub-region already normalized.
    pub region: RegionKey,
    /// Latitude attribute.
    pub lat: f64,
    /// Longitude attribute.
    pub long: f64,
    /// One cumulative value per date column, in header order.
    pub values: Vec<i64>,
}

/// A parsed wide-format table for a single metric category.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    /// Metric category this table carries.
    pub category: Category,
    /// Parsed observation dates, in header order.
    pub dates: Vec<Date>,
    /// Source rows, one per region.
    pub rows: Vec<WideRow>,
}

impl WideTable {
    /// Parses a wide-format CSV for the given category.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Header`] when the identity columns or any
    /// date header are malformed, [`TransformError::Cell`] for unparseable
    /// data cells, and [`TransformError::Csv`] for low-level decoding
    /// failures (including ragged rows).
    pub fn parse<R: Read>(category: Category, reader: R) -> Result<Self, TransformError> {
        let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|err| TransformError::Csv(err.to_string()))?
            .clone();
        if headers.len() < IDENTITY_HEADERS.len() {
            return Err(TransformError::Header {
                category,
                detail: format!(
                    "expected at least {} identity columns, found {}",
                    IDENTITY_HEADERS.len(),
                    headers.len()
                ),
            });
        }
        for (index, expected) in IDENTITY_HEADERS.iter().enumerate() {
            let found = headers.get(index).unwrap_or_default();
            if found != *expected {
                return Err(TransformError::Header {
                    category,
                    detail: format!(
                        "identity column {index} must be '{expected}', found '{found}'"
                    ),
                });
            }
        }
        let mut dates = Vec::with_capacity(headers.len() - IDENTITY_HEADERS.len());
        for header in headers.iter().skip(IDENTITY_HEADERS.len()) {
            let date = parse_wide_date(header)
                .map_err(|detail| TransformError::Header { category, detail })?;
            dates.push(date);
        }
        let mut rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|err| TransformError::Csv(err.to_string()))?;
            // Header occupies line 1; data rows start at line 2.
            let line = index + 2;
            rows.push(parse_row(category, line, &record, dates.len())?);
        }
        Ok(Self {
            category,
            dates,
            rows,
        })
    }
}

// ============================================================================
// SECTION: Row Parsing
// ============================================================================

/// Parses one data record into a [`WideRow`].
fn parse_row(
    category: Category,
    line: usize,
    record: &csv::StringRecord,
    date_count: usize,
) -> Result<WideRow, TransformError> {
    let province = record.get(0).unwrap_or_default();
    let country = record.get(1).unwrap_or_default().trim();
    if country.is_empty() {
        return Err(TransformError::Cell {
            category,
            line,
            detail: "primary region name is empty".to_string(),
        });
    }
    let lat = parse_coordinate(category, line, record.get(2).unwrap_or_default())?;
    let long = parse_coordinate(category, line, record.get(3).unwrap_or_default())?;
    let mut values = Vec::with_capacity(date_count);
    for cell in record.iter().skip(IDENTITY_HEADERS.len()) {
        values.push(parse_value(category, line, cell)?);
    }
    Ok(WideRow {
        region: RegionKey::new(country, province),
        lat,
        long,
        values,
    })
}

/// Parses a latitude/longitude cell; blank cells default to 0.0.
fn parse_coordinate(category: Category, line: usize, cell: &str) -> Result<f64, TransformError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse().map_err(|_| TransformError::Cell {
        category,
        line,
        detail: format!("invalid coordinate '{trimmed}'"),
    })
}

/// Parses a cumulative metric cell; blank cells default to 0.
fn parse_value(category: Category, line: usize, cell: &str) -> Result<i64, TransformError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| TransformError::Cell {
        category,
        line,
        detail: format!("invalid cumulative value '{trimmed}'"),
    })
}
