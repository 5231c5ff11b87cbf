// crates/caseflow-core/src/dates.rs
// ============================================================================
// Module: Caseflow Dates
// Description: Calendar date parsing and formatting for pipeline data.
// Purpose: Convert fixed-format source headers and ISO dates to time::Date.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Source wide tables carry date column headers in a fixed external `M/D/YY`
//! format (month and day unpadded, two-digit year). A header that does not
//! parse aborts the whole category. Processed files and the destination
//! store use `YYYY-MM-DD`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Date;
use time::Month;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Century applied to two-digit source years.
const SOURCE_CENTURY: i32 = 2000;

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a wide-table date header in the fixed `M/D/YY` format.
///
/// # Errors
///
/// Returns a description of the defect when the header does not match the
/// fixed format or names an impossible calendar date.
pub fn parse_wide_date(header: &str) -> Result<Date, String> {
    let mut parts = header.trim().split('/');
    let month = parts.next().ok_or_else(|| format!("empty date header '{header}'"))?;
    let day = parts.next().ok_or_else(|| format!("missing day in date header '{header}'"))?;
    let year = parts.next().ok_or_else(|| format!("missing year in date header '{header}'"))?;
    if parts.next().is_some() {
        return Err(format!("too many components in date header '{header}'"));
    }
    let month: u8 = month
        .parse()
        .map_err(|_| format!("invalid month '{month}' in date header '{header}'"))?;
    let month = Month::try_from(month)
        .map_err(|_| format!("month out of range in date header '{header}'"))?;
    let day: u8 =
        day.parse().map_err(|_| format!("invalid day '{day}' in date header '{header}'"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| format!("invalid year '{year}' in date header '{header}'"))?;
    if !(0..100).contains(&year) {
        return Err(format!("year must be two digits in date header '{header}'"));
    }
    Date::from_calendar_date(SOURCE_CENTURY + year, month, day)
        .map_err(|err| format!("impossible date header '{header}': {err}"))
}

/// Parses a `YYYY-MM-DD` date from a processed file or store row.
///
/// # Errors
///
/// Returns a description of the defect when the text is not a valid ISO date.
pub fn parse_iso_date(text: &str) -> Result<Date, String> {
    let mut parts = text.trim().split('-');
    let year = parts.next().ok_or_else(|| format!("empty date '{text}'"))?;
    let month = parts.next().ok_or_else(|| format!("missing month in date '{text}'"))?;
    let day = parts.next().ok_or_else(|| format!("missing day in date '{text}'"))?;
    if parts.next().is_some() {
        return Err(format!("too many components in date '{text}'"));
    }
    let year: i32 = year.parse().map_err(|_| format!("invalid year in date '{text}'"))?;
    let month: u8 = month.parse().map_err(|_| format!("invalid month in date '{text}'"))?;
    let month = Month::try_from(month).map_err(|_| format!("month out of range in '{text}'"))?;
    let day: u8 = day.parse().map_err(|_| format!("invalid day in date '{text}'"))?;
    Date::from_calendar_date(year, month, day).map_err(|err| format!("invalid date '{text}': {err}"))
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats a date as `YYYY-MM-DD` for processed files and the store.
#[must_use]
pub fn format_iso(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}
