//! CSV ingest and normalization for transit-card exports.
//!
//! Turns the raw export into the analysis-ready [`Trip`] table: parses the
//! fixed timestamp format, remaps zone-code locations, strips currency
//! decoration from the amount, and derives the temporal columns. Loading is
//! strict: a malformed export is rejected wholesale rather than dropping
//! rows.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::debug;

use crate::error::LoadError;
use crate::model::{DATE_FORMAT, LOCATION_SYNONYMS, RawRecord, Trip};

const REQUIRED_COLUMNS: [&str; 4] = ["Date", "Location", "Amount", "Transit Agency"];

/// Loads and normalizes a card export from a CSV file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Trip>, LoadError> {
    let file = File::open(path.as_ref())?;
    normalize(csv::Reader::from_reader(file))
}

/// Normalizes a raw export into the trip table, one [`Trip`] per row.
///
/// Output ordering is unspecified; callers that need chronology must sort.
///
/// # Errors
///
/// Fails the whole load if a required column is missing or any row's date
/// or amount does not parse.
pub fn normalize<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Trip>, LoadError> {
    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut trips = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        let raw: RawRecord = result?;
        // Row numbering counts the header line, matching what a user sees
        // in the file.
        trips.push(normalize_record(&raw, idx + 2)?);
    }

    debug!(rows = trips.len(), "export normalized");
    Ok(trips)
}

fn normalize_record(raw: &RawRecord, row: usize) -> Result<Trip, LoadError> {
    let date =
        NaiveDateTime::parse_from_str(&raw.date, DATE_FORMAT).map_err(|_| LoadError::InvalidDate {
            row,
            value: raw.date.clone(),
        })?;

    let amount_clean = parse_amount(&raw.amount).ok_or_else(|| LoadError::InvalidAmount {
        row,
        value: raw.amount.clone(),
    })?;

    Ok(Trip {
        location: remap_location(&raw.location),
        amount: raw.amount.clone(),
        amount_clean,
        agency: raw.agency.clone(),
        day_of_week: date.weekday(),
        hour: date.hour(),
        month: date.format("%Y-%m").to_string(),
        week: date.iso_week().week(),
        year: date.year(),
        date_only: date.date(),
        date,
    })
}

/// Applies the zone-code synonym table. Unmapped names pass through, so the
/// remap is idempotent.
pub fn remap_location(location: &str) -> String {
    for (code, name) in LOCATION_SYNONYMS {
        if location == *code {
            return (*name).to_string();
        }
    }
    location.to_string()
}

/// Strips `-` and `$` and parses the remainder as a non-negative fare.
fn parse_amount(raw: &str) -> Option<f64> {
    let stripped: String = raw.chars().filter(|c| *c != '-' && *c != '$').collect();
    let value: f64 = stripped.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
