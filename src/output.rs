//! Output formatting for analysis results and filtered exports.
//!
//! Supports pretty JSON on stdout and CSV export of a filtered trip subset.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::model::{EXPORT_DATE_FORMAT, Trip};
use csv::WriterBuilder;
use std::io::Write;

/// Row shape of the export file: the input column subset with the timestamp
/// reformatted as `YYYY-MM-DD HH:MM`.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Transit Agency")]
    agency: &'a str,
    #[serde(rename = "Amount")]
    amount: &'a str,
}

/// Prints any serializable result as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes trips as a delimited export to `writer`.
pub fn write_export<W: Write>(writer: W, trips: &[Trip]) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);

    for trip in trips {
        csv_writer.serialize(ExportRow {
            date: trip.date.format(EXPORT_DATE_FORMAT).to_string(),
            location: &trip.location,
            agency: &trip.agency,
            amount: &trip.amount,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes trips as a delimited export file, returning the row count.
pub fn export_csv(path: &str, trips: &[Trip]) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    write_export(file, trips)?;

    info!(path, rows = trips.len(), "export written");
    Ok(trips.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDateTime, Timelike};
    use std::env;
    use std::fs;
    use std::path::Path;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn trip(datetime: &str, location: &str, amount: &str, agency: &str) -> Trip {
        let date = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M").unwrap();
        Trip {
            date,
            location: location.to_string(),
            amount: amount.to_string(),
            amount_clean: 3.25,
            agency: agency.to_string(),
            day_of_week: date.weekday(),
            hour: date.hour(),
            month: date.format("%Y-%m").to_string(),
            week: date.iso_week().week(),
            year: date.year(),
            date_only: date.date(),
        }
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&vec![("Union Station".to_string(), 3usize)]).unwrap();
    }

    #[test]
    fn test_write_export_header_and_date_format() {
        let trips = vec![trip("2024-01-05 08:15", "Aldershot GO", "$3.25", "GO")];
        let mut buffer = Vec::new();
        write_export(&mut buffer, &trips).unwrap();

        let content = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Date,Location,Transit Agency,Amount");
        assert_eq!(lines[1], "2024-01-05 08:15,Aldershot GO,GO,$3.25");
    }

    #[test]
    fn test_write_export_keeps_original_amount_string() {
        let trips = vec![trip("2024-01-05 17:40", "Union Station", "-$3.25", "GO")];
        let mut buffer = Vec::new();
        write_export(&mut buffer, &trips).unwrap();

        let content = String::from_utf8(buffer).unwrap();
        assert!(content.contains("-$3.25"));
    }

    #[test]
    fn test_export_csv_creates_file() {
        let path = temp_path("transitlens_test_export.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let trips = vec![
            trip("2024-01-05 08:15", "Aldershot GO", "$3.25", "GO"),
            trip("2024-01-05 17:40", "Union Station", "-$3.25", "GO"),
        ];
        let rows = export_csv(&path, &trips).unwrap();
        assert_eq!(rows, 2);

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        // 1 header + 2 data rows
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_export_csv_empty_subset_writes_header_only() {
        let path = temp_path("transitlens_test_export_empty.csv");
        let _ = fs::remove_file(&path);

        let rows = export_csv(&path, &[]).unwrap();
        assert_eq!(rows, 0);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.is_empty() || content.lines().count() <= 1);

        fs::remove_file(&path).unwrap();
    }
}
