//! Core data types for the normalized trip table.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::Deserialize;

/// Timestamp format used by the card export, e.g. `01/05/2024 08:15:00 AM`.
pub const DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Timestamp format used when exporting filtered data.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Zone codes the card export uses for a handful of stops, remapped to their
/// station names during normalization. Exact match, case-sensitive.
pub const LOCATION_SYNONYMS: &[(&str, &str)] = &[
    ("Zone17", "Aldershot GO"),
    ("Zone20", "Square One"),
    ("Zone27", "University of Waterloo"),
];

/// Weekday display order for fixed-domain buckets.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One row of the raw card export. Columns beyond these four are ignored.
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Transit Agency")]
    pub agency: String,
}

/// A normalized transit-card transaction with derived temporal fields.
///
/// Built once per load and never mutated; aggregation functions take
/// slices of trips and return new values.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub date: NaiveDateTime,
    pub location: String,
    /// Original amount string, decoration included.
    pub amount: String,
    /// Fare value with `-` and `$` stripped. Always >= 0.
    pub amount_clean: f64,
    pub agency: String,
    pub day_of_week: Weekday,
    pub hour: u32,
    /// Calendar month as `YYYY-MM`.
    pub month: String,
    /// ISO week number, 1-53.
    pub week: u32,
    pub year: i32,
    pub date_only: NaiveDate,
}

/// Categorical fields a trip can be grouped or counted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Location,
    Agency,
    DayOfWeek,
    Hour,
    Month,
    LocationType,
}

impl Field {
    /// Grouping key of `trip` under this field.
    pub fn key(&self, trip: &Trip) -> String {
        match self {
            Field::Location => trip.location.clone(),
            Field::Agency => trip.agency.clone(),
            Field::DayOfWeek => day_name(trip.day_of_week).to_string(),
            Field::Hour => trip.hour.to_string(),
            Field::Month => trip.month.clone(),
            Field::LocationType => location_type(&trip.location).name().to_string(),
        }
    }

    /// The complete value set for fields whose domain is known in advance,
    /// in display order. Buckets over these fields are zero-filled.
    pub fn fixed_domain(&self) -> Option<Vec<String>> {
        match self {
            Field::DayOfWeek => Some(
                WEEKDAY_ORDER
                    .iter()
                    .map(|d| day_name(*d).to_string())
                    .collect(),
            ),
            Field::Hour => Some((0u32..24).map(|h| h.to_string()).collect()),
            Field::LocationType => Some(
                [
                    LocationType::Station,
                    LocationType::BusStop,
                    LocationType::GoTransit,
                    LocationType::Other,
                ]
                .iter()
                .map(|t| t.name().to_string())
                .collect(),
            ),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Location => "location",
            Field::Agency => "agency",
            Field::DayOfWeek => "day_of_week",
            Field::Hour => "hour",
            Field::Month => "month",
            Field::LocationType => "location_type",
        }
    }
}

/// Value a group statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueField {
    /// The cleaned fare amount.
    AmountClean,
    /// One unit per trip, so a sum yields a trip count.
    TripCount,
    /// The location string, for distinct-value statistics.
    Location,
}

impl ValueField {
    pub fn name(&self) -> &'static str {
        match self {
            ValueField::AmountClean => "amount_clean",
            ValueField::TripCount => "trip_count",
            ValueField::Location => "location",
        }
    }
}

/// Per-group statistic for ranking and time-bucket aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Sum,
    Mean,
    Count,
    Min,
    Max,
    /// Number of distinct values in the group.
    Nunique,
}

impl Statistic {
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Sum => "sum",
            Statistic::Mean => "mean",
            Statistic::Count => "count",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Nunique => "nunique",
        }
    }
}

/// Calendar granularity for time-series bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Month,
    /// ISO week.
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Coarse classification of a stop name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    Station,
    BusStop,
    GoTransit,
    Other,
}

impl LocationType {
    pub fn name(&self) -> &'static str {
        match self {
            LocationType::Station => "Subway/Train Station",
            LocationType::BusStop => "Bus Stop",
            LocationType::GoTransit => "GO Transit",
            LocationType::Other => "Other",
        }
    }
}

/// Classifies a (remapped) location name by simple substring rules:
/// `STATION` wins over ` AT ` wins over `GO`.
pub fn location_type(location: &str) -> LocationType {
    let upper = location.to_uppercase();
    if upper.contains("STATION") {
        LocationType::Station
    } else if upper.contains(" AT ") {
        LocationType::BusStop
    } else if upper.contains("GO") {
        LocationType::GoTransit
    } else {
        LocationType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_names_follow_weekday_order() {
        let names: Vec<_> = WEEKDAY_ORDER.iter().map(|d| day_name(*d)).collect();
        assert_eq!(
            names,
            vec![
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday"
            ]
        );
    }

    #[test]
    fn test_weekday_domain_has_seven_entries() {
        let domain = Field::DayOfWeek.fixed_domain().unwrap();
        assert_eq!(domain.len(), 7);
        assert_eq!(domain[0], "Monday");
        assert_eq!(domain[6], "Sunday");
    }

    #[test]
    fn test_hour_domain_has_24_entries() {
        let domain = Field::Hour.fixed_domain().unwrap();
        assert_eq!(domain.len(), 24);
        assert_eq!(domain[0], "0");
        assert_eq!(domain[23], "23");
    }

    #[test]
    fn test_open_domains_have_no_fixed_set() {
        assert!(Field::Location.fixed_domain().is_none());
        assert!(Field::Agency.fixed_domain().is_none());
        assert!(Field::Month.fixed_domain().is_none());
    }

    #[test]
    fn test_location_type_rules() {
        assert_eq!(location_type("Union Station"), LocationType::Station);
        assert_eq!(location_type("King St At Bay St"), LocationType::BusStop);
        assert_eq!(location_type("Aldershot GO"), LocationType::GoTransit);
        assert_eq!(location_type("Square One"), LocationType::Other);
    }

    #[test]
    fn test_location_type_station_wins_over_go() {
        // "GO" appears in the name but STATION takes precedence
        assert_eq!(location_type("Oakville GO Station"), LocationType::Station);
    }
}
