//! Predicate filtering over the trip table.

use chrono::NaiveDate;

use crate::error::UsageError;
use crate::model::Trip;

/// A conjunction of optional predicates. Inactive predicates match
/// everything, so the default filter returns the input unchanged.
#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    /// Inclusive start of the date range, compared by calendar date.
    pub start: Option<NaiveDate>,
    /// Inclusive end of the date range, compared by calendar date.
    pub end: Option<NaiveDate>,
    /// Exact agency match.
    pub agency: Option<String>,
    /// Case-insensitive substring match on location.
    pub location_contains: Option<String>,
}

impl TripFilter {
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.agency.is_none()
            && self.location_contains.is_none()
    }

    fn matches(&self, trip: &Trip) -> bool {
        if let Some(start) = self.start {
            if trip.date_only < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if trip.date_only > end {
                return false;
            }
        }
        if let Some(agency) = &self.agency {
            if trip.agency != *agency {
                return false;
            }
        }
        if let Some(needle) = &self.location_contains {
            if !trip
                .location
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Returns the subset of trips satisfying all active predicates.
///
/// # Errors
///
/// Returns [`UsageError::InvertedDateRange`] when both range ends are set
/// and the end precedes the start.
pub fn apply(trips: &[Trip], filter: &TripFilter) -> Result<Vec<Trip>, UsageError> {
    if let (Some(start), Some(end)) = (filter.start, filter.end) {
        if end < start {
            return Err(UsageError::InvertedDateRange { start, end });
        }
    }

    Ok(trips
        .iter()
        .filter(|trip| filter.matches(trip))
        .cloned()
        .collect())
}
