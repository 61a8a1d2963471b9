//! One-pass overview metrics for a trip table.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analyzers::utility::{mean, median, stddev};
use crate::model::Trip;

/// Dataset-wide usage and spending overview.
///
/// The annual projection is a naive linear extrapolation of the monthly
/// average over the covered span; spans shorter than a month count as one.
#[derive(Debug, Default, Serialize)]
pub struct UsageSummary {
    pub total_trips: usize,
    pub unique_locations: usize,
    pub unique_agencies: usize,
    pub days_travelled: usize,
    pub first_trip: Option<NaiveDateTime>,
    pub last_trip: Option<NaiveDateTime>,

    pub total_spent: f64,
    pub avg_fare: f64,
    pub median_fare: f64,
    pub max_fare: f64,
    pub fare_stddev: f64,
    pub avg_daily_spend: f64,
    pub avg_monthly_spend: f64,
    pub projected_annual_spend: f64,
}

impl UsageSummary {
    pub fn from_trips(trips: &[Trip]) -> Self {
        if trips.is_empty() {
            return Self::default();
        }

        let mut locations = HashSet::new();
        let mut agencies = HashSet::new();
        let mut days = HashSet::new();
        let mut fares = Vec::with_capacity(trips.len());
        let mut first = trips[0].date;
        let mut last = trips[0].date;

        for trip in trips {
            locations.insert(trip.location.as_str());
            agencies.insert(trip.agency.as_str());
            days.insert(trip.date_only);
            fares.push(trip.amount_clean);
            first = first.min(trip.date);
            last = last.max(trip.date);
        }

        let total_spent: f64 = fares.iter().sum();
        let avg_fare = mean(&fares);
        let span_days = (last.date() - first.date()).num_days();
        let months_covered = (span_days as f64 / 30.0).max(1.0);
        let avg_monthly_spend = total_spent / months_covered;

        UsageSummary {
            total_trips: trips.len(),
            unique_locations: locations.len(),
            unique_agencies: agencies.len(),
            days_travelled: days.len(),
            first_trip: Some(first),
            last_trip: Some(last),
            total_spent,
            avg_fare,
            median_fare: median(&fares),
            max_fare: fares.iter().copied().fold(0.0, f64::max),
            fare_stddev: stddev(&fares, avg_fare),
            avg_daily_spend: total_spent / days.len() as f64,
            avg_monthly_spend,
            projected_annual_spend: avg_monthly_spend * 12.0,
        }
    }
}
