//! Grouping, ranking, and time-bucketing over the trip table.
//!
//! The per-metric charts of the presentation layer are all instances of the
//! same aggregation shapes, so they are parameterized calls into these
//! functions rather than bespoke routines.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::utility::mean;
use crate::error::UsageError;
use crate::model::{Field, Granularity, SortOrder, Statistic, Trip, ValueField};

/// Counts occurrences of a categorical field, most common first.
///
/// Ties keep the order in which the values were first encountered, and
/// `top_n` truncates without reordering the retained prefix.
pub fn frequency_count(trips: &[Trip], field: Field, top_n: Option<usize>) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for trip in trips {
        let key = field.key(trip);
        let first_seen = counts.len();
        let entry = counts.entry(key).or_insert((0, first_seen));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));

    let mut result: Vec<(String, usize)> =
        ranked.into_iter().map(|(key, (count, _))| (key, count)).collect();
    if let Some(n) = top_n {
        result.truncate(n);
    }
    result
}

/// Groups by a bucket field and sums a numeric value per bucket.
///
/// Fixed-domain buckets (weekdays, hours) come back zero-filled in domain
/// order regardless of which values appear in the data; open domains come
/// back sorted with observed buckets only.
pub fn bucketed_sum(
    trips: &[Trip],
    bucket: Field,
    value: ValueField,
) -> Result<Vec<(String, f64)>, UsageError> {
    let mut sums: HashMap<String, f64> = HashMap::new();
    for trip in trips {
        *sums.entry(bucket.key(trip)).or_insert(0.0) += numeric_value(trip, value)?;
    }

    match bucket.fixed_domain() {
        Some(domain) => Ok(domain
            .into_iter()
            .map(|key| {
                let sum = sums.get(&key).copied().unwrap_or(0.0);
                (key, sum)
            })
            .collect()),
        None => Ok(sums.into_iter().collect::<BTreeMap<_, _>>().into_iter().collect()),
    }
}

fn numeric_value(trip: &Trip, value: ValueField) -> Result<f64, UsageError> {
    match value {
        ValueField::AmountClean => Ok(trip.amount_clean),
        ValueField::TripCount => Ok(1.0),
        ValueField::Location => Err(UsageError::UnsupportedStatistic {
            statistic: Statistic::Sum.name(),
            value: value.name(),
        }),
    }
}

/// Buckets trips by calendar month or ISO week and applies a statistic to
/// the fare amounts (count is the trip count). Buckets are chronological.
pub fn time_bucket_aggregate(
    trips: &[Trip],
    granularity: Granularity,
    statistic: Statistic,
) -> Result<Vec<(String, f64)>, UsageError> {
    if statistic == Statistic::Nunique {
        return Err(UsageError::UnsupportedStatistic {
            statistic: statistic.name(),
            value: ValueField::AmountClean.name(),
        });
    }

    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for trip in trips {
        let key = match granularity {
            Granularity::Month => trip.month.clone(),
            // ISO year + zero-padded ISO week, e.g. 2024-W02, so the
            // lexicographic BTreeMap order is chronological.
            Granularity::Week => trip.date_only.format("%G-W%V").to_string(),
        };
        buckets.entry(key).or_default().push(trip.amount_clean);
    }

    Ok(buckets
        .into_iter()
        .map(|(key, amounts)| (key, apply_statistic(statistic, &amounts)))
        .collect())
}

fn apply_statistic(statistic: Statistic, amounts: &[f64]) -> f64 {
    match statistic {
        Statistic::Sum => amounts.iter().sum(),
        Statistic::Count => amounts.len() as f64,
        Statistic::Mean => mean(amounts),
        Statistic::Min => amounts.iter().copied().fold(f64::INFINITY, f64::min),
        Statistic::Max => amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        // callers reject Nunique before reaching here
        Statistic::Nunique => 0.0,
    }
}

/// Running sum over an already-ordered time series.
pub fn cumulative(series: &[(String, f64)]) -> Vec<(String, f64)> {
    let mut total = 0.0;
    series
        .iter()
        .map(|(key, value)| {
            total += value;
            (key.clone(), total)
        })
        .collect()
}

/// Two-dimensional count grid, e.g. day-of-week rows by hour columns.
#[derive(Debug, Serialize)]
pub struct CrossTab {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// counts[row][col]; missing combinations are 0.
    pub counts: Vec<Vec<usize>>,
}

/// Counts trips per (row field, column field) combination.
///
/// Fixed-domain fields use their full domain in order; open fields use the
/// observed values, sorted.
pub fn cross_tabulate(trips: &[Trip], row: Field, col: Field) -> CrossTab {
    let row_labels = domain_of(trips, row);
    let col_labels = domain_of(trips, col);

    let row_index: HashMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();
    let col_index: HashMap<&str, usize> = col_labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();

    let mut counts = vec![vec![0usize; col_labels.len()]; row_labels.len()];
    for trip in trips {
        let r = row_index[row.key(trip).as_str()];
        let c = col_index[col.key(trip).as_str()];
        counts[r][c] += 1;
    }

    CrossTab {
        row_labels,
        col_labels,
        counts,
    }
}

fn domain_of(trips: &[Trip], field: Field) -> Vec<String> {
    match field.fixed_domain() {
        Some(domain) => domain,
        None => {
            let observed: std::collections::BTreeSet<String> =
                trips.iter().map(|t| field.key(t)).collect();
            observed.into_iter().collect()
        }
    }
}

/// Ranks groups by a statistic over a value field.
///
/// Supported combinations: `count` over anything, `nunique` over
/// `Location`, and `sum`/`mean`/`min`/`max` over `AmountClean`. Anything
/// else is a [`UsageError`]. Ties break on the group name.
pub fn rank_by(
    trips: &[Trip],
    group: Field,
    value: ValueField,
    statistic: Statistic,
    order: SortOrder,
) -> Result<Vec<(String, f64)>, UsageError> {
    let mut ranked: Vec<(String, f64)> = match statistic {
        Statistic::Count => {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for trip in trips {
                *counts.entry(group.key(trip)).or_insert(0) += 1;
            }
            counts.into_iter().map(|(k, v)| (k, v as f64)).collect()
        }
        Statistic::Nunique => {
            if value != ValueField::Location {
                return Err(UsageError::UnsupportedStatistic {
                    statistic: statistic.name(),
                    value: value.name(),
                });
            }
            let mut distinct: HashMap<String, HashSet<String>> = HashMap::new();
            for trip in trips {
                distinct
                    .entry(group.key(trip))
                    .or_default()
                    .insert(trip.location.clone());
            }
            distinct
                .into_iter()
                .map(|(k, set)| (k, set.len() as f64))
                .collect()
        }
        Statistic::Sum | Statistic::Mean | Statistic::Min | Statistic::Max => {
            if value != ValueField::AmountClean {
                return Err(UsageError::UnsupportedStatistic {
                    statistic: statistic.name(),
                    value: value.name(),
                });
            }
            let mut amounts: HashMap<String, Vec<f64>> = HashMap::new();
            for trip in trips {
                amounts
                    .entry(group.key(trip))
                    .or_default()
                    .push(trip.amount_clean);
            }
            amounts
                .into_iter()
                .map(|(k, values)| {
                    let v = apply_statistic(statistic, &values);
                    (k, v)
                })
                .collect()
        }
    };

    ranked.sort_by(|a, b| {
        let by_value = match order {
            SortOrder::Ascending => a.1.partial_cmp(&b.1),
            SortOrder::Descending => b.1.partial_cmp(&a.1),
        };
        by_value
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    Ok(ranked)
}

/// First visit, last visit, and visit count for one location.
#[derive(Debug, Clone, Serialize)]
pub struct LocationVisits {
    pub location: String,
    pub first_visit: NaiveDate,
    pub last_visit: NaiveDate,
    pub visits: usize,
}

/// Per-location visit history, most visited first.
pub fn visit_history(trips: &[Trip]) -> Vec<LocationVisits> {
    let mut history: HashMap<String, LocationVisits> = HashMap::new();

    for trip in trips {
        let entry = history
            .entry(trip.location.clone())
            .or_insert_with(|| LocationVisits {
                location: trip.location.clone(),
                first_visit: trip.date_only,
                last_visit: trip.date_only,
                visits: 0,
            });
        entry.first_visit = entry.first_visit.min(trip.date_only);
        entry.last_visit = entry.last_visit.max(trip.date_only);
        entry.visits += 1;
    }

    let mut result: Vec<LocationVisits> = history.into_values().collect();
    result.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.location.cmp(&b.location)));
    result
}
