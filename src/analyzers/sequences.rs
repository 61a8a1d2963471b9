//! Same-day trip sequence extraction.
//!
//! Consecutive trips on the same calendar date are treated as a directed
//! route pair. Adjacency within a day is the only sequencing signal: a trip
//! ending after midnight is never linked to the next day's first trip.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::Trip;

/// A directed pair of same-day consecutive trip locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSequence {
    pub from: String,
    pub to: String,
    pub count: usize,
}

/// Extracts directed location pairs from chronologically consecutive
/// same-day trips, skipping pairs with identical endpoints, ranked by
/// descending count. Ties keep first-encounter order.
pub fn extract_sequences(trips: &[Trip]) -> Vec<RouteSequence> {
    let mut ordered: Vec<&Trip> = trips.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let mut counts: HashMap<(String, String), (usize, usize)> = HashMap::new();
    for pair in ordered.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.date_only != b.date_only || a.location == b.location {
            continue;
        }
        let first_seen = counts.len();
        let entry = counts
            .entry((a.location.clone(), b.location.clone()))
            .or_insert((0, first_seen));
        entry.0 += 1;
    }

    let mut ranked: Vec<((String, String), (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));

    ranked
        .into_iter()
        .map(|((from, to), (count, _))| RouteSequence { from, to, count })
        .collect()
}
