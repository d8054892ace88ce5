//! Filter/scan pass over a city's candidate trips.

use crate::config;
use crate::document::TripDocument;
use crate::search::criteria::{evaluate, Evaluation};
use crate::search::query::SearchQuery;
use crate::search::relevance::aggregate;
use crate::search::types::ScoredTrip;
use crate::search::weights::RelevanceWeights;
use rayon::prelude::*;
use std::sync::Arc;

/// Applies the hard filters to every candidate and scores the admitted ones.
///
/// Output keeps scan order. Large candidate sets are scored on the rayon pool; the
/// indexed collect preserves order, so both paths return identical results.
pub fn scan(
    query: &SearchQuery,
    candidates: &[Arc<TripDocument>],
    weights: &RelevanceWeights,
) -> Vec<ScoredTrip> {
    if candidates.len() >= config::PARALLEL_SCAN_THRESHOLD {
        candidates
            .par_iter()
            .filter_map(|trip| score_candidate(query, trip, weights))
            .collect()
    } else {
        candidates
            .iter()
            .filter_map(|trip| score_candidate(query, trip, weights))
            .collect()
    }
}

fn score_candidate(
    query: &SearchQuery,
    trip: &Arc<TripDocument>,
    weights: &RelevanceWeights,
) -> Option<ScoredTrip> {
    match evaluate(query, trip) {
        Evaluation::Excluded(_) => None,
        Evaluation::Admitted(results) => Some(ScoredTrip {
            trip: Arc::clone(trip),
            relevance: aggregate(&results, weights),
        }),
    }
}
