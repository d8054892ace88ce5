//! Relevance aggregation: per-criterion credit → normalized 0–100 score.
//!
//! score = achieved * 100 / possible, where `possible` sums the weights of the criteria the
//! query carries and `achieved` sums weight × credit. When nothing was achieved the trip
//! still gets a diffuse low score instead of 0, so all-miss candidates (and city-only
//! queries) do not collapse into one undifferentiated tie at zero.

use crate::config;
use crate::search::criteria::CriterionResults;
use crate::search::weights::RelevanceWeights;

/// Combines criterion outcomes into a relevance score in `[0, 100]`.
pub fn aggregate(results: &CriterionResults, weights: &RelevanceWeights) -> f32 {
    let mut possible = 0.0f32;
    let mut achieved = 0.0f32;
    let mut min_weight = f32::MAX;

    for outcome in &results.outcomes {
        let Some(weight) = weights.weight(outcome.criterion) else {
            continue;
        };
        possible += weight;
        achieved += weight * outcome.credit;
        min_weight = min_weight.min(weight);
    }

    let score = if achieved > 0.0 {
        achieved * 100.0 / possible
    } else {
        all_miss_score(possible, min_weight)
    };
    score.clamp(0.0, 100.0)
}

/// Score for a trip that passed every hard filter but earned no credit.
///
/// `(1 - possible) * 100` below a weight sum of 1, the configured floor otherwise. Capped
/// at the score a single hit on the lightest criterion would earn, so satisfying one more
/// criterion never lowers a trip's relevance.
fn all_miss_score(possible: f32, min_weight: f32) -> f32 {
    if possible <= 0.0 {
        return 100.0;
    }
    let base = if possible < 1.0 {
        (1.0 - possible) * 100.0
    } else {
        config::ALL_MISS_FLOOR
    };
    let single_hit = min_weight * 100.0 / possible;
    base.max(config::ALL_MISS_FLOOR).min(single_hit)
}
