//! Relevance weights per search criterion.
//!
//! One [`RelevanceWeights`] value is built at process start (canonical table or an
//! operator override) and shared read-only by every request.

use crate::config;
use crate::search::criteria::Criterion;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected weight overrides.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("weight for '{criterion}' must be in (0, 1], got {value}")]
    OutOfRange { criterion: &'static str, value: f32 },
    #[error("invalid weights JSON: {0}")]
    Parse(String),
}

/// Weight of each scored criterion. The date criterion is a pure hard filter and has none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelevanceWeights {
    pub moods: f32,
    pub days: f32,
    pub persons: f32,
    pub budget: f32,
    pub accommodations: f32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            moods: config::RELEVANCE_MOODS,
            days: config::RELEVANCE_DAYS,
            persons: config::RELEVANCE_PERSONS,
            budget: config::RELEVANCE_BUDGET,
            accommodations: config::RELEVANCE_ACCOMMODATIONS,
        }
    }
}

impl RelevanceWeights {
    /// Parses a JSON override; omitted criteria keep their canonical weight.
    pub fn from_json(json: &str) -> Result<Self, WeightsError> {
        let weights: Self =
            serde_json::from_str(json).map_err(|e| WeightsError::Parse(e.to_string()))?;
        weights.validate()?;
        Ok(weights)
    }

    /// Checks that every weight lies in `(0, 1]`.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for criterion in Criterion::WEIGHTED {
            if let Some(value) = self.weight(criterion) {
                if !(value > 0.0 && value <= 1.0) {
                    return Err(WeightsError::OutOfRange {
                        criterion: criterion.name(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Weight of `criterion`, or `None` for criteria that do not contribute to the score.
    pub fn weight(&self, criterion: Criterion) -> Option<f32> {
        match criterion {
            Criterion::Moods => Some(self.moods),
            Criterion::Days => Some(self.days),
            Criterion::Persons => Some(self.persons),
            Criterion::Budget => Some(self.budget),
            Criterion::Accommodations => Some(self.accommodations),
            Criterion::Dates => None,
        }
    }

    pub fn sum(&self) -> f32 {
        self.moods + self.days + self.persons + self.budget + self.accommodations
    }
}
