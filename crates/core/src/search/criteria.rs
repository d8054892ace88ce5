//! Per-criterion evaluation of one trip against one search query.
//!
//! Moods and the date range are hard filters: a trip sharing no requested mood, or
//! whose range does not contain the requested end date, is excluded outright. Persons,
//! days, budget and accommodations never exclude; they only earn or miss credit.

use crate::document::TripDocument;
use crate::search::query::SearchQuery;

/// One independently evaluable dimension of match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Moods,
    Dates,
    Persons,
    Days,
    Budget,
    Accommodations,
}

impl Criterion {
    /// Criteria that contribute to the relevance score.
    pub const WEIGHTED: [Criterion; 5] = [
        Criterion::Moods,
        Criterion::Days,
        Criterion::Persons,
        Criterion::Budget,
        Criterion::Accommodations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Moods => "moods",
            Criterion::Dates => "dates",
            Criterion::Persons => "persons",
            Criterion::Days => "days",
            Criterion::Budget => "budget",
            Criterion::Accommodations => "accommodations",
        }
    }
}

/// Outcome of one criterion present in the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriterionOutcome {
    pub criterion: Criterion,
    pub matched: bool,
    /// Fraction of the criterion satisfied, in `[0, 1]`. Binary except for moods.
    pub credit: f32,
}

impl CriterionOutcome {
    fn binary(criterion: Criterion, matched: bool) -> Self {
        Self {
            criterion,
            matched,
            credit: if matched { 1.0 } else { 0.0 },
        }
    }
}

/// Outcomes of every criterion present in the query, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriterionResults {
    pub outcomes: Vec<CriterionOutcome>,
}

impl CriterionResults {
    pub fn get(&self, criterion: Criterion) -> Option<&CriterionOutcome> {
        self.outcomes.iter().find(|o| o.criterion == criterion)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Why a trip failed a hard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// None of the requested moods is among the trip's moods.
    NoMoodMatch,
    /// The requested end date lies outside the trip's date range.
    OutsideDateRange,
}

/// Result of evaluating one trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Excluded(ExclusionReason),
    Admitted(CriterionResults),
}

/// Evaluates every criterion the query carries against `trip`.
///
/// Hard filters run first; a trip failing one is never scored.
pub fn evaluate(query: &SearchQuery, trip: &TripDocument) -> Evaluation {
    let mut outcomes = Vec::with_capacity(6);

    if !query.moods.is_empty() {
        let hit = query.moods.iter().filter(|m| trip.has_mood(m)).count();
        if hit == 0 {
            return Evaluation::Excluded(ExclusionReason::NoMoodMatch);
        }
        outcomes.push(CriterionOutcome {
            criterion: Criterion::Moods,
            matched: true,
            credit: hit as f32 / query.moods.len() as f32,
        });
    }

    if let Some((_, end)) = query.date_range() {
        if end < trip.start_date || end > trip.end_date {
            return Evaluation::Excluded(ExclusionReason::OutsideDateRange);
        }
        outcomes.push(CriterionOutcome::binary(Criterion::Dates, true));
    }

    if let Some(persons) = query.persons {
        outcomes.push(CriterionOutcome::binary(
            Criterion::Persons,
            persons <= trip.persons,
        ));
    }
    if let Some(days) = query.days {
        outcomes.push(CriterionOutcome::binary(Criterion::Days, days <= trip.days));
    }
    if let Some(budget) = query.budget {
        outcomes.push(CriterionOutcome::binary(
            Criterion::Budget,
            trip.budget.is_some_and(|b| budget <= b),
        ));
    }
    if let Some(accommodations) = query.accommodations {
        outcomes.push(CriterionOutcome::binary(
            Criterion::Accommodations,
            trip.accommodations.is_some_and(|a| accommodations <= a),
        ));
    }

    Evaluation::Admitted(CriterionResults { outcomes })
}
