//! Trip search: query parsing, criterion evaluation, relevance scoring, ranking.
//!
//! A search fetches a city's candidates from a [`TripStore`](crate::storage::TripStore),
//! drops trips that fail a hard filter, scores the rest, ranks them by relevance and
//! returns one page. When nothing survives the filters the city is listed unranked.

/// Per-criterion evaluation of a trip against a query.
pub mod criteria;
/// Search orchestration and the city-only fallback.
pub mod engine;
/// Query parsing from the path segment and query parameters.
pub mod query;
/// Ranking by relevance and pagination.
pub mod rank;
/// Weighted aggregation of criterion outcomes into a 0–100 score.
pub mod relevance;
/// Filter/scan pass over candidates.
pub mod scan;
/// Scored trips, pagination and result pages.
pub mod types;
/// Criterion weight table.
pub mod weights;

pub use engine::{search, search_detailed, SearchOutcome, SearchPath};
pub use query::{parse_pagination, QueryError, SearchParams, SearchQuery};
pub use types::{Page, PageItem, Pagination, ScoredTrip};
pub use weights::{RelevanceWeights, WeightsError};
