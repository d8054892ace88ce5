//! Trip search: fetch candidates, filter and score, rank, paginate.
//!
//! When no candidate survives the hard filters the engine falls back to every trip in
//! the city, unranked and in store order, so a search never comes back empty for a city
//! that has trips.

use crate::document::decode_trips;
use crate::search::query::SearchQuery;
use crate::search::rank::{paginate, rank};
use crate::search::scan::scan;
use crate::search::types::{Page, PageItem};
use crate::search::weights::RelevanceWeights;
use crate::storage::store::{StoreError, TripStore};

/// Which path produced a result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPath {
    Ranked,
    Fallback,
}

impl SearchPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPath::Ranked => "ranked",
            SearchPath::Fallback => "fallback",
        }
    }
}

/// A result page plus how it was produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub page: Page,
    pub path: SearchPath,
    /// Number of decoded candidates the scan looked at.
    pub candidates: usize,
}

/// Runs `query` against `store` and returns one page of results.
pub fn search<S: TripStore + ?Sized>(
    query: &SearchQuery,
    store: &S,
    weights: &RelevanceWeights,
) -> Result<Page, StoreError> {
    search_detailed(query, store, weights).map(|outcome| outcome.page)
}

/// Like [`search`], but also reports the path taken and the candidate count.
pub fn search_detailed<S: TripStore + ?Sized>(
    query: &SearchQuery,
    store: &S,
    weights: &RelevanceWeights,
) -> Result<SearchOutcome, StoreError> {
    let raw = store.fetch_candidates_by_city(&query.city, query.date_range())?;
    let candidates = decode_trips(raw);
    let candidate_count = candidates.len();

    let scored = scan(query, &candidates, weights);
    if !scored.is_empty() {
        tracing::debug!(
            target: "trip",
            city = %query.city,
            candidates = candidate_count,
            matched = scored.len(),
            "Ranked search"
        );
        let items = paginate(rank(scored), query.pagination)
            .into_iter()
            .map(PageItem::from)
            .collect();
        return Ok(SearchOutcome {
            page: Page { items },
            path: SearchPath::Ranked,
            candidates: candidate_count,
        });
    }

    let all = decode_trips(store.fetch_all_by_city(&query.city)?);
    tracing::debug!(
        target: "trip",
        city = %query.city,
        candidates = candidate_count,
        fallback = all.len(),
        "No trip matched, listing city"
    );
    let items = paginate(all, query.pagination)
        .into_iter()
        .map(PageItem::from)
        .collect();
    Ok(SearchOutcome {
        page: Page { items },
        path: SearchPath::Fallback,
        candidates: candidate_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_raw;
    use crate::document::RawTrip;
    use crate::search::types::Pagination;
    use crate::storage::store::Database;
    use chrono::NaiveDate;
    use serde_json::json;

    fn berlin(id: &str, moods: &[&str], persons: u32, days: u32) -> RawTrip {
        let mut raw = sample_raw(id);
        raw["moods"] = json!(moods);
        raw["persons"] = json!(persons);
        raw["days"] = json!(days);
        raw
    }

    fn berlin_store() -> Database {
        Database::from_documents(vec![
            berlin("t1", &["beach"], 2, 3),
            berlin("t2", &["city"], 4, 5),
        ])
    }

    fn ids(page: &Page) -> Vec<&str> {
        page.items.iter().map(|i| i.trip.id.as_str()).collect()
    }

    struct FailingStore;

    impl TripStore for FailingStore {
        fn fetch_candidates_by_city(
            &self,
            _city: &str,
            _date_hint: Option<(NaiveDate, NaiveDate)>,
        ) -> Result<Vec<RawTrip>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        fn fetch_all_by_city(&self, _city: &str) -> Result<Vec<RawTrip>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    /// Ranked path yields nothing; only the fallback fetch fails.
    struct FallbackFailingStore;

    impl TripStore for FallbackFailingStore {
        fn fetch_candidates_by_city(
            &self,
            _city: &str,
            _date_hint: Option<(NaiveDate, NaiveDate)>,
        ) -> Result<Vec<RawTrip>, StoreError> {
            Ok(Vec::new())
        }

        fn fetch_all_by_city(&self, _city: &str) -> Result<Vec<RawTrip>, StoreError> {
            Err(StoreError::Unavailable("timeout".into()))
        }
    }

    #[test]
    fn test_mood_and_persons_match_single_trip() {
        let mut q = SearchQuery::for_city("berlin");
        q.moods = vec!["beach".into()];
        q.persons = Some(2);
        let outcome = search_detailed(&q, &berlin_store(), &RelevanceWeights::default()).unwrap();
        assert_eq!(outcome.path, SearchPath::Ranked);
        assert_eq!(ids(&outcome.page), vec!["t1"]);
        let relevance = outcome.page.items[0].relevance.unwrap();
        assert!((relevance - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_city_only_returns_all_in_scan_order() {
        let q = SearchQuery::for_city("berlin");
        let page = search(&q, &berlin_store(), &RelevanceWeights::default()).unwrap();
        assert_eq!(ids(&page), vec!["t1", "t2"]);
        let a = page.items[0].relevance.unwrap();
        let b = page.items[1].relevance.unwrap();
        assert!(a > 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_mood_match_falls_back_unranked() {
        let mut q = SearchQuery::for_city("berlin");
        q.moods = vec!["ski".into()];
        let outcome = search_detailed(&q, &berlin_store(), &RelevanceWeights::default()).unwrap();
        assert_eq!(outcome.path, SearchPath::Fallback);
        assert_eq!(ids(&outcome.page), vec!["t1", "t2"]);
        assert!(outcome.page.items.iter().all(|i| i.relevance.is_none()));
    }

    #[test]
    fn test_unknown_city_is_empty() {
        let page = search(
            &SearchQuery::for_city("munich"),
            &berlin_store(),
            &RelevanceWeights::default(),
        )
        .unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_best_match_found_beyond_first_page() {
        let mut docs: Vec<RawTrip> = (0..30)
            .map(|i| berlin(&format!("t{i:02}"), &["beach"], 1, 1))
            .collect();
        docs.push(berlin("zz-best", &["beach"], 2, 3));
        let store = Database::from_documents(docs);

        let mut q = SearchQuery::for_city("berlin");
        q.moods = vec!["beach".into()];
        q.persons = Some(2);
        q.days = Some(3);
        q.pagination = Pagination::new(1, 5);
        let page = search(&q, &store, &RelevanceWeights::default()).unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page.items[0].trip.id, "zz-best");
        assert!((page.items[0].relevance.unwrap() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_pagination_applies_after_ranking() {
        let store = Database::from_documents(
            (0..7).map(|i| berlin(&format!("t{i}"), &["beach"], 2, 3)).collect(),
        );
        let mut q = SearchQuery::for_city("berlin");
        q.pagination = Pagination::new(2, 3);
        let page = search(&q, &store, &RelevanceWeights::default()).unwrap();
        assert_eq!(ids(&page), vec!["t3", "t4", "t5"]);

        q.pagination = Pagination::new(4, 3);
        assert!(search(&q, &store, &RelevanceWeights::default()).unwrap().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let mut q = SearchQuery::for_city("berlin");
        q.persons = Some(3);
        let store = berlin_store();
        let a = search(&q, &store, &RelevanceWeights::default()).unwrap();
        let b = search(&q, &store, &RelevanceWeights::default()).unwrap();
        assert_eq!(ids(&a), ids(&b));
        let ra: Vec<_> = a.items.iter().map(|i| i.relevance).collect();
        let rb: Vec<_> = b.items.iter().map(|i| i.relevance).collect();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_hidden_trips_never_returned() {
        let mut private = berlin("private", &["beach"], 2, 3);
        private["is_public"] = json!(false);
        let mut deleted = berlin("deleted", &["beach"], 2, 3);
        deleted["is_deleted"] = json!(true);
        let store = Database::from_documents(vec![private, deleted, berlin("ok", &["city"], 2, 3)]);

        let mut q = SearchQuery::for_city("berlin");
        q.moods = vec!["beach".into()];
        let page = search(&q, &store, &RelevanceWeights::default()).unwrap();
        assert_eq!(ids(&page), vec!["ok"]);
        assert!(page.items[0].relevance.is_none());
    }

    #[test]
    fn test_store_error_propagates() {
        let result = search(
            &SearchQuery::for_city("berlin"),
            &FailingStore,
            &RelevanceWeights::default(),
        );
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_fallback_store_error_propagates() {
        let result = search(
            &SearchQuery::for_city("berlin"),
            &FallbackFailingStore,
            &RelevanceWeights::default(),
        );
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
