//! Ranking and pagination of scored trips.
//!
//! Pagination must run after the full scan and sort. Limiting the scan instead would drop
//! the best match whenever it sits past the limit in scan order.

use crate::search::types::{Pagination, ScoredTrip};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Sorts by relevance, highest first. Stable: equal scores keep scan order.
pub fn rank(mut scored: Vec<ScoredTrip>) -> Vec<ScoredTrip> {
    scored.sort_by_key(|s| Reverse(OrderedFloat(s.relevance)));
    scored
}

/// Returns `items[offset..offset + page_size]`. An offset past the end yields an empty page.
pub fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Vec<T> {
    items
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.page_size)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_raw;
    use crate::document::TripDocument;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn scored(id: &str, relevance: f32) -> ScoredTrip {
        ScoredTrip {
            trip: Arc::new(TripDocument::from_raw(&sample_raw(id)).unwrap()),
            relevance,
        }
    }

    fn ids(items: &[ScoredTrip]) -> Vec<&str> {
        items.iter().map(|s| s.trip.id.as_str()).collect()
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(vec![scored("a", 10.0), scored("b", 90.0), scored("c", 50.0)]);
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_ties_keep_scan_order() {
        let ranked = rank(vec![
            scored("a", 50.0),
            scored("b", 80.0),
            scored("c", 50.0),
            scored("d", 50.0),
        ]);
        assert_eq!(ids(&ranked), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_paginate_middle_page() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(items, Pagination::new(2, 10)), (10..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(items, Pagination::new(3, 10)), vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_paginate_beyond_range_is_empty() {
        let items: Vec<u32> = (0..5).collect();
        assert!(paginate(items, Pagination::new(4, 10)).is_empty());
    }

    proptest! {
        #[test]
        fn prop_page_equals_slice(len in 0usize..200, page in 1usize..30, size in 1usize..50) {
            let items: Vec<usize> = (0..len).collect();
            let pagination = Pagination::new(page, size);
            let start = pagination.offset().min(len);
            let end = (start + size).min(len);
            prop_assert_eq!(paginate(items.clone(), pagination), items[start..end].to_vec());
        }

        #[test]
        fn prop_rank_is_sorted_permutation(scores in proptest::collection::vec(0.0f32..=100.0, 0..60)) {
            let input: Vec<ScoredTrip> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| scored(&format!("t{i}"), *s))
                .collect();
            let ranked = rank(input);
            prop_assert_eq!(ranked.len(), scores.len());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].relevance >= pair[1].relevance);
            }
        }
    }
}
