//! Request and response data transfer objects for the REST API.
//!
//! All types derive `Serialize` and/or `Deserialize` for JSON marshalling via Axum.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tripsearch_core::document::TripDocument;
use tripsearch_core::search::{Page, PageItem, Pagination};

/// Request body for `POST /trips` and `PUT /trips/:id`.
pub use tripsearch_core::document::TripDraft as TripPayload;

/// Query parameters for `GET /trips`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Query parameters for the per-user listings.
#[derive(Debug, Default, Deserialize)]
pub struct UserTripsParams {
    /// Only trips still running on this date (`YYYY-MM-DD`).
    pub date: Option<String>,
}

/// Query parameters for the picture redirect.
#[derive(Debug, Default, Deserialize)]
pub struct PictureParams {
    pub size: Option<String>,
}

/// A trip in a result list, with its relevance when the list was ranked.
#[derive(Debug, Serialize)]
pub struct TripResult {
    #[serde(flatten)]
    pub trip: Arc<TripDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f32>,
}

impl From<PageItem> for TripResult {
    fn from(item: PageItem) -> Self {
        Self {
            trip: item.trip,
            relevance: item.relevance,
        }
    }
}

impl From<Arc<TripDocument>> for TripResult {
    fn from(trip: Arc<TripDocument>) -> Self {
        Self {
            trip,
            relevance: None,
        }
    }
}

/// Response for `GET /trips/search/:opts` and `GET /trips`.
#[derive(Debug, Serialize)]
pub struct TripPageResponse {
    pub results: Vec<TripResult>,
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
}

impl TripPageResponse {
    pub fn from_page(page: Page, pagination: Pagination) -> Self {
        Self::from_results(
            page.items.into_iter().map(TripResult::from).collect(),
            pagination,
        )
    }

    pub fn from_results(results: Vec<TripResult>, pagination: Pagination) -> Self {
        Self {
            count: results.len(),
            results,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }
}

/// Response for the per-user listings.
#[derive(Debug, Serialize)]
pub struct TripListResponse {
    pub results: Vec<TripResult>,
    pub count: usize,
}

impl TripListResponse {
    pub fn new(trips: Vec<Arc<TripDocument>>) -> Self {
        let results: Vec<TripResult> = trips.into_iter().map(TripResult::from).collect();
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub total_documents: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trip() -> Arc<TripDocument> {
        let raw = json!({
            "id": "t1",
            "title": "Lake",
            "description": "Swim",
            "user_id": "u1",
            "city": { "id": "berlin", "place_id": "p1", "title": "Berlin" },
            "start_date": "2026-07-01",
            "end_date": "2026-07-10",
            "moods": ["beach"],
            "persons": 2,
            "days": 3
        });
        Arc::new(TripDocument::from_raw(&raw).unwrap())
    }

    #[test]
    fn test_result_flattens_trip_and_relevance() {
        let result = TripResult {
            trip: trip(),
            relevance: Some(75.0),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["id"], "t1");
        assert_eq!(value["city"]["title"], "Berlin");
        assert_eq!(value["relevance"], 75.0);
    }

    #[test]
    fn test_fallback_result_omits_relevance() {
        let value = serde_json::to_value(TripResult::from(trip())).unwrap();
        assert!(value.get("relevance").is_none());
    }

    #[test]
    fn test_page_response_counts_results() {
        let response = TripPageResponse::from_results(
            vec![TripResult::from(trip()), TripResult::from(trip())],
            Pagination::new(2, 5),
        );
        assert_eq!(response.count, 2);
        assert_eq!(response.page, 2);
        assert_eq!(response.page_size, 5);
    }
}
