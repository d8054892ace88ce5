//! Scored trip and result page types.

use crate::config;
use crate::document::TripDocument;
use std::sync::Arc;

/// A trip with the relevance it earned against one search query.
///
/// Lives only for the duration of a request; scores are never persisted.
#[derive(Debug, Clone)]
pub struct ScoredTrip {
    /// The matched trip (shared reference).
    pub trip: Arc<TripDocument>,
    /// Normalized relevance in `[0, 100]`.
    pub relevance: f32,
}

/// Offset-based pagination controls (1-indexed pages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: config::DEFAULT_PAGE,
            page_size: config::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Index of the first item on this page. Saturates instead of overflowing.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One entry of a result page.
///
/// `relevance` is set for ranked results and absent when the page came from the
/// city-only fallback listing.
#[derive(Debug, Clone)]
pub struct PageItem {
    pub trip: Arc<TripDocument>,
    pub relevance: Option<f32>,
}

impl From<ScoredTrip> for PageItem {
    fn from(scored: ScoredTrip) -> Self {
        Self {
            trip: scored.trip,
            relevance: Some(scored.relevance),
        }
    }
}

impl From<Arc<TripDocument>> for PageItem {
    fn from(trip: Arc<TripDocument>) -> Self {
        Self {
            trip,
            relevance: None,
        }
    }
}

/// A page of search results. Carries no total count and no "has more" indicator.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<PageItem>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
