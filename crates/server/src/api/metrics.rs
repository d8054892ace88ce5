//! Prometheus metrics recording and background collection.

use metrics::{counter, gauge, histogram};
use std::time::Duration;
use tripsearch_core::search::SearchPath;
use tripsearch_core::storage::Database;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records a trip write operation (`create`, `update`, `toggle_public`, `delete`).
pub fn record_write_operation(operation: &str) {
    counter!(
        "tripsearch_operations_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Records one search, the path that answered it and how many candidates were scanned.
pub fn record_search(path: SearchPath, candidates: usize) {
    counter!("tripsearch_search_total", "path" => path.as_str()).increment(1);
    histogram!("tripsearch_search_candidates").record(candidates as f64);
}

/// Updates the `tripsearch_documents_total` gauge.
pub fn update_document_metrics(db: &Database) {
    gauge!("tripsearch_documents_total").set(db.document_count() as f64);
}

/// Updates the `tripsearch_corrupt_documents` gauge after an integrity sweep.
pub fn update_corrupt_metrics(corrupt: usize) {
    gauge!("tripsearch_corrupt_documents").set(corrupt as f64);
}
