//! tripsearch-server: HTTP server for tripsearch.
//!
//! Provides the REST API and background maintenance jobs.
//! Trip storage and search live in `tripsearch-core`.

/// REST API layer: Axum router, HTTP handlers, models, auth, metrics.
pub mod api;
/// Periodic integrity sweep over stored trips.
pub mod integrity;
