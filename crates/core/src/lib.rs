//! # tripsearch-core
//!
//! In-memory trip store with relevance-ranked search by city, mood, dates, group size
//! and trip length.
//!
//! This is the core library crate with no async dependencies; the HTTP server lives in
//! `tripsearch-server`.

/// Global configuration constants: weights, limits, and defaults.
pub mod config;
/// Trip document types, payload validation, and raw document decoding.
pub mod document;
/// Search primitives: query parsing, scoring, ranking, and the search engine.
pub mod search;
/// Storage layer: the trip store and disk snapshots.
pub mod storage;
