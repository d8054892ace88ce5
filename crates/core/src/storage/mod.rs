//! Storage layer: the in-memory trip store and its disk snapshot.
//!
//! Trips live as raw JSON documents in a [`Database`], indexed by city. Durability comes
//! from periodic JSON snapshots with a CRC32 footer (atomic temp-file + rename).

/// Disk persistence: snapshot save/load with atomic writes.
pub mod persistence;
/// Trip store: documents, city index, and the `TripStore` trait used by search.
pub mod store;

pub use persistence::{load_snapshot, save_snapshot, snapshot_path};
pub use store::{Database, StoreError, TripStore};
