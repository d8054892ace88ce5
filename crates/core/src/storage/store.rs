//! In-memory trip store.
//!
//! [`Database`] keeps every trip as a raw JSON document keyed by id, plus a city index
//! from normalized city tokens to trip ids. Documents are read through
//! [`TripDocument::from_raw`]; documents that no longer decode stay stored so the
//! integrity sweep can report them, but they are skipped by every listing.

use crate::document::{decode_trips, normalize_token, raw_id, City, RawTrip, TripDocument, TripDraft};
use crate::search::rank::paginate;
use crate::search::types::Pagination;
use chrono::{NaiveDate, Utc};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by trip store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("trip '{0}' not found")]
    NotFound(String),
    #[error("trip '{0}' belongs to another user")]
    Forbidden(String),
    #[error("trip store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid trip: {0}")]
    Invalid(String),
    #[error("stored trip '{0}' is corrupt")]
    Corrupt(String),
}

/// Read access to trips by city, as consumed by the search engine.
///
/// Implementations only return trips that are public and not deleted.
pub trait TripStore {
    /// Trips in `city`, optionally narrowed by the requested date range.
    ///
    /// The narrowing is coarse: it may return trips outside the range, never drop one
    /// inside it.
    fn fetch_candidates_by_city(
        &self,
        city: &str,
        date_hint: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<RawTrip>, StoreError>;

    /// Every trip in `city`.
    fn fetch_all_by_city(&self, city: &str) -> Result<Vec<RawTrip>, StoreError>;
}

/// Documents and city index, protected by a `RwLock`.
#[derive(Debug, Default)]
pub struct StoreData {
    /// Trip id → raw document. Ordered so scans are deterministic.
    pub documents: BTreeMap<String, RawTrip>,
    /// Normalized city token → ids of trips in that city.
    pub city_index: HashMap<String, BTreeSet<String>>,
}

impl StoreData {
    fn insert(&mut self, id: String, raw: RawTrip) {
        self.unindex(&id);
        for key in city_keys(&raw) {
            self.city_index.entry(key).or_default().insert(id.clone());
        }
        self.documents.insert(id, raw);
    }

    fn unindex(&mut self, id: &str) {
        let Some(old) = self.documents.get(id) else {
            return;
        };
        for key in city_keys(old) {
            if let Some(ids) = self.city_index.get_mut(&key) {
                ids.remove(id);
                if ids.is_empty() {
                    self.city_index.remove(&key);
                }
            }
        }
    }

    fn in_city(&self, city: &str) -> impl Iterator<Item = &RawTrip> {
        self.city_index
            .get(&normalize_token(city))
            .into_iter()
            .flatten()
            .filter_map(|id| self.documents.get(id))
    }
}

fn city_keys(raw: &RawTrip) -> Vec<String> {
    raw.get("city")
        .and_then(|c| serde_json::from_value::<City>(c.clone()).ok())
        .map(|c| c.index_keys())
        .unwrap_or_default()
}

fn raw_flag(raw: &RawTrip, name: &str, legacy: &str, default: bool) -> bool {
    raw.get(name)
        .or_else(|| raw.get(legacy))
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
}

/// Public and not deleted, read straight from the raw document.
fn raw_is_visible(raw: &RawTrip) -> bool {
    raw_flag(raw, "is_public", "active", true) && !raw_flag(raw, "is_deleted", "delete", false)
}

fn raw_end_date(raw: &RawTrip) -> Option<NaiveDate> {
    raw.get("end_date")
        .and_then(|v| v.as_str())
        .and_then(crate::document::parse_date)
}

/// Thread-safe in-memory trip store. Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct Database {
    pub data: Arc<RwLock<StoreData>>,
    /// Held for the whole of a snapshot write; clones share it.
    snapshot_lock: Arc<Mutex<()>>,
}

impl Database {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from raw documents, e.g. a loaded snapshot.
    ///
    /// Documents without a string `id` cannot be addressed and are dropped.
    pub fn from_documents(documents: Vec<RawTrip>) -> Self {
        let db = Self::new();
        {
            let mut data = db.data.write();
            for raw in documents {
                let id = raw_id(&raw).map(str::to_string);
                match id {
                    Some(id) => data.insert(id, raw),
                    None => tracing::warn!(target: "corrupt", "Dropping trip document without id"),
                }
            }
        }
        db
    }

    /// Stores a raw document as-is. Returns its id.
    pub fn insert_raw(&self, raw: RawTrip) -> Result<String, StoreError> {
        let id = raw_id(&raw)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Invalid("document has no string id".into()))?;
        self.data.write().insert(id.clone(), raw);
        Ok(id)
    }

    /// Creates a new trip owned by `user_id`.
    pub fn create_trip(&self, draft: TripDraft, user_id: &str) -> Result<TripDocument, StoreError> {
        draft.validate().map_err(StoreError::Invalid)?;
        let id = Uuid::new_v4().to_string();
        let trip = draft.into_document(id.clone(), user_id.to_string(), Utc::now());
        self.data.write().insert(id, trip.to_raw());
        tracing::info!(target: "trip", id = %trip.id, user = %user_id, "Trip created");
        Ok(trip)
    }

    /// Returns a trip that has not been deleted.
    pub fn get_trip(&self, id: &str) -> Result<TripDocument, StoreError> {
        let data = self.data.read();
        let raw = data
            .documents
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let trip = TripDocument::from_raw(raw).map_err(|e| {
            tracing::warn!(target: "corrupt", id = %id, error = %e, "Requested trip is corrupt");
            StoreError::Corrupt(id.to_string())
        })?;
        if trip.is_deleted {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(trip)
    }

    /// Applies `change` to a live trip owned by `user_id` and stores the result.
    fn modify<F>(&self, id: &str, user_id: &str, change: F) -> Result<TripDocument, StoreError>
    where
        F: FnOnce(&mut TripDocument) -> Result<(), StoreError>,
    {
        let mut data = self.data.write();
        let raw = data
            .documents
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut trip = TripDocument::from_raw(raw)
            .map_err(|_| StoreError::Corrupt(id.to_string()))?;
        if trip.is_deleted {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if trip.user_id != user_id {
            return Err(StoreError::Forbidden(id.to_string()));
        }
        change(&mut trip)?;
        trip.updated_at = Some(Utc::now());
        data.insert(id.to_string(), trip.to_raw());
        Ok(trip)
    }

    /// Replaces the contents of a trip. Only the owner may update it.
    pub fn update_trip(
        &self,
        id: &str,
        user_id: &str,
        draft: TripDraft,
    ) -> Result<TripDocument, StoreError> {
        draft.validate().map_err(StoreError::Invalid)?;
        let trip = self.modify(id, user_id, |trip| {
            let created_at = trip.created_at;
            *trip = draft.into_document(trip.id.clone(), trip.user_id.clone(), Utc::now());
            trip.created_at = created_at;
            Ok(())
        })?;
        tracing::info!(target: "trip", id = %id, "Trip updated");
        Ok(trip)
    }

    /// Flips a trip between public and private.
    pub fn toggle_public(&self, id: &str, user_id: &str) -> Result<TripDocument, StoreError> {
        let trip = self.modify(id, user_id, |trip| {
            trip.is_public = !trip.is_public;
            Ok(())
        })?;
        tracing::info!(target: "trip", id = %id, public = trip.is_public, "Trip visibility toggled");
        Ok(trip)
    }

    /// Soft-deletes a trip. Only the owner may delete it.
    pub fn delete_trip(&self, id: &str, user_id: &str) -> Result<(), StoreError> {
        self.modify(id, user_id, |trip| {
            trip.is_deleted = true;
            Ok(())
        })?;
        tracing::info!(target: "trip", id = %id, "Trip deleted");
        Ok(())
    }

    /// One page of all public trips.
    pub fn list_trips(&self, pagination: Pagination) -> Vec<Arc<TripDocument>> {
        let visible: Vec<RawTrip> = {
            let data = self.data.read();
            data.documents
                .values()
                .filter(|raw| raw_is_visible(raw))
                .cloned()
                .collect()
        };
        paginate(decode_trips(visible), pagination)
    }

    /// Public trips of `user_id`, optionally only those still running on `date`.
    pub fn trips_of_user(&self, user_id: &str, date: Option<NaiveDate>) -> Vec<Arc<TripDocument>> {
        self.user_trips(user_id, date)
            .into_iter()
            .filter(|t| t.is_public)
            .collect()
    }

    /// All live trips of `user_id`, private ones included.
    pub fn my_trips(&self, user_id: &str, date: Option<NaiveDate>) -> Vec<Arc<TripDocument>> {
        self.user_trips(user_id, date)
    }

    fn user_trips(&self, user_id: &str, date: Option<NaiveDate>) -> Vec<Arc<TripDocument>> {
        let owned: Vec<RawTrip> = {
            let data = self.data.read();
            data.documents
                .values()
                .filter(|raw| raw.get("user_id").and_then(|v| v.as_str()) == Some(user_id))
                .cloned()
                .collect()
        };
        decode_trips(owned)
            .into_iter()
            .filter(|t| !t.is_deleted)
            .filter(|t| date.map_or(true, |d| t.end_date >= d))
            .collect()
    }

    /// Every stored document, including deleted and corrupt ones.
    pub fn all_trips(&self) -> Vec<RawTrip> {
        self.data.read().documents.values().cloned().collect()
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.data.read().documents.len()
    }

    /// Serializes snapshot writers of this store.
    pub(crate) fn lock_snapshot(&self) -> MutexGuard<'_, ()> {
        self.snapshot_lock.lock()
    }
}

impl TripStore for Database {
    fn fetch_candidates_by_city(
        &self,
        city: &str,
        date_hint: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<RawTrip>, StoreError> {
        let data = self.data.read();
        let candidates = data
            .in_city(city)
            .filter(|raw| raw_is_visible(raw))
            .filter(|raw| match (date_hint, raw_end_date(raw)) {
                (Some((_, wanted_end)), Some(trip_end)) => trip_end >= wanted_end,
                _ => true,
            })
            .cloned()
            .collect();
        Ok(candidates)
    }

    fn fetch_all_by_city(&self, city: &str) -> Result<Vec<RawTrip>, StoreError> {
        let data = self.data.read();
        let trips = data
            .in_city(city)
            .filter(|raw| raw_is_visible(raw))
            .cloned()
            .collect();
        Ok(trips)
    }
}
