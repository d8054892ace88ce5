//! Core document types for tripsearch.
//!
//! A [`TripDocument`] is the typed view of a stored trip. The store keeps trips as raw
//! JSON ([`RawTrip`]) so documents written by older clients survive; they are decoded into
//! `TripDocument` when read, and documents that fail to decode are treated as corrupt.
//!
//! The schema follows the latest trip revision. `budget` and `accommodations` are
//! deprecated: they are still read and written for legacy clients, and a trip without them
//! simply misses the matching search criteria.

use crate::config;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A stored trip in its raw, schemaless form.
pub type RawTrip = serde_json::Value;

/// Destination city of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Stable city identifier, also the primary search token.
    pub id: String,
    /// Place identifier from the geocoding provider.
    pub place_id: String,
    /// Human-readable name, e.g. `Berlin`.
    pub title: String,
}

impl City {
    /// Normalized tokens under which this city is indexed.
    ///
    /// A search token finds the city when its normalized form equals any of these, so
    /// `id`, `place_id` and `title` all compare case-insensitively.
    pub fn index_keys(&self) -> Vec<String> {
        let mut keys = vec![
            normalize_token(&self.id),
            normalize_token(&self.place_id),
            normalize_token(&self.title),
        ];
        keys.retain(|k| !k.is_empty());
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Lowercases and trims a city or mood token for index lookups and comparisons.
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

/// A trip listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDocument {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub description_money: Option<String>,
    /// Owner of the trip.
    pub user_id: String,
    pub city: City,
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,
    #[serde(with = "flexible_date")]
    pub end_date: NaiveDate,
    /// Mood tags, e.g. `beach`, `culture`.
    #[serde(default)]
    pub moods: Vec<String>,
    pub persons: u32,
    pub days: u32,
    /// Deprecated: dropped from the current trip schema.
    #[serde(default)]
    pub budget: Option<f64>,
    /// Deprecated: superseded by the `accommodation` flag.
    #[serde(default)]
    pub accommodations: Option<u32>,
    #[serde(default)]
    pub accommodation: bool,
    #[serde(default)]
    pub accommodation_equipment: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub pics: Vec<String>,
    #[serde(default = "default_true", alias = "active")]
    pub is_public: bool,
    #[serde(default, alias = "delete")]
    pub is_deleted: bool,
    /// Draft trips created before the owner finished the listing.
    #[serde(default)]
    pub pre_trip: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl TripDocument {
    /// Decodes a raw stored trip.
    pub fn from_raw(raw: &RawTrip) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }

    /// Encodes this trip into its stored form.
    pub fn to_raw(&self) -> RawTrip {
        // Plain structs of strings, numbers and dates always serialize.
        serde_json::to_value(self).unwrap_or(RawTrip::Null)
    }

    /// Whether this trip may appear in public listings and search.
    pub fn is_visible(&self) -> bool {
        self.is_public && !self.is_deleted
    }

    /// Whether the trip contains the given mood (case-insensitive).
    pub fn has_mood(&self, mood: &str) -> bool {
        let mood = normalize_token(mood);
        self.moods.iter().any(|m| normalize_token(m) == mood)
    }
}

impl TripDocument {
    /// The writable part of this trip.
    pub fn to_draft(&self) -> TripDraft {
        TripDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            description_money: self.description_money.clone(),
            city: self.city.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            moods: self.moods.clone(),
            persons: self.persons,
            days: self.days,
            budget: self.budget,
            accommodations: self.accommodations,
            accommodation: self.accommodation,
            accommodation_equipment: self.accommodation_equipment.clone(),
            locations: self.locations.clone(),
            pics: self.pics.clone(),
            is_public: self.is_public,
            pre_trip: self.pre_trip,
        }
    }

    /// Checks the invariants every stored trip must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        self.to_draft().validate()
    }
}

/// Client-supplied trip contents for create and update.
///
/// Identity, ownership, deletion and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TripDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub description_money: Option<String>,
    pub city: City,
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,
    #[serde(with = "flexible_date")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub moods: Vec<String>,
    pub persons: u32,
    pub days: u32,
    /// Deprecated.
    #[serde(default)]
    pub budget: Option<f64>,
    /// Deprecated.
    #[serde(default)]
    pub accommodations: Option<u32>,
    #[serde(default)]
    pub accommodation: bool,
    #[serde(default)]
    pub accommodation_equipment: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub pics: Vec<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub pre_trip: bool,
}

impl TripDraft {
    /// Field-level validation of a trip payload.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".into());
        }
        if self.title.chars().count() > config::MAX_TITLE_LEN {
            return Err(format!(
                "title must be at most {} characters",
                config::MAX_TITLE_LEN
            ));
        }
        if self.description.trim().is_empty() {
            return Err("description is required".into());
        }
        if self.description.len() > config::MAX_DESCRIPTION_LEN {
            return Err(format!(
                "description must be at most {} bytes",
                config::MAX_DESCRIPTION_LEN
            ));
        }
        if self.city.id.trim().is_empty()
            || self.city.place_id.trim().is_empty()
            || self.city.title.trim().is_empty()
        {
            return Err("city requires id, place_id and title".into());
        }
        if self.start_date > self.end_date {
            return Err("start_date must not be after end_date".into());
        }
        if self.persons == 0 {
            return Err("persons must be at least 1".into());
        }
        if self.days == 0 {
            return Err("days must be at least 1".into());
        }
        if self.moods.len() > config::MAX_MOODS {
            return Err(format!("at most {} moods are allowed", config::MAX_MOODS));
        }
        if self.moods.iter().any(|m| m.trim().is_empty()) {
            return Err("moods must not be empty".into());
        }
        if self.pics.len() > config::MAX_PICS {
            return Err(format!("at most {} pictures are allowed", config::MAX_PICS));
        }
        if self.budget.is_some_and(|b| !b.is_finite() || b < 0.0) {
            return Err("budget must be a non-negative number".into());
        }
        Ok(())
    }

    /// Builds the stored trip for a new listing.
    pub fn into_document(self, id: String, user_id: String, now: DateTime<Utc>) -> TripDocument {
        TripDocument {
            id,
            title: self.title,
            description: self.description,
            description_money: self.description_money,
            user_id,
            city: self.city,
            start_date: self.start_date,
            end_date: self.end_date,
            moods: self.moods,
            persons: self.persons,
            days: self.days,
            budget: self.budget,
            accommodations: self.accommodations,
            accommodation: self.accommodation,
            accommodation_equipment: self.accommodation_equipment,
            locations: self.locations,
            pics: self.pics,
            is_public: self.is_public,
            is_deleted: false,
            pre_trip: self.pre_trip,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Decodes raw trips, skipping and logging documents that do not match the trip schema.
pub fn decode_trips<I>(raw: I) -> Vec<Arc<TripDocument>>
where
    I: IntoIterator<Item = RawTrip>,
{
    raw.into_iter()
        .filter_map(|doc| match TripDocument::from_raw(&doc) {
            Ok(trip) => Some(Arc::new(trip)),
            Err(e) => {
                tracing::warn!(
                    target: "corrupt",
                    id = %raw_id(&doc).unwrap_or("-"),
                    error = %e,
                    "Skipping malformed trip document"
                );
                None
            }
        })
        .collect()
}

/// The `id` of a raw trip, if it has a string one.
pub fn raw_id(raw: &RawTrip) -> Option<&str> {
    raw.get("id").and_then(|v| v.as_str())
}

/// Parses a calendar date given either as `YYYY-MM-DD` or as an RFC 3339 timestamp.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

/// Serde adapter for dates stored either as plain dates or as full timestamps.
pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub fn sample_raw(id: &str) -> RawTrip {
        json!({
            "id": id,
            "title": "Weekend at the lake",
            "description": "Swimming and barbecue",
            "user_id": "u1",
            "city": { "id": "berlin", "place_id": "ChIJAVkDPzdOqEcRcDteW0YgIQQ", "title": "Berlin" },
            "start_date": "2026-07-01",
            "end_date": "2026-07-10",
            "moods": ["beach"],
            "persons": 2,
            "days": 3
        })
    }

    #[test]
    fn test_decode_minimal_trip_applies_defaults() {
        let trip = TripDocument::from_raw(&sample_raw("t1")).unwrap();
        assert_eq!(trip.id, "t1");
        assert!(trip.is_public);
        assert!(!trip.is_deleted);
        assert!(trip.budget.is_none());
        assert!(trip.is_visible());
    }

    #[test]
    fn test_decode_legacy_flag_names() {
        let mut raw = sample_raw("t1");
        raw["active"] = json!(false);
        raw["delete"] = json!(true);
        let trip = TripDocument::from_raw(&raw).unwrap();
        assert!(!trip.is_public);
        assert!(trip.is_deleted);
    }

    #[test]
    fn test_decode_timestamp_dates() {
        let mut raw = sample_raw("t1");
        raw["start_date"] = json!("2026-07-01T10:00:00Z");
        let trip = TripDocument::from_raw(&raw).unwrap();
        assert_eq!(trip.start_date, NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
    }

    #[test]
    fn test_decode_missing_city_fails() {
        let mut raw = sample_raw("t1");
        raw.as_object_mut().unwrap().remove("city");
        assert!(TripDocument::from_raw(&raw).is_err());
    }

    #[test]
    fn test_raw_roundtrip_keeps_dates_plain() {
        let trip = TripDocument::from_raw(&sample_raw("t1")).unwrap();
        let raw = trip.to_raw();
        assert_eq!(raw["start_date"], "2026-07-01");
        assert_eq!(TripDocument::from_raw(&raw).unwrap(), trip);
    }

    #[test]
    fn test_city_index_keys_are_normalized() {
        let trip = TripDocument::from_raw(&sample_raw("t1")).unwrap();
        let keys = trip.city.index_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"berlin".to_string()));
        assert!(keys.contains(&normalize_token("ChIJAVkDPzdOqEcRcDteW0YgIQQ")));
        assert!(!keys.contains(&normalize_token("  ")));
    }

    #[test]
    fn test_city_index_keys_deduplicated() {
        let city = City {
            id: "berlin".into(),
            place_id: "p1".into(),
            title: "Berlin".into(),
        };
        assert_eq!(city.index_keys(), vec!["berlin".to_string(), "p1".to_string()]);
    }

    #[test]
    fn test_has_mood_case_insensitive() {
        let trip = TripDocument::from_raw(&sample_raw("t1")).unwrap();
        assert!(trip.has_mood("Beach"));
        assert!(!trip.has_mood("ski"));
    }

    pub fn sample_draft() -> TripDraft {
        TripDocument::from_raw(&sample_raw("t1")).unwrap().to_draft()
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(sample_draft().validate().is_ok());
    }

    #[test]
    fn test_draft_rejects_blank_title() {
        let mut draft = sample_draft();
        draft.title = "  ".into();
        assert_eq!(draft.validate(), Err("title is required".to_string()));
    }

    #[test]
    fn test_draft_rejects_inverted_dates() {
        let mut draft = sample_draft();
        draft.end_date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_draft_rejects_too_many_moods() {
        let mut draft = sample_draft();
        draft.moods = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_draft_rejects_zero_persons() {
        let mut draft = sample_draft();
        draft.persons = 0;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_draft_rejects_unknown_fields() {
        let mut raw = serde_json::to_value(sample_draft()).unwrap();
        raw["category"] = json!(["beach"]);
        assert!(serde_json::from_value::<TripDraft>(raw).is_err());
    }

    #[test]
    fn test_into_document_assigns_identity() {
        let now = Utc::now();
        let trip = sample_draft().into_document("new".into(), "owner".into(), now);
        assert_eq!(trip.id, "new");
        assert_eq!(trip.user_id, "owner");
        assert!(!trip.is_deleted);
        assert_eq!(trip.created_at, Some(now));
    }

    #[test]
    fn test_decode_trips_skips_malformed() {
        let broken = json!({ "id": "broken", "title": "no city" });
        let decoded = decode_trips(vec![sample_raw("a"), broken, sample_raw("b")]);
        let ids: Vec<&str> = decoded.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2026-01-31").is_some());
        assert!(parse_date("2026-01-31T23:30:00+02:00").is_some());
        assert!(parse_date("31.01.2026").is_none());
        assert!(parse_date("").is_none());
    }
}
