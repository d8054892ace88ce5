//! Periodic sweep over stored trips that reports corrupt documents.
//!
//! A document is corrupt when it no longer decodes as a trip or fails payload
//! validation. Draft trips (`pre_trip`) are exempt from validation. Findings are logged
//! under the `corrupt` target; documents are never modified.

use tripsearch_core::document::{raw_id, TripDocument};
use tripsearch_core::storage::Database;

/// One corrupt document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptTrip {
    /// Document id, `None` when the document has no usable id.
    pub id: Option<String>,
    pub reason: String,
}

/// Result of one integrity sweep.
#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    /// Number of documents inspected.
    pub checked: usize,
    pub corrupt: Vec<CorruptTrip>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty()
    }
}

/// Checks every stored document, deleted ones included.
pub fn check_integrity(db: &Database) -> IntegrityReport {
    let documents = db.all_trips();
    let mut report = IntegrityReport {
        checked: documents.len(),
        corrupt: Vec::new(),
    };

    for raw in &documents {
        let id = raw_id(raw).map(str::to_string);
        let reason = match TripDocument::from_raw(raw) {
            Err(e) => Some(e.to_string()),
            Ok(trip) if trip.pre_trip => None,
            Ok(trip) => trip.validate().err(),
        };
        if let Some(reason) = reason {
            tracing::warn!(
                target: "corrupt",
                id = %id.as_deref().unwrap_or("-"),
                reason = %reason,
                "Corrupt trip document"
            );
            report.corrupt.push(CorruptTrip { id, reason });
        }
    }

    if report.is_clean() {
        tracing::info!(checked = report.checked, "Integrity check passed");
    } else {
        tracing::warn!(
            target: "corrupt",
            checked = report.checked,
            corrupt = report.corrupt.len(),
            "Integrity check found corrupt trips"
        );
    }
    report
}
