//! API key authentication.
//!
//! Each bearer token maps to the user it acts for. Keys are loaded from the
//! `TRIPSEARCH_API_KEYS` environment variable as `[{"key": "...", "user_id": "..."}]`.

use serde::Deserialize;
use subtle::ConstantTimeEq;

/// A single API key entry from the key configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyEntry {
    /// The bearer token string.
    pub key: String,
    /// User the token authenticates as.
    pub user_id: String,
}

/// Resolved key table.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    entries: Vec<ApiKeyEntry>,
}

impl ApiKeys {
    /// Builds the key table, dropping entries with an empty key or user.
    pub fn from_entries(entries: Vec<ApiKeyEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|e| !e.key.is_empty() && !e.user_id.is_empty())
            .collect();
        Self { entries }
    }

    /// Parses the JSON key list.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<ApiKeyEntry>>(json).map(Self::from_entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a bearer token to its user. Every key is compared in constant time.
    pub fn authenticate(&self, token: &str) -> Option<Caller> {
        let mut found = None;
        for entry in &self.entries {
            if bool::from(entry.key.as_bytes().ct_eq(token.as_bytes())) {
                found = Some(Caller {
                    user_id: entry.user_id.clone(),
                });
            }
        }
        found
    }
}

/// Authenticated caller, inserted as a request extension by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}
