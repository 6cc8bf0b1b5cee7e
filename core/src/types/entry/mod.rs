//! Cache entries as handed to and from storage backends.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

pub(crate) mod versioned_entry;

use versioned_entry::latest_entry;

/// A JSON payload with its write time and optional expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub payload: String,
    pub written_at: SystemTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<SystemTime>,
}

impl StoredEntry {
    pub fn new(payload: String, now: SystemTime, ttl: Option<Duration>) -> Self {
        Self {
            payload,
            written_at: now,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
        }
    }

    /// An entry is expired once `now` reaches `expires_at`.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    pub(crate) fn from_latest_entry(entry: latest_entry::Entry) -> Self {
        Self {
            payload: entry.payload,
            written_at: entry.written_at,
            expires_at: entry.expires_at,
        }
    }

    pub(crate) fn to_latest_entry(&self) -> latest_entry::Entry {
        latest_entry::Entry {
            payload: self.payload.clone(),
            written_at: self.written_at,
            expires_at: self.expires_at,
        }
    }
}
