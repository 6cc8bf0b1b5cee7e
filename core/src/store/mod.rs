//! Best-effort key/value cache over an ordered chain of storage backends.
//!
//! # Design
//!
//! - Backends are tried in priority order: durable, session, cookie.
//! - A write lands in the first backend that accepts it (the primary copy).
//!   Redundant writes also copy the value into every later backend.
//! - A read returns the first present, unexpired value in priority order, so
//!   freshness is approximated by backend priority, not timestamps.
//! - Backend failures never reach the caller. A write that no backend
//!   accepts is a no-op and a read that finds nothing returns `None`.
//! - At construction a probe write classifies the store as restricted when
//!   the primary backend rejects writes; writes then skip it.

use crate::types::{CacheKey, StoredEntry};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

pub mod cookie;
pub mod durable;
pub mod session;

pub use cookie::CookieBackend;
pub use durable::DurableBackend;
pub use session::SessionBackend;

pub mod error {
    use super::durable::error::DatabaseError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum BackendError {
        #[error("Database error: {0}")]
        Database(#[from] DatabaseError),

        #[error("Quota exceeded: {size} bytes exceeds {max} bytes")]
        QuotaExceeded { size: usize, max: usize },

        #[error("Storage is disabled")]
        Disabled,

        #[error("Key cannot be stored in this backend: {0}")]
        UnsupportedKey(String),

        #[error("Stored entry is corrupt: {0}")]
        Corrupt(String),
    }
}

use error::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Durable,
    Session,
    Cookie,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Durable => write!(f, "durable"),
            BackendKind::Session => write!(f, "session"),
            BackendKind::Cookie => write!(f, "cookie"),
        }
    }
}

/// One storage mechanism in the fallback chain.
pub trait StorageBackend {
    fn kind(&self) -> BackendKind;

    fn get(&self, key: &CacheKey) -> Result<Option<StoredEntry>, BackendError>;

    /// Inserts or replaces the entry for `key`.
    fn set(&mut self, key: &CacheKey, entry: &StoredEntry) -> Result<(), BackendError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &CacheKey) -> Result<(), BackendError>;

    /// Drops every entry expired at `now` and returns how many were dropped.
    fn sweep_expired(&mut self, now: SystemTime) -> Result<usize, BackendError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub ttl: Option<Duration>,
    /// Also copy the value into every backend after the primary copy.
    pub redundant: bool,
}

impl WriteOptions {
    pub fn expiring(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            redundant: false,
        }
    }

    pub fn redundant(mut self) -> Self {
        self.redundant = true;
        self
    }
}

/// Backends that accepted a write, primary copy first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub stored: Vec<BackendKind>,
}

impl WriteReport {
    pub fn is_stored(&self) -> bool {
        !self.stored.is_empty()
    }

    pub fn primary(&self) -> Option<BackendKind> {
        self.stored.first().copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<(BackendKind, usize)>,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.removed.iter().map(|(_, count)| count).sum()
    }
}

const PROBE_KEY: &str = "__harmonia_probe__";

pub struct HybridStore {
    backends: Vec<Box<dyn StorageBackend>>,
    restricted: bool,
}

impl HybridStore {
    /// Creates a store over `backends`, highest priority first, and probes
    /// the primary backend.
    pub fn new(backends: Vec<Box<dyn StorageBackend>>) -> Self {
        let mut store = Self {
            backends,
            restricted: false,
        };
        store.restricted = !store.probe_primary();

        if store.restricted {
            warn!(
                backends = ?store.backend_kinds(),
                "primary cache backend rejected the probe; writes use the fallback chain"
            );
        } else {
            info!(backends = ?store.backend_kinds(), "cache store ready");
        }
        store
    }

    /// Write-then-remove of a throwaway key on the primary backend.
    fn probe_primary(&mut self) -> bool {
        let Some(primary) = self.backends.first_mut() else {
            return true;
        };
        // Constant, trimmed and non-empty.
        let key = unsafe { CacheKey::new_unchecked(PROBE_KEY.to_string()) };
        let entry = StoredEntry::new("1".to_string(), SystemTime::UNIX_EPOCH, None);

        match primary.set(&key, &entry).and_then(|()| primary.remove(&key)) {
            Ok(()) => true,
            Err(err) => {
                debug!(backend = %primary.kind(), %err, "cache probe failed");
                false
            }
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    pub fn backend_kinds(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    pub fn backend(&self, kind: BackendKind) -> Option<&dyn StorageBackend> {
        self.backends
            .iter()
            .find(|b| b.kind() == kind)
            .map(|b| b.as_ref())
    }
}

/// Cache operations.
impl HybridStore {
    /// Serializes `value` and writes it down the fallback chain.
    pub fn write<T: Serialize + ?Sized>(
        &mut self,
        key: &CacheKey,
        value: &T,
        options: &WriteOptions,
        now: SystemTime,
    ) -> WriteReport {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%key, %err, "cache value is not serializable");
                return WriteReport::default();
            }
        };
        let entry = StoredEntry::new(payload, now, options.ttl);
        let skip = usize::from(self.restricted);

        // The skipped primary is still read first, so drop its copy.
        if self.restricted {
            if let Some(primary) = self.backends.first_mut() {
                Self::discard(primary.as_mut(), key);
            }
        }

        let mut report = WriteReport::default();
        for backend in self.backends.iter_mut().skip(skip) {
            if report.is_stored() && !options.redundant {
                break;
            }

            match backend.set(key, &entry) {
                Ok(()) => report.stored.push(backend.kind()),
                Err(err) => {
                    debug!(%key, backend = %backend.kind(), %err, "cache write failed");
                    // An older copy here would shadow the value written further down.
                    if !report.is_stored() {
                        Self::discard(backend.as_mut(), key);
                    }
                }
            }
        }

        if !report.is_stored() {
            warn!(%key, "cache write failed on every backend");
        }
        report
    }

    /// Returns the first unexpired value for `key` that deserializes into `T`.
    pub fn read<T: DeserializeOwned>(&mut self, key: &CacheKey, now: SystemTime) -> Option<T> {
        for backend in self.backends.iter_mut() {
            let entry = match backend.get(key) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(err) => {
                    debug!(%key, backend = %backend.kind(), %err, "cache read failed");
                    continue;
                }
            };

            if entry.is_expired(now) {
                Self::discard(backend.as_mut(), key);
                continue;
            }

            match serde_json::from_str(&entry.payload) {
                Ok(value) => return Some(value),
                Err(err) => {
                    debug!(%key, backend = %backend.kind(), %err, "cached payload has unexpected shape");
                }
            }
        }
        None
    }

    /// Removes `key` from every backend.
    pub fn remove(&mut self, key: &CacheKey) {
        for backend in self.backends.iter_mut() {
            Self::discard(backend.as_mut(), key);
        }
    }

    /// Best-effort removal of one backend's copy.
    fn discard(backend: &mut dyn StorageBackend, key: &CacheKey) {
        if let Err(err) = backend.remove(key) {
            debug!(%key, backend = %backend.kind(), %err, "cache remove failed");
        }
    }

    /// Drops expired entries from every backend.
    pub fn sweep_expired(&mut self, now: SystemTime) -> SweepReport {
        let mut report = SweepReport::default();
        for backend in self.backends.iter_mut() {
            match backend.sweep_expired(now) {
                Ok(count) => report.removed.push((backend.kind(), count)),
                Err(err) => {
                    debug!(backend = %backend.kind(), %err, "cache sweep failed");
                }
            }
        }
        report
    }
}
