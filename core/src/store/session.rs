//! In-process backend scoped to the lifetime of its owner.

use super::error::BackendError;
use super::{BackendKind, StorageBackend};
use crate::types::{CacheKey, StoredEntry};
use std::collections::HashMap;
use std::time::SystemTime;

/// Counts key and payload bytes against a quota, like browser storage does.
pub struct SessionBackend {
    entries: HashMap<CacheKey, StoredEntry>,
    quota_bytes: usize,
    used_bytes: usize,
}

fn entry_size(key: &CacheKey, entry: &StoredEntry) -> usize {
    key.len() + entry.payload.len()
}

impl SessionBackend {
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes,
            used_bytes: 0,
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageBackend for SessionBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Session
    }

    fn get(&self, key: &CacheKey) -> Result<Option<StoredEntry>, BackendError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &CacheKey, entry: &StoredEntry) -> Result<(), BackendError> {
        let replaced = self
            .entries
            .get(key)
            .map(|previous| entry_size(key, previous))
            .unwrap_or(0);
        let size = self.used_bytes - replaced + entry_size(key, entry);
        if size > self.quota_bytes {
            return Err(BackendError::QuotaExceeded {
                size,
                max: self.quota_bytes,
            });
        }

        self.entries.insert(key.clone(), entry.clone());
        self.used_bytes = size;
        Ok(())
    }

    fn remove(&mut self, key: &CacheKey) -> Result<(), BackendError> {
        if let Some(previous) = self.entries.remove(key) {
            self.used_bytes -= entry_size(key, &previous);
        }
        Ok(())
    }

    fn sweep_expired(&mut self, now: SystemTime) -> Result<usize, BackendError> {
        let before = self.entries.len();
        let mut freed = 0;
        self.entries.retain(|key, entry| {
            let expired = entry.is_expired(now);
            if expired {
                freed += entry_size(key, entry);
            }
            !expired
        });
        self.used_bytes -= freed;
        Ok(before - self.entries.len())
    }
}

#[cfg(test)]
mod tests;
