//! Expiry index for the durable backend.
//!
//! Entries are `TtlKey { expires_at, key }` sorted by expiry, so a sweep
//! reads from the front and stops at the first live entry.

use super::error::DatabaseError;
#[cfg(test)]
use crate::types::CacheKey;
use crate::types::TtlKey;
#[cfg(test)]
use redb::ReadTransaction;
use redb::{ReadableTable, TableDefinition, WriteTransaction};
use std::time::SystemTime;

pub struct TtlTable {
    definition: TableDefinition<'static, TtlKey, ()>,
}

impl TtlTable {
    pub const fn new(name: &'static str) -> Self {
        Self {
            definition: TableDefinition::new(name),
        }
    }

    /// Initializes the table in the database (creates if not exists).
    pub fn init(&self, txn: &WriteTransaction) -> Result<(), DatabaseError> {
        txn.open_table(self.definition)?;
        Ok(())
    }

    pub fn insert(&self, txn: &WriteTransaction, ttl_key: &TtlKey) -> Result<(), DatabaseError> {
        let mut table = txn.open_table(self.definition)?;
        table.insert(ttl_key, &())?;
        Ok(())
    }

    /// Returns `true` if the key was present, `false` otherwise.
    pub fn remove(&self, txn: &WriteTransaction, ttl_key: &TtlKey) -> Result<bool, DatabaseError> {
        let mut table = txn.open_table(self.definition)?;
        Ok(table.remove(ttl_key)?.is_some())
    }

    /// Entries with `expires_at <= now`, oldest first.
    pub fn expired(
        &self,
        txn: &WriteTransaction,
        now: SystemTime,
    ) -> Result<Vec<TtlKey>, DatabaseError> {
        let table = txn.open_table(self.definition)?;
        let mut expired = Vec::new();

        for entry in table.iter()? {
            let (ttl_key_guard, _) = entry?;
            let ttl_key = ttl_key_guard.value();

            if ttl_key.expires_at <= now {
                expired.push(ttl_key);
            } else {
                // Table is sorted by expiry, so we can stop early
                break;
            }
        }

        Ok(expired)
    }

    /// Returns all keys in this TTL table in expiry order.
    #[cfg(test)]
    pub fn all_keys(&self, txn: &ReadTransaction) -> Result<Vec<CacheKey>, DatabaseError> {
        let table = txn.open_table(self.definition)?;
        let mut keys = Vec::new();

        for entry in table.iter()? {
            let (ttl_key_guard, _) = entry?;
            keys.push(ttl_key_guard.value().key);
        }

        Ok(keys)
    }
}
