//! Durable backend on a redb database file.
//!
//! Tables:
//! - `entries`: CacheKey → VersionedEntry
//! - `ttl_expiry`: TtlKey → () for entries that carry an expiry

use super::error::BackendError;
use super::{BackendKind, StorageBackend};
use crate::types::entry::versioned_entry::VersionedEntry;
use crate::types::{CacheKey, Config, StoredEntry, TtlKey};
use error::DatabaseError;
use redb::{ReadableDatabase, TableDefinition, WriteTransaction};
use std::time::SystemTime;
use tracing::info;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum DatabaseError {
        #[error("Database error: {0}")]
        Redb(#[from] redb::DatabaseError),

        #[error("Table error: {0}")]
        TableError(#[from] redb::TableError),

        #[error("Storage error: {0}")]
        StorageError(#[from] redb::StorageError),

        #[error("Transaction error: {0}")]
        TransactionError(#[from] redb::TransactionError),

        #[error("Commit error: {0}")]
        CommitError(#[from] redb::CommitError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Entry has unsupported format version {0:?}")]
        UnsupportedVersion(Option<u8>),
    }
}

mod ttl_table;

use ttl_table::TtlTable;

const ENTRY_TABLE: TableDefinition<CacheKey, VersionedEntry> = TableDefinition::new("entries");

const EXPIRY_INDEX: TtlTable = TtlTable::new("ttl_expiry");

pub struct DurableBackend {
    db: redb::Database,
}

impl DurableBackend {
    /// Creates or opens the database at `config.db_path()`.
    pub fn open(config: &Config) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&config.base_path)?;

        let db = redb::Database::create(config.db_path())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRY_TABLE)?;
            EXPIRY_INDEX.init(&write_txn)?;
        }
        write_txn.commit()?;

        info!(path = %config.db_path().display(), "opened durable cache");
        Ok(Self { db })
    }

    fn extract(versioned: VersionedEntry) -> Result<StoredEntry, DatabaseError> {
        match versioned {
            VersionedEntry::V1(entry) => Ok(StoredEntry::from_latest_entry(entry)),
            VersionedEntry::Unreadable { version } => {
                Err(DatabaseError::UnsupportedVersion(version))
            }
        }
    }

    /// Drops the index row of an entry that is being replaced or removed.
    fn unindex(
        txn: &WriteTransaction,
        key: &CacheKey,
        previous: Option<VersionedEntry>,
    ) -> Result<(), DatabaseError> {
        let expires_at = previous
            .and_then(VersionedEntry::into_latest)
            .and_then(|entry| entry.expires_at);

        if let Some(expires_at) = expires_at {
            EXPIRY_INDEX.remove(
                txn,
                &TtlKey {
                    expires_at,
                    key: key.clone(),
                },
            )?;
        }
        Ok(())
    }

    fn get_entry(&self, key: &CacheKey) -> Result<Option<StoredEntry>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRY_TABLE)?;

        match table.get(key)? {
            None => Ok(None),
            Some(guard) => Self::extract(guard.value()).map(Some),
        }
    }

    fn set_entry(&mut self, key: &CacheKey, entry: &StoredEntry) -> Result<(), DatabaseError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTRY_TABLE)?;

            let previous = table
                .insert(key, &VersionedEntry::latest(entry.to_latest_entry()))?
                .map(|g| g.value());
            Self::unindex(&write_txn, key, previous)?;

            if let Some(expires_at) = entry.expires_at {
                EXPIRY_INDEX.insert(
                    &write_txn,
                    &TtlKey {
                        expires_at,
                        key: key.clone(),
                    },
                )?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove_entry(&mut self, key: &CacheKey) -> Result<(), DatabaseError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTRY_TABLE)?;
            let previous = table.remove(key)?.map(|g| g.value());
            Self::unindex(&write_txn, key, previous)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn sweep(&mut self, now: SystemTime) -> Result<usize, DatabaseError> {
        let write_txn = self.db.begin_write()?;
        let expired = EXPIRY_INDEX.expired(&write_txn, now)?;
        {
            let mut table = write_txn.open_table(ENTRY_TABLE)?;
            for ttl_key in &expired {
                EXPIRY_INDEX.remove(&write_txn, ttl_key)?;
                table.remove(&ttl_key.key)?;
            }
        }
        write_txn.commit()?;
        Ok(expired.len())
    }
}

impl StorageBackend for DurableBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Durable
    }

    fn get(&self, key: &CacheKey) -> Result<Option<StoredEntry>, BackendError> {
        Ok(self.get_entry(key)?)
    }

    fn set(&mut self, key: &CacheKey, entry: &StoredEntry) -> Result<(), BackendError> {
        Ok(self.set_entry(key, entry)?)
    }

    fn remove(&mut self, key: &CacheKey) -> Result<(), BackendError> {
        Ok(self.remove_entry(key)?)
    }

    fn sweep_expired(&mut self, now: SystemTime) -> Result<usize, BackendError> {
        Ok(self.sweep(now)?)
    }
}
