//! SQLite-backed key-value store.
//!
//! # Invariants
//! - Every statement is scoped to this store's namespace.
//! - `multi_remove` is atomic: either all keys go or none do.

use super::{KeyValueStore, KvNamespace, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Durable store over one `kv_entries` namespace. Values are not encrypted.
pub struct SqliteKvStore {
    conn: Connection,
    namespace: KvNamespace,
}

impl SqliteKvStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection, namespace: KvNamespace) -> Self {
        Self { conn, namespace }
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, namespace: KvNamespace) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?, namespace))
    }

    pub fn open_in_memory(namespace: KvNamespace) -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?, namespace))
    }
}

impl KeyValueStore for SqliteKvStore {
    fn namespace(&self) -> KvNamespace {
        self.namespace
    }

    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
                params![self.namespace.as_str(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (namespace, key)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at;",
            params![self.namespace.as_str(), key, value, now_epoch_ms()],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.conn.execute(
            "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
            params![self.namespace.as_str(), key],
        )?;
        Ok(())
    }

    fn multi_remove(&self, keys: &[&str]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for key in keys {
            tx.execute(
                "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
                params![self.namespace.as_str(), key],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
