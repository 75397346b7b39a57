//! Device-local key-value persistence for session state.
//!
//! # Responsibility
//! - Define the string-keyed storage contract used by the session store.
//! - Provide SQLite (durable) and in-memory implementations.
//! - Decode possibly-absent JSON entries without failing callers.
//!
//! # Invariants
//! - Values are opaque strings; JSON encoding is the caller's concern.
//! - A missing key and a removed key are indistinguishable.
//! - `local` and `secure` namespaces never see each other's entries.

use crate::db::DbError;
use log::warn;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod keys;
mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage namespace. `Secure` holds credentials only.
///
/// [`SqliteKvStore`] writes values in plaintext. On device, `Secure` is
/// backed by the platform keystore instead of the SQLite file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KvNamespace {
    Local,
    Secure,
}

impl KvNamespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Secure => "secure",
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Backend lock was poisoned by a panicking writer.
    Poisoned(KvNamespace),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Poisoned(namespace) => {
                write!(f, "{} store is poisoned", namespace.as_str())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Poisoned(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed storage contract.
pub trait KeyValueStore: Send {
    fn namespace(&self) -> KvNamespace;
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove_item(&self, key: &str) -> StoreResult<()>;

    /// Removes several keys; absent keys are ignored.
    fn multi_remove(&self, keys: &[&str]) -> StoreResult<()> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }
}

/// Reads one raw entry, mapping read failures to `None`.
///
/// Empty strings count as absent.
pub fn read_text(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get_item(key) {
        Ok(Some(value)) if !value.is_empty() => Some(value),
        Ok(_) => None,
        Err(err) => {
            warn!(
                "event=store_read module=store status=error namespace={} key={} error={}",
                store.namespace().as_str(),
                key,
                err
            );
            None
        }
    }
}

/// Reads and JSON-decodes one entry.
///
/// Missing, unreadable and malformed entries all decode to `None`; the
/// malformed case is logged so corrupt state stays visible in diagnostics.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = read_text(store, key)?;
    match serde_json::from_str::<Option<T>>(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=store_decode module=store status=error namespace={} key={} error={}",
                store.namespace().as_str(),
                key,
                err
            );
            None
        }
    }
}
