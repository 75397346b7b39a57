//! In-memory key-value store.

use super::{KeyValueStore, KvNamespace, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Process-local store; contents vanish with the value.
#[derive(Debug)]
pub struct MemoryKvStore {
    namespace: KvNamespace,
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new(namespace: KvNamespace) -> Self {
        Self {
            namespace,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn local() -> Self {
        Self::new(KvNamespace::Local)
    }

    pub fn secure() -> Self {
        Self::new(KvNamespace::Secure)
    }

    /// Snapshot of stored keys, sorted.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Poisoned(self.namespace))
    }
}

impl KeyValueStore for MemoryKvStore {
    fn namespace(&self) -> KvNamespace {
        self.namespace
    }

    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
