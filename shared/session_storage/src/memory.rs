use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::{KeyValueStore, StorageResult};

/// Process-local store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put_all(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        let mut stored = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            stored.insert((*key).to_owned(), value.clone());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        let mut stored = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            stored.remove(*key);
        }
        Ok(())
    }
}
