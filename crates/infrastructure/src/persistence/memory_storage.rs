//! Session-scoped key-value storage.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use authgate_application::ports::{KeyValueStorage, StorageError};

/// Key-value storage kept in memory for the lifetime of the process.
///
/// Plays the role of the browser's `sessionStorage`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();

        storage.set("csrfState", "one").unwrap();
        storage.set("csrfState", "two").unwrap();
        assert_eq!(storage.get("csrfState").unwrap().as_deref(), Some("two"));

        storage.remove("csrfState").unwrap();
        storage.remove("csrfState").unwrap();
        assert_eq!(storage.get("csrfState").unwrap(), None);
    }
}
