//! Key-value storage port
//!
//! Mirrors the browser's `localStorage` / `sessionStorage` contract: string
//! keys, string values, synchronous access. The state manager writes through
//! this port inside a state transition, so it must not suspend.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// String key-value store.
///
/// One implementation survives restarts (the persistent store), another
/// lives only as long as the current session.
///
/// # Blocking
///
/// The state manager calls [`KeyValueStorage::set`] or
/// [`KeyValueStorage::remove`] exactly once per state transition, while it
/// holds its state lock and possibly on a Tokio worker thread. A file-backed
/// implementation therefore blocks that worker, and every other manager
/// call, for the duration of one small write. Keep implementations to a
/// single short write per call; anything slower belongs behind a cache.
pub trait KeyValueStorage: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
