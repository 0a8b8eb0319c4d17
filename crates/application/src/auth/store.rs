//! Typed records on top of the key-value storage port.

use std::sync::Arc;

use authgate_domain::{CsrfState, UserAuthorization};

use crate::ports::{KeyValueStorage, StorageError};

/// Key of the persisted credential.
pub const AUTH_KEY: &str = "auth";

/// Key of the session-scoped CSRF record.
pub const CSRF_KEY: &str = "csrfState";

/// The persisted credential, stored as JSON under [`AUTH_KEY`].
#[derive(Clone)]
pub struct CredentialStorage {
    backend: Arc<dyn KeyValueStorage>,
}

impl CredentialStorage {
    /// Wraps a persistent key-value store.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStorage>) -> Self {
        Self { backend }
    }

    /// Loads the stored credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or parsed.
    pub fn load(&self) -> Result<Option<UserAuthorization>, StorageError> {
        match self.backend.get(AUTH_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(None),
        }
    }

    /// Stores `auth`, or removes the record when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn save(&self, auth: Option<&UserAuthorization>) -> Result<(), StorageError> {
        match auth {
            Some(auth) => self.backend.set(AUTH_KEY, &serde_json::to_string(auth)?),
            None => self.backend.remove(AUTH_KEY),
        }
    }
}

/// The CSRF record of a login in progress, stored under [`CSRF_KEY`].
#[derive(Clone)]
pub struct CsrfStorage {
    backend: Arc<dyn KeyValueStorage>,
}

impl CsrfStorage {
    /// Wraps a session-scoped key-value store.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStorage>) -> Self {
        Self { backend }
    }

    /// Stores the record, replacing a previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn put(&self, state: &CsrfState) -> Result<(), StorageError> {
        self.backend.set(CSRF_KEY, &serde_json::to_string(state)?)
    }

    /// Reads and removes the record. The record is removed even when it
    /// fails to parse, so a callback can only ever be checked once.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read, removed or parsed.
    pub fn take(&self) -> Result<Option<CsrfState>, StorageError> {
        let raw = self.backend.get(CSRF_KEY)?;
        self.backend.remove(CSRF_KEY)?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
