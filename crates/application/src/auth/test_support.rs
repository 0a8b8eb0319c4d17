//! Fakes shared by the auth and login tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use authgate_domain::{UserAuthorization, UserDetails};
use chrono::{DateTime, TimeZone, Utc};

use crate::ports::{ApiError, AuthApi, Clock, KeyValueStorage, StorageError};

/// Wall clock pinned at construction.
pub(crate) struct FixedClock(pub(crate) Mutex<DateTime<Utc>>);

impl FixedClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub(crate) fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub(crate) fn credential(valid_until: DateTime<Utc>) -> UserAuthorization {
    credential_with_token("a1b2c3d4e5f6a7b8c9d0", valid_until)
}

pub(crate) fn credential_with_token(token: &str, valid_until: DateTime<Utc>) -> UserAuthorization {
    UserAuthorization {
        access_token: token.to_string(),
        valid_until,
        user_details: UserDetails {
            id: "12826".to_string(),
            login: "twitch".to_string(),
            display_name: "Twitch".to_string(),
            user_type: String::new(),
            broadcaster_type: "partner".to_string(),
            description: "Twitch is where millions of people come together.".to_string(),
            profile_image_url: "https://static-cdn.jtvnw.net/jtv_user_pictures/twitch-profile.png"
                .to_string(),
            offline_image_url: String::new(),
            view_count: 1_000,
            created_at: Utc.with_ymd_and_hms(2007, 5, 22, 10, 37, 47).unwrap(),
        },
    }
}

/// Decrements the in-flight counter when a call finishes or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted `AuthApi`.
///
/// Exchange outcomes are keyed by code; refresh outcomes are consumed in
/// order. Unscripted calls fail with a 500.
pub(crate) struct MockApi {
    latency: Duration,
    exchanges: Mutex<HashMap<String, Result<UserAuthorization, ApiError>>>,
    refreshes: Mutex<Vec<Result<UserAuthorization, ApiError>>>,
    exchange_calls: Mutex<Vec<String>>,
    refresh_calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
}

impl MockApi {
    pub(crate) fn new(latency: Duration) -> Self {
        Self {
            latency,
            exchanges: Mutex::new(HashMap::new()),
            refreshes: Mutex::new(Vec::new()),
            exchange_calls: Mutex::new(Vec::new()),
            refresh_calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn on_exchange(
        self,
        code: &str,
        outcome: Result<UserAuthorization, ApiError>,
    ) -> Self {
        self.exchanges
            .lock()
            .unwrap()
            .insert(code.to_string(), outcome);
        self
    }

    pub(crate) fn on_refresh(self, outcome: Result<UserAuthorization, ApiError>) -> Self {
        self.refreshes.lock().unwrap().push(outcome);
        self
    }

    pub(crate) fn exchange_calls(&self) -> Vec<String> {
        self.exchange_calls.lock().unwrap().clone()
    }

    pub(crate) fn refresh_calls(&self) -> Vec<String> {
        self.refresh_calls.lock().unwrap().clone()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn unscripted() -> ApiError {
        ApiError::Status {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        }
    }
}

pub(crate) fn unauthorized() -> ApiError {
    ApiError::Status {
        status: 401,
        status_text: "Unauthorized".to_string(),
    }
}

#[async_trait]
impl AuthApi for MockApi {
    async fn exchange_code(&self, code: &str) -> Result<UserAuthorization, ApiError> {
        self.exchange_calls.lock().unwrap().push(code.to_string());
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        tokio::time::sleep(self.latency).await;
        self.exchanges
            .lock()
            .unwrap()
            .remove(code)
            .unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn refresh(&self, access_token: &str) -> Result<UserAuthorization, ApiError> {
        self.refresh_calls
            .lock()
            .unwrap()
            .push(access_token.to_string());
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        tokio::time::sleep(self.latency).await;
        let mut refreshes = self.refreshes.lock().unwrap();
        if refreshes.is_empty() {
            Err(Self::unscripted())
        } else {
            refreshes.remove(0)
        }
    }
}

/// In-memory key-value storage.
#[derive(Default)]
pub(crate) struct MapStorage {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MapStorage {
    pub(crate) fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Number of `set` and `remove` calls so far.
    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStorage for MapStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
