//! Credential types returned by the service's `/api/v1/auth` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Twitch profile of the logged-in user.
///
/// Opaque passthrough data: the client never interprets these fields beyond
/// displaying them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    /// Twitch user id.
    pub id: String,
    /// Login name (lowercase).
    pub login: String,
    /// Display name.
    pub display_name: String,
    /// User type (`staff`, `admin`, `global_mod` or empty).
    #[serde(rename = "type")]
    pub user_type: String,
    /// Broadcaster type (`partner`, `affiliate` or empty).
    pub broadcaster_type: String,
    /// Channel description.
    pub description: String,
    /// Profile image URL.
    pub profile_image_url: String,
    /// Offline banner URL.
    pub offline_image_url: String,
    /// Total channel views.
    pub view_count: u64,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// A credential issued by the service.
///
/// Immutable once constructed. A refresh or a new login replaces the whole
/// value; nothing mutates it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuthorization {
    /// Opaque bearer token for the service API.
    pub access_token: String,
    /// Point in time after which the token must be refreshed.
    pub valid_until: DateTime<Utc>,
    /// Profile of the user this credential belongs to.
    pub user_details: UserDetails,
}

impl UserAuthorization {
    /// Time left until `valid_until`, or `None` if it has already passed.
    #[must_use]
    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.valid_until - now)
            .to_std()
            .ok()
            .filter(|remaining| !remaining.is_zero())
    }

    /// Returns true if the credential is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.time_until_expiry(now).is_none()
    }

    /// Short, log-safe preview of the access token.
    #[must_use]
    pub fn token_preview(&self) -> String {
        if self.access_token.len() > 12 {
            let head: String = self.access_token.chars().take(8).collect();
            format!("{head}...")
        } else {
            "***".to_string()
        }
    }
}
