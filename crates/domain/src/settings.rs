//! Client Settings Domain Model
//!
//! Defines how the client reaches the service and the identity provider.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::oauth::DEFAULT_AUTHORIZE_URL;

/// Client configuration.
///
/// Every field has a default, so a partial settings file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the service exposing `/api/v1/auth/*`.
    pub api_base_url: String,
    /// Twitch application client id.
    pub client_id: String,
    /// Redirect URI registered with the Twitch application.
    pub redirect_uri: String,
    /// Identity provider authorize endpoint.
    pub authorize_url: String,
    /// How long a started login may take before the callback is rejected.
    pub csrf_validity_secs: u64,
    /// Artificial delay before each refresh request.
    pub refresh_delay_secs: u64,
    /// Wait before refreshing again after a refresh returned an expired
    /// credential. Never shorter than one second.
    pub expired_retry_delay_secs: u64,
    /// Overrides the location of the persistent credential store.
    pub storage_path: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:2791".to_string(),
            client_id: String::new(),
            redirect_uri: "http://localhost:3000/login/authorized".to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            csrf_validity_secs: 10 * 60,
            refresh_delay_secs: 0,
            expired_retry_delay_secs: 20,
            storage_path: None,
        }
    }
}

impl ClientSettings {
    /// Login validity window as a `Duration`.
    #[must_use]
    pub const fn csrf_validity(&self) -> Duration {
        Duration::from_secs(self.csrf_validity_secs)
    }

    /// Refresh delay as a `Duration`.
    #[must_use]
    pub const fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_delay_secs)
    }

    /// Retry wait after an expired refresh result, at least one second.
    #[must_use]
    pub fn expired_retry_delay(&self) -> Duration {
        Duration::from_secs(self.expired_retry_delay_secs.max(1))
    }

    /// Checks the settings needed to start a login.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> DomainResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(DomainError::InvalidSetting {
                name: "client_id",
                reason: "must not be empty".to_string(),
            });
        }
        for (name, value) in [
            ("api_base_url", &self.api_base_url),
            ("redirect_uri", &self.redirect_uri),
            ("authorize_url", &self.authorize_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(DomainError::InvalidSetting {
                    name,
                    reason: format!("{e}: {value}"),
                });
            }
        }
        if self.csrf_validity_secs == 0 {
            return Err(DomainError::InvalidSetting {
                name: "csrf_validity_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
