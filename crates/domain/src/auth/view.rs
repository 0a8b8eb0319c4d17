//! Externally visible authorization state.

use serde::Serialize;

use super::{AuthError, UserAuthorization};

/// Data-free tag of the manager's internal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    /// No credential.
    LoggedOut,
    /// Valid credential, refresh scheduled.
    LoggedIn,
    /// Last-known credential kept while a refresh is in flight.
    LoadingRefresh,
    /// Exchanging a one-time code for a first credential.
    LoadingNew,
    /// Last attempt failed.
    Errored,
}

impl AuthPhase {
    /// Returns true while a network call is in flight.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::LoadingRefresh | Self::LoadingNew)
    }

    /// Get a user-friendly message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoggedOut => "Not logged in",
            Self::LoggedIn => "Logged in",
            Self::LoadingRefresh => "Refreshing authorization...",
            Self::LoadingNew => "Logging in...",
            Self::Errored => "Login failed",
        }
    }
}

/// What consumers of the manager observe.
///
/// A pure projection of the internal state:
/// - `auth` is present while logged in and while a refresh is in flight
/// - `loading` is set during either network call
/// - `error` is set only after a failed attempt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthView {
    /// Current credential, if any.
    pub auth: Option<UserAuthorization>,
    /// True while a code exchange or refresh is in flight.
    pub loading: bool,
    /// Failure of the last attempt.
    pub error: Option<AuthError>,
}

impl AuthView {
    /// View of a logged-out client.
    #[must_use]
    pub const fn logged_out() -> Self {
        Self {
            auth: None,
            loading: false,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_phases() {
        assert!(AuthPhase::LoadingNew.is_loading());
        assert!(AuthPhase::LoadingRefresh.is_loading());
        assert!(!AuthPhase::LoggedIn.is_loading());
        assert!(!AuthPhase::Errored.is_loading());
    }

    #[test]
    fn test_default_view_is_logged_out() {
        let view = AuthView::default();
        assert_eq!(view, AuthView::logged_out());
    }
}
