//! Login flow use case.
//!
//! A login is split across the identity provider redirect:
//! [`LoginFlow::begin`] stores a CSRF record and hands out the authorize URL,
//! [`LoginFlow::complete`] checks the redirect callback against that record
//! and starts the code exchange.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use authgate_domain::{
    AuthError, AuthorizeRequest, CSRF_TOKEN_BYTES, CallbackDecision, CallbackParams,
    ClientSettings, CsrfState,
};
use chrono::TimeDelta;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{AuthManager, CsrfStorage};
use crate::error::{LoginError, LoginResult};
use crate::ports::{Clock, KeyValueStorage};

/// Where the user lands when no return path was requested.
const DEFAULT_RETURN_TO: &str = "/";

/// Settings needed to build the authorize request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSettings {
    /// Provider authorize endpoint.
    pub authorize_url: String,
    /// Registered application client id.
    pub client_id: String,
    /// Where the provider sends the user back to.
    pub redirect_uri: String,
    /// How long a started login stays valid.
    pub csrf_validity: Duration,
}

impl From<&ClientSettings> for LoginSettings {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            authorize_url: settings.authorize_url.clone(),
            client_id: settings.client_id.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            csrf_validity: settings.csrf_validity(),
        }
    }
}

/// Immediate result of handling a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The code exchange started; wait for the manager to settle.
    LoggingIn,
    /// The user declined at the provider.
    Cancelled {
        /// Page the user came from.
        return_to: String,
    },
    /// The callback was rejected. The error is also set on the manager.
    Failed(AuthError),
}

/// Where to send the user once the callback has been fully handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Back to the page the login started from.
    ReturnTo(String),
    /// To the error page, which offers a way back.
    Error {
        /// Why the login failed.
        error: AuthError,
        /// Page the user came from.
        return_to: String,
    },
}

/// Drives a login from the authorize redirect to the settled credential.
#[derive(Clone)]
pub struct LoginFlow {
    manager: AuthManager,
    csrf: CsrfStorage,
    clock: Arc<dyn Clock>,
    settings: LoginSettings,
}

impl LoginFlow {
    /// Creates the flow. `session` holds the CSRF record between `begin`
    /// and `complete`.
    pub fn new(
        manager: AuthManager,
        session: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
        settings: LoginSettings,
    ) -> Self {
        Self {
            manager,
            csrf: CsrfStorage::new(session),
            clock,
            settings,
        }
    }

    /// The manager this flow logs into.
    #[must_use]
    pub const fn manager(&self) -> &AuthManager {
        &self.manager
    }

    /// Starts a login and returns the URL to send the user to.
    ///
    /// A previous unfinished login is superseded.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorize endpoint is invalid or the CSRF
    /// record cannot be stored.
    pub fn begin(&self, return_to: Option<&str>) -> LoginResult<Url> {
        let validity = TimeDelta::from_std(self.settings.csrf_validity)
            .map_err(|_| LoginError::ValidityOutOfRange)?;
        let valid_until = self
            .clock
            .now()
            .checked_add_signed(validity)
            .ok_or(LoginError::ValidityOutOfRange)?;
        let return_to = return_to
            .filter(|path| !path.is_empty())
            .unwrap_or(DEFAULT_RETURN_TO);

        let token = generate_token();
        let request = AuthorizeRequest::new(
            &self.settings.authorize_url,
            &self.settings.client_id,
            &self.settings.redirect_uri,
            &token,
        )?;

        self.csrf
            .put(&CsrfState::new(token, valid_until, return_to))?;
        info!(return_to, valid_until = %valid_until, "Login started");
        Ok(request.to_url())
    }

    /// Checks the provider callback and starts the code exchange.
    ///
    /// The CSRF record is consumed whatever the outcome.
    pub fn complete(&self, params: &CallbackParams) -> CallbackOutcome {
        let record = self.csrf.take().unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable CSRF record");
            None
        });
        let Some(record) = record else {
            return self.reject(AuthError::MissingCsrfRecord);
        };

        self.manager.set_return_to(record.return_to.clone());

        match params.validate(&record, self.clock.now()) {
            Ok(CallbackDecision::Exchange(code)) => {
                debug!(scope = ?params.scope, "Callback accepted");
                self.manager.login(code);
                CallbackOutcome::LoggingIn
            }
            Ok(CallbackDecision::Denied) => {
                info!(return_to = %record.return_to, "Login declined at the provider");
                CallbackOutcome::Cancelled {
                    return_to: record.return_to,
                }
            }
            Err(error) => self.reject(error),
        }
    }

    /// Handles the callback and waits for the resulting destination.
    pub async fn handle_callback(&self, params: &CallbackParams) -> Destination {
        match self.complete(params) {
            CallbackOutcome::LoggingIn => self.wait_for_destination().await,
            CallbackOutcome::Cancelled { return_to } => Destination::ReturnTo(return_to),
            CallbackOutcome::Failed(error) => Destination::Error {
                error,
                return_to: self.manager.return_to(),
            },
        }
    }

    /// Waits for the manager to settle and picks the destination.
    pub async fn wait_for_destination(&self) -> Destination {
        let view = self.manager.settled().await;
        let return_to = self.manager.return_to();
        match view.error {
            Some(error) => Destination::Error { error, return_to },
            None => Destination::ReturnTo(return_to),
        }
    }

    fn reject(&self, error: AuthError) -> CallbackOutcome {
        warn!(error = %error, "Login callback rejected");
        self.manager.set_error(error.clone());
        CallbackOutcome::Failed(error)
    }
}

/// Random CSRF token, hex-encoded.
fn generate_token() -> String {
    let bytes: [u8; CSRF_TOKEN_BYTES] = rand::random();
    bytes
        .iter()
        .fold(String::with_capacity(CSRF_TOKEN_BYTES * 2), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}
