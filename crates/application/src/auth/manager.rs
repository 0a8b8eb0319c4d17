//! Client authorization state machine.
//!
//! [`AuthManager`] owns the single authorization state of the application.
//! It persists the credential, schedules a refresh for when the credential
//! expires, and performs the code exchange and refresh round trips.
//!
//! Every transition runs under one lock and starts by dropping the outgoing
//! state, which cancels the timer or call that state owned. Background tasks
//! re-check their cancellation token under the same lock before acting, so a
//! superseded task can never move the state.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use authgate_domain::{AuthError, AuthPhase, AuthView, UserAuthorization};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::store::CredentialStorage;
use super::task::PendingTask;
use crate::ports::{ApiError, AuthApi, Clock, KeyValueStorage};

/// Default wait before refreshing again when a refresh hands back a
/// credential that is already expired.
const DEFAULT_EXPIRED_RETRY_DELAY: Duration = Duration::from_secs(20);

/// Tunables of the state manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Delay inserted before every refresh request.
    pub refresh_delay: Duration,
    /// Lower bound on the wait before the next refresh when a refresh
    /// returned an expired credential.
    pub expired_retry_delay: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            refresh_delay: Duration::ZERO,
            expired_retry_delay: DEFAULT_EXPIRED_RETRY_DELAY,
        }
    }
}

impl ManagerOptions {
    /// Sets the delay inserted before every refresh request.
    #[must_use]
    pub const fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Sets the wait applied after a refresh returned an expired credential.
    #[must_use]
    pub const fn with_expired_retry_delay(mut self, delay: Duration) -> Self {
        self.expired_retry_delay = delay;
        self
    }
}

enum InternalState {
    LoggedOut,
    LoggedIn {
        auth: UserAuthorization,
        _refresh_timer: PendingTask,
    },
    LoadingRefresh {
        auth: UserAuthorization,
        _call: PendingTask,
    },
    LoadingNew {
        _call: PendingTask,
    },
    Errored {
        error: AuthError,
    },
}

impl InternalState {
    const fn phase(&self) -> AuthPhase {
        match self {
            Self::LoggedOut => AuthPhase::LoggedOut,
            Self::LoggedIn { .. } => AuthPhase::LoggedIn,
            Self::LoadingRefresh { .. } => AuthPhase::LoadingRefresh,
            Self::LoadingNew { .. } => AuthPhase::LoadingNew,
            Self::Errored { .. } => AuthPhase::Errored,
        }
    }

    /// The credential mirrored into persistent storage.
    const fn auth(&self) -> Option<&UserAuthorization> {
        match self {
            Self::LoggedIn { auth, .. } | Self::LoadingRefresh { auth, .. } => Some(auth),
            Self::LoggedOut | Self::LoadingNew { .. } | Self::Errored { .. } => None,
        }
    }

    fn view(&self) -> AuthView {
        let error = if let Self::Errored { error } = self {
            Some(error.clone())
        } else {
            None
        };
        AuthView {
            auth: self.auth().cloned(),
            loading: self.phase().is_loading(),
            error,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CallKind {
    Exchange,
    Refresh,
}

impl CallKind {
    const fn name(self) -> &'static str {
        match self {
            Self::Exchange => "exchange",
            Self::Refresh => "refresh",
        }
    }

    fn into_error(self, e: &ApiError) -> AuthError {
        match self {
            Self::Exchange => AuthError::ExchangeFailed(e.to_string()),
            Self::Refresh => AuthError::RefreshFailed(e.to_string()),
        }
    }
}

struct Inner {
    api: Arc<dyn AuthApi>,
    credentials: CredentialStorage,
    clock: Arc<dyn Clock>,
    options: ManagerOptions,
    state: Mutex<InternalState>,
    view: watch::Sender<AuthView>,
    return_to: Mutex<String>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, InternalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the current state, persisting and publishing the new one.
    fn transition(&self, state: &mut InternalState, next: InternalState) {
        let previous = std::mem::replace(state, next);
        let from = previous.phase();
        // Dropping the outgoing state cancels its timer or call.
        drop(previous);

        if let Err(e) = self.credentials.save(state.auth()) {
            warn!(error = %e, "Failed to persist authorization");
        }

        info!(from = ?from, to = ?state.phase(), "Authorization state changed");
        self.view.send_replace(state.view());
    }

    fn apply_auth(self: &Arc<Self>, state: &mut InternalState, auth: Option<UserAuthorization>) {
        let Some(auth) = auth else {
            self.transition(state, InternalState::LoggedOut);
            return;
        };

        match auth.time_until_expiry(self.clock.now()) {
            Some(remaining) => {
                let timer = self.schedule_refresh(auth.clone(), remaining);
                self.transition(
                    state,
                    InternalState::LoggedIn {
                        auth,
                        _refresh_timer: timer,
                    },
                );
            }
            None => {
                debug!(valid_until = %auth.valid_until, "Authorization already expired");
                self.begin_refresh(state, auth, self.options.refresh_delay);
            }
        }
    }

    fn schedule_refresh(self: &Arc<Self>, auth: UserAuthorization, delay: Duration) -> PendingTask {
        debug!(
            delay_secs = delay.as_secs(),
            user = %auth.user_details.login,
            "Scheduling authorization refresh"
        );
        let inner = Arc::downgrade(self);
        PendingTask::spawn(move |token| async move {
            tokio::select! {
                () = token.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
            if let Some(inner) = inner.upgrade() {
                inner.on_refresh_due(&token, auth);
            }
        })
    }

    fn on_refresh_due(self: &Arc<Self>, token: &CancellationToken, auth: UserAuthorization) {
        let mut state = self.lock_state();
        if token.is_cancelled() {
            return;
        }
        info!(user = %auth.user_details.login, "Authorization reached its expiry");
        self.begin_refresh(&mut state, auth, self.options.refresh_delay);
    }

    fn begin_refresh(
        self: &Arc<Self>,
        state: &mut InternalState,
        auth: UserAuthorization,
        delay: Duration,
    ) {
        info!(
            token = %auth.token_preview(),
            delay_secs = delay.as_secs(),
            "Refreshing authorization"
        );
        let api = Arc::clone(&self.api);
        let access_token = auth.access_token.clone();
        let call = self.spawn_call(CallKind::Refresh, async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            api.refresh(&access_token).await
        });
        self.transition(state, InternalState::LoadingRefresh { auth, _call: call });
    }

    fn begin_exchange(self: &Arc<Self>, state: &mut InternalState, code: String) {
        info!("Exchanging authorization code");
        let api = Arc::clone(&self.api);
        let call = self.spawn_call(CallKind::Exchange, async move {
            api.exchange_code(&code).await
        });
        self.transition(state, InternalState::LoadingNew { _call: call });
    }

    fn spawn_call<Fut>(self: &Arc<Self>, kind: CallKind, request: Fut) -> PendingTask
    where
        Fut: Future<Output = Result<UserAuthorization, ApiError>> + Send + 'static,
    {
        let inner: Weak<Self> = Arc::downgrade(self);
        PendingTask::spawn(move |token| async move {
            let outcome = tokio::select! {
                () = token.cancelled() => {
                    debug!(call = kind.name(), "Call canceled in flight");
                    return;
                }
                outcome = request => outcome,
            };
            if let Some(inner) = inner.upgrade() {
                inner.finish_call(&token, kind, outcome);
            }
        })
    }

    fn finish_call(
        self: &Arc<Self>,
        token: &CancellationToken,
        kind: CallKind,
        outcome: Result<UserAuthorization, ApiError>,
    ) {
        let mut state = self.lock_state();
        if token.is_cancelled() {
            debug!(call = kind.name(), "Ignoring outcome of superseded call");
            return;
        }
        match outcome {
            Ok(auth) => {
                info!(
                    call = kind.name(),
                    user = %auth.user_details.login,
                    valid_until = %auth.valid_until,
                    "Authorization obtained"
                );
                // A refresh that hands back an expired credential must not be
                // followed by another one right away.
                if matches!(kind, CallKind::Refresh) && auth.is_expired_at(self.clock.now()) {
                    warn!(
                        valid_until = %auth.valid_until,
                        "Refresh returned an expired authorization"
                    );
                    let delay = self.options.refresh_delay.max(self.options.expired_retry_delay);
                    self.begin_refresh(&mut state, auth, delay);
                    return;
                }
                self.apply_auth(&mut state, Some(auth));
            }
            Err(e) => {
                error!(call = kind.name(), error = %e, "Authorization call failed");
                let error = kind.into_error(&e);
                self.transition(&mut state, InternalState::Errored { error });
            }
        }
    }
}

/// Handle to the application's authorization state.
///
/// Construct one per application and clone the handle wherever it is
/// needed. All clones share the same state; dropping the last one cancels
/// any pending timer or call.
///
/// The manager spawns its timers and calls on the ambient Tokio runtime, so
/// it must be created and driven from within one.
///
/// # Example
///
/// ```ignore
/// let manager = AuthManager::new(api, persistent, clock, ManagerOptions::default());
/// manager.login("code-from-callback");
/// let view = manager.settled().await;
/// ```
#[derive(Clone)]
pub struct AuthManager {
    inner: Arc<Inner>,
}

impl AuthManager {
    /// Creates the manager and restores the persisted credential.
    ///
    /// The persisted credential goes through [`AuthManager::set_auth`], so an
    /// expired one immediately starts a refresh. An unreadable record is
    /// discarded.
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
        options: ManagerOptions,
    ) -> Self {
        let credentials = CredentialStorage::new(storage);
        let persisted = credentials.load().unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable persisted authorization");
            None
        });
        let (view, _) = watch::channel(AuthView::logged_out());

        let manager = Self {
            inner: Arc::new(Inner {
                api,
                credentials,
                clock,
                options,
                state: Mutex::new(InternalState::LoggedOut),
                view,
                return_to: Mutex::new("/".to_string()),
            }),
        };

        if let Some(auth) = &persisted {
            info!(
                user = %auth.user_details.login,
                valid_until = %auth.valid_until,
                "Restoring persisted authorization"
            );
        }
        manager.set_auth(persisted);
        manager
    }

    /// Installs a credential, or logs out when `None`.
    ///
    /// A credential that is still valid schedules its own refresh; an
    /// expired one starts refreshing right away.
    pub fn set_auth(&self, auth: Option<UserAuthorization>) {
        let mut state = self.inner.lock_state();
        self.inner.apply_auth(&mut state, auth);
    }

    /// Starts exchanging a one-time authorization code for a credential.
    ///
    /// Any pending timer or call, including an earlier exchange, is canceled.
    /// A failed exchange surfaces through [`AuthView::error`].
    pub fn login(&self, code: impl Into<String>) {
        let mut state = self.inner.lock_state();
        self.inner.begin_exchange(&mut state, code.into());
    }

    /// Drops the credential and cancels any pending timer or call.
    pub fn logout(&self) {
        info!("Logging out");
        self.set_auth(None);
    }

    /// Records a failed login attempt detected outside the manager.
    pub fn set_error(&self, error: AuthError) {
        let mut state = self.inner.lock_state();
        self.inner
            .transition(&mut state, InternalState::Errored { error });
    }

    /// Current external view.
    #[must_use]
    pub fn view(&self) -> AuthView {
        self.inner.view.borrow().clone()
    }

    /// Current credential, if visible.
    #[must_use]
    pub fn auth(&self) -> Option<UserAuthorization> {
        self.inner.view.borrow().auth.clone()
    }

    /// Tag of the current internal state.
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.inner.lock_state().phase()
    }

    /// Subscribes to view changes. The receiver sees every transition's
    /// resulting view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthView> {
        self.inner.view.subscribe()
    }

    /// Waits until no call is in flight and returns the view at that point.
    pub async fn settled(&self) -> AuthView {
        let mut receiver = self.subscribe();
        let settled = receiver
            .wait_for(|view| !view.loading)
            .await
            .map(|view| (*view).clone());
        settled.unwrap_or_else(|_| self.view())
    }

    /// Where the user should land once the login completes.
    #[must_use]
    pub fn return_to(&self) -> String {
        self.inner
            .return_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sets where the user should land once the login completes.
    pub fn set_return_to(&self, return_to: impl Into<String>) {
        *self
            .inner
            .return_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = return_to.into();
    }
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("phase", &self.phase())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
