//! Authgate Domain - Core types
//!
//! This crate defines the domain model for the Authgate login client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod oauth;
pub mod settings;

pub use auth::{AuthError, AuthPhase, AuthView, UserAuthorization, UserDetails};
pub use error::{DomainError, DomainResult};
pub use oauth::{
    AuthorizeRequest, CSRF_TOKEN_BYTES, CallbackDecision, CallbackParams, CsrfState,
    DEFAULT_AUTHORIZE_URL,
};
pub use settings::ClientSettings;
