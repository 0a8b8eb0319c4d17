//! Authgate Application - Use cases and ports
//!
//! This crate contains the authorization state manager, the login flow and
//! the port traits that infrastructure adapters implement.

pub mod auth;
pub mod error;
pub mod login;
pub mod ports;

pub use auth::{AuthManager, CredentialStorage, CsrfStorage, ManagerOptions};
pub use error::{LoginError, LoginResult};
pub use login::{CallbackOutcome, Destination, LoginFlow, LoginSettings};
pub use ports::{ApiError, AuthApi, Clock, KeyValueStorage, StorageError};
