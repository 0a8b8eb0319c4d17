//! Client authorization state.
//!
//! This module provides:
//! - The authorization state manager and its external view
//! - Typed storage of the persisted credential and the CSRF record

mod manager;
mod store;
mod task;

#[cfg(test)]
pub(crate) mod test_support;

pub use manager::{AuthManager, ManagerOptions};
pub use store::{AUTH_KEY, CSRF_KEY, CredentialStorage, CsrfStorage};
