//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod auth_api;
mod clock;
mod storage;

pub use auth_api::{ApiError, AuthApi};
pub use clock::Clock;
pub use storage::{KeyValueStorage, StorageError};
