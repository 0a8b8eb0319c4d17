//! Adapters implementing application ports with external libraries.

mod http_auth_api;
mod system_clock;

pub use http_auth_api::{HttpAuthApi, HttpSetupError};
pub use system_clock::SystemClock;
