//! Authorization domain types

mod error;
mod user;
mod view;

pub use error::AuthError;
pub use user::{UserAuthorization, UserDetails};
pub use view::{AuthPhase, AuthView};
