//! OAuth2 authorization-code redirect types.
//!
//! The login round trip leaves the client twice: once towards the identity
//! provider's authorize endpoint and once back through the redirect callback.
//! These types describe both legs and the CSRF record that ties them together.

mod authorize;
mod callback;
mod csrf;

pub use authorize::{AuthorizeRequest, DEFAULT_AUTHORIZE_URL};
pub use callback::{CallbackDecision, CallbackParams};
pub use csrf::{CSRF_TOKEN_BYTES, CsrfState};
