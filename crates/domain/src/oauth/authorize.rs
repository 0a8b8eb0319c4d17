//! Identity provider authorize request.

use url::Url;

use crate::error::{DomainError, DomainResult};

/// Twitch's OAuth2 authorize endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://id.twitch.tv/oauth2/authorize";

/// Parameters of the authorization-code request the user is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    /// Provider authorize endpoint.
    pub endpoint: Url,
    /// Registered application client id.
    pub client_id: String,
    /// Where the provider sends the user back to.
    pub redirect_uri: String,
    /// CSRF token, echoed back as `state`.
    pub state: String,
}

impl AuthorizeRequest {
    /// Creates a request against `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if `endpoint` does not parse.
    pub fn new(
        endpoint: &str,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        state: impl Into<String>,
    ) -> DomainResult<Self> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| DomainError::InvalidUrl(format!("{e}: {endpoint}")))?;
        Ok(Self {
            endpoint,
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            state: state.into(),
        })
    }

    /// Full URL to send the user to. The scope is always empty.
    #[must_use]
    pub fn to_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "")
            .append_pair("state", &self.state);
        url
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_authorize_url() {
        let request = AuthorizeRequest::new(
            DEFAULT_AUTHORIZE_URL,
            "my client",
            "http://localhost:3000/login/authorized",
            "deadbeef",
        )
        .unwrap();

        assert_eq!(
            request.to_url().as_str(),
            "https://id.twitch.tv/oauth2/authorize?client_id=my+client\
             &redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Flogin%2Fauthorized\
             &response_type=code&scope=&state=deadbeef"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = AuthorizeRequest::new("not a url", "id", "uri", "state");
        assert!(matches!(result, Err(DomainError::InvalidUrl(_))));
    }
}
