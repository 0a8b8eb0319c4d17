//! Authorization API client using reqwest.
//!
//! This adapter implements the `AuthApi` port against the service's
//! `/api/v1/auth/*` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use authgate_application::ports::{ApiError, AuthApi};
use authgate_domain::UserAuthorization;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, Url};
use tracing::{debug, warn};

const CREATE_PATH: &str = "/api/v1/auth/create";
const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Errors raised while setting up the client.
#[derive(Debug, thiserror::Error)]
pub enum HttpSetupError {
    /// The base URL does not parse or cannot carry a path.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// `AuthApi` implementation over HTTP.
///
/// Default configuration:
/// - Request timeout: 30 seconds
/// - User-Agent: "authgate/0.1.0"
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid base URL or the client
    /// cannot be created.
    pub fn new(base_url: &str) -> Result<Self, HttpSetupError> {
        let client = Client::builder()
            .user_agent(concat!("authgate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HttpSetupError::Client(e.to_string()))?;
        Self::with_client(client, base_url)
    }

    /// Creates the adapter around a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid base URL.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, HttpSetupError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| HttpSetupError::InvalidBaseUrl(format!("{e}: {base_url}")))?;
        if parsed.cannot_be_a_base() {
            return Err(HttpSetupError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Appends an absolute API path to the base URL, keeping any base path.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let url = format!("{}{path}", self.base_url);
        Url::parse(&url).map_err(|e| ApiError::Transport(format!("{e}: {url}")))
    }

    /// Maps reqwest errors to `ApiError`.
    fn map_error(error: &reqwest::Error) -> ApiError {
        if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Transport(error.to_string())
        }
    }

    /// Turns a response into a credential, failing on any non-2xx status.
    async fn read_authorization(response: Response) -> Result<UserAuthorization, ApiError> {
        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                url = %response.url().path(),
                "Auth endpoint rejected the request"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response
            .json::<UserAuthorization>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn exchange_code(&self, code: &str) -> Result<UserAuthorization, ApiError> {
        let mut url = self.endpoint(CREATE_PATH)?;
        url.query_pairs_mut().append_pair("code", code);
        debug!(url = CREATE_PATH, "POST auth create");

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Self::map_error(&e))?;

        Self::read_authorization(response).await
    }

    async fn refresh(&self, access_token: &str) -> Result<UserAuthorization, ApiError> {
        let url = self.endpoint(REFRESH_PATH)?;
        debug!(url = REFRESH_PATH, "POST auth refresh");

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Self::map_error(&e))?;

        Self::read_authorization(response).await
    }
}
