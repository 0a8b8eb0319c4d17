//! End-to-end login tests.
//!
//! These tests wire the real adapters together: the HTTP client talks to a
//! mock service, the credential lands in a file store in a temp directory.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::sync::Arc;

use authgate_application::auth::CSRF_KEY;
use authgate_application::ports::KeyValueStorage;
use authgate_application::{
    AuthManager, CallbackOutcome, Destination, LoginFlow, LoginSettings, ManagerOptions,
};
use authgate_domain::{AuthError, AuthPhase, CallbackParams, ClientSettings};
use authgate_infrastructure::{FileStorage, HttpAuthApi, MemoryStorage, SystemClock};
use chrono::{Duration, SecondsFormat, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authorization_json(token: &str, valid_for: Duration) -> serde_json::Value {
    json!({
        "access_token": token,
        "valid_until": (Utc::now() + valid_for).to_rfc3339_opts(SecondsFormat::Millis, true),
        "user_details": {
            "id": "12826",
            "login": "twitch",
            "display_name": "Twitch",
            "type": "",
            "broadcaster_type": "partner",
            "description": "",
            "profile_image_url": "https://example.com/p.png",
            "offline_image_url": "",
            "view_count": 10,
            "created_at": "2007-05-22T10:37:47Z"
        }
    })
}

fn manager(server: &MockServer, store: &Path) -> AuthManager {
    AuthManager::new(
        Arc::new(HttpAuthApi::new(&server.uri()).unwrap()),
        Arc::new(FileStorage::new(store)),
        Arc::new(SystemClock::new()),
        ManagerOptions::default(),
    )
}

fn flow(manager: AuthManager, session: Arc<MemoryStorage>) -> LoginFlow {
    let settings = ClientSettings {
        client_id: "client-id".to_string(),
        ..ClientSettings::default()
    };
    LoginFlow::new(
        manager,
        session,
        Arc::new(SystemClock::new()),
        LoginSettings::from(&settings),
    )
}

fn state_of(url: &Url) -> String {
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("authorize URL carries a state")
}

#[tokio::test]
async fn test_login_persists_credential_across_restart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/create"))
        .and(query_param("code", "abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(authorization_json("fresh-token-123456", Duration::hours(1))),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let store = dir.path().join("storage.json");

    let flow = flow(manager(&server, &store), Arc::new(MemoryStorage::new()));
    let url = flow.begin(Some("/stats")).unwrap();
    let callback = format!(
        "http://localhost:3000/login/authorized?code=abc123&scope=&state={}",
        state_of(&url)
    );
    let params = CallbackParams::from_url(&Url::parse(&callback).unwrap());

    let destination = flow.handle_callback(&params).await;
    assert_eq!(destination, Destination::ReturnTo("/stats".to_string()));
    assert!(store.exists());

    let restarted = manager(&server, &store);
    assert_eq!(restarted.phase(), AuthPhase::LoggedIn);
    let view = restarted.view();
    assert!(!view.loading);
    assert_eq!(
        view.auth.map(|a| a.access_token).as_deref(),
        Some("fresh-token-123456")
    );
}

#[tokio::test]
async fn test_rejected_code_reports_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/create"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let store = dir.path().join("storage.json");

    let flow = flow(manager(&server, &store), Arc::new(MemoryStorage::new()));
    let state = state_of(&flow.begin(None).unwrap());
    let params = CallbackParams::from_query(&format!("code=abc123&state={state}"));

    assert_eq!(flow.complete(&params), CallbackOutcome::LoggingIn);
    assert!(flow.manager().view().loading);

    let destination = flow.wait_for_destination().await;
    assert_eq!(
        destination,
        Destination::Error {
            error: AuthError::ExchangeFailed("Unauthorized".to_string()),
            return_to: "/".to_string(),
        }
    );
    assert!(flow.manager().auth().is_none());
}

#[tokio::test]
async fn test_forged_state_never_reaches_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let session = Arc::new(MemoryStorage::new());

    let flow = flow(manager(&server, &dir.path().join("s.json")), session.clone());
    flow.begin(Some("/stats")).unwrap();

    let destination = flow
        .handle_callback(&CallbackParams::from_query("code=abc123&state=forged"))
        .await;

    assert_eq!(
        destination,
        Destination::Error {
            error: AuthError::CsrfMismatch,
            return_to: "/stats".to_string(),
        }
    );
    assert_eq!(session.get(CSRF_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_expired_stored_credential_is_refreshed_on_startup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(header("authorization", "Bearer stale-token-123456"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(authorization_json("renewed-token-1234", Duration::hours(4))),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let store = dir.path().join("storage.json");
    let stale = authorization_json("stale-token-123456", Duration::minutes(-5));
    FileStorage::new(&store)
        .set("auth", &stale.to_string())
        .unwrap();

    let manager = manager(&server, &store);
    assert_eq!(manager.phase(), AuthPhase::LoadingRefresh);

    let view = manager.settled().await;
    assert_eq!(
        view.auth.map(|a| a.access_token).as_deref(),
        Some("renewed-token-1234")
    );

    let persisted: serde_json::Value =
        serde_json::from_str(&FileStorage::new(&store).get("auth").unwrap().unwrap()).unwrap();
    assert_eq!(persisted["access_token"], "renewed-token-1234");
}
