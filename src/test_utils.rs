use crate::config::AppConfig;
use crate::create_app;
use crate::oauth::StateCodec;
use crate::state::AppState;
use crate::token::TokenCodec;
use axum::body::Body;
use axum::Router;
use http::{header, HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test fixture wiring the full application against a mock identity provider.
///
/// The wiremock server stands in for Google: the OAuth endpoints of the
/// configuration point at it, so login tests can script the provider side of
/// the handshake. Requests are driven through the router in-process with
/// `tower::ServiceExt::oneshot`.
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration the app was built with (fixture secrets included)
    pub config: AppConfig,
    /// Mock server standing in for the identity provider
    pub provider_mock: MockServer,
}

impl TestFixture {
    pub async fn new() -> Self {
        // Initialize test logger
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let provider_mock = MockServer::start().await;
        let config = AppConfig::for_test_with_mocks(&provider_mock);
        let state = AppState::new(config.clone()).expect("Failed to build test state");
        let app = create_app(state).await;

        Self {
            app,
            config,
            provider_mock,
        }
    }

    /// Issues an access token signed with the fixture's JWT secret
    pub fn issue_token(&self, identity: &str, ttl_secs: u64) -> String {
        TokenCodec::new(&self.config.jwt_secret)
            .issue(identity, ttl_secs)
            .expect("Failed to issue test token")
    }

    /// Seals a login nonce the way the server does, for crafting callbacks
    pub fn sealed_state(&self, nonce: &str) -> String {
        StateCodec::new(&self.config.cookie_secret)
            .seal(nonce)
            .expect("Failed to seal test state")
    }

    /// Mounts provider mocks for a successful code exchange and userinfo fetch
    pub async fn mock_provider_success(&self, sub: &str, name: &str) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "provider-access-token",
                "token_type": "Bearer"
            })))
            .mount(&self.provider_mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": sub,
                "name": name
            })))
            .mount(&self.provider_mock)
            .await;
    }

    /// Sends a GET request without credentials
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri.as_ref())
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a GET request with the token in the Authorization header
    pub async fn get_with_token(&self, uri: impl AsRef<str>, token: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri.as_ref())
            .header(header::AUTHORIZATION, token)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Drives a request through the router and collects the response
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

/// A collected response: status, headers, and the full body
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn assert_ok(&self) {
        assert!(
            self.status.is_success(),
            "expected success status, got {}: {}",
            self.status,
            self.text()
        );
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse response body as JSON")
    }

    pub fn header(&self, name: http::header::HeaderName) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}
