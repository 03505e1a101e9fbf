//! Client side of the three-legged OAuth2 handshake with the identity
//! provider.
//!
//! All transient handshake state (the anti-forgery nonce) travels inside a
//! signed, short-lived cookie rather than server memory, so an abandoned
//! login leaves nothing to clean up and the server needs no sticky sessions.

use crate::config::AppConfig;
use http::StatusCode;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use log::debug;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Name of the cookie carrying the sealed anti-forgery nonce
pub const STATE_COOKIE: &str = "authgate_oauth_state";

/// How long a login attempt may take before its state cookie expires
const STATE_TTL_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("invalid OAuth configuration: {0}")]
    Config(String),
    #[error("the login state cookie is missing, start again at /login")]
    MissingStateCookie,
    #[error("the login state cookie is invalid or expired")]
    InvalidStateCookie,
    #[error("the state parameter does not match the login state cookie")]
    StateMismatch,
    #[error("the callback is missing the state parameter")]
    MissingState,
    #[error("could not reach the identity provider: {0}")]
    Network(#[from] reqwest::Error),
    #[error("the provider rejected the code exchange ({status}): {body}")]
    ExchangeRejected { status: StatusCode, body: String },
    #[error("could not seal the login state cookie: {0}")]
    StateSigning(#[from] jsonwebtoken::errors::Error),
}

/// The provider's assertion of who the user is, extracted from its
/// userinfo endpoint after a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub id: String,
    pub name: Option<String>,
}

/// Where to send an unauthenticated client, plus the cookie that lets us
/// recognize the callback as ours.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub location: String,
    pub set_cookie: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    /// The anti-forgery nonce echoed back by the provider as `state`
    st: String,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Userinfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
}

/// Seals the anti-forgery nonce into a signed, expiring cookie value and
/// opens it again on the callback. Signed with the cookie secret, which is
/// deliberately distinct from the access token secret.
pub(crate) struct StateCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl StateCodec {
    pub(crate) fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub(crate) fn seal(&self, nonce: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = StateClaims {
            st: nonce.to_string(),
            exp: chrono::Utc::now().timestamp() as u64 + STATE_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub(crate) fn open(&self, sealed: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let data: TokenData<StateClaims> = decode(sealed, &self.decoding_key, &self.validation)?;
        Ok(data.claims.st)
    }
}

/// Drives the handshake against exactly one identity provider.
pub struct OAuthClient {
    http_client: Client,
    client_id: String,
    client_secret: String,
    auth_url: Url,
    token_url: String,
    userinfo_url: String,
    /// Callback URL built from the configured base URL, used verbatim
    redirect_uri: String,
    /// Whether the externally visible base URL is served over https
    secure: bool,
    state_codec: StateCodec,
}

impl OAuthClient {
    pub fn new(config: &AppConfig) -> Result<Self, OAuthError> {
        let base = Url::parse(&config.server_url)
            .map_err(|e| OAuthError::Config(format!("invalid server URL: {e}")))?;
        let auth_url = Url::parse(&config.google.auth_url)
            .map_err(|e| OAuthError::Config(format!("invalid authorization URL: {e}")))?;
        let redirect_uri = format!("{}/login", config.server_url.trim_end_matches('/'));

        // The exchange must fail loudly rather than hang; the provider gets
        // a bounded window to answer.
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.google.exchange_timeout))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| OAuthError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            client_id: config.google.client_id.clone(),
            client_secret: config.google.client_secret.clone(),
            auth_url,
            token_url: config.google.token_url.clone(),
            userinfo_url: config.google.userinfo_url.clone(),
            redirect_uri,
            secure: base.scheme() == "https",
            state_codec: StateCodec::new(&config.cookie_secret),
        })
    }

    /// Starts a login attempt: a redirect to the provider's consent screen
    /// and the cookie that seals the anti-forgery nonce.
    pub fn begin(&self) -> Result<LoginRedirect, OAuthError> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let sealed = self.state_codec.seal(&nonce)?;

        let mut location = self.auth_url.clone();
        location.query_pairs_mut().extend_pairs([
            ("response_type", "code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", "openid profile"),
            ("state", nonce.as_str()),
        ]);

        Ok(LoginRedirect {
            location: location.to_string(),
            set_cookie: self.state_cookie(&sealed, STATE_TTL_SECS),
        })
    }

    /// Completes a login attempt on the provider callback: checks the
    /// anti-forgery nonce, exchanges the authorization code out of the
    /// client's view, and fetches the provider's identity assertion.
    pub async fn complete(
        &self,
        code: &str,
        returned_state: &str,
        cookie_header: Option<&str>,
    ) -> Result<ProviderProfile, OAuthError> {
        let sealed = cookie_header
            .and_then(extract_state_cookie)
            .ok_or(OAuthError::MissingStateCookie)?;
        let nonce = self
            .state_codec
            .open(&sealed)
            .map_err(|_| OAuthError::InvalidStateCookie)?;
        if nonce != returned_state {
            return Err(OAuthError::StateMismatch);
        }

        let access_token = self.exchange_code(code).await?;
        self.fetch_profile(&access_token).await
    }

    /// A `Set-Cookie` value that discards the state cookie after a finished
    /// login attempt.
    pub fn clear_state_cookie(&self) -> String {
        self.state_cookie("", 0)
    }

    fn state_cookie(&self, value: &str, max_age: u64) -> String {
        let secure_flag = if self.secure { "; Secure" } else { "" };
        format!(
            "{STATE_COOKIE}={value}; HttpOnly{secure_flag}; Path=/login; SameSite=Lax; Max-Age={max_age}"
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::ExchangeRejected { status, body });
        }

        let token: TokenResponse = response.json().await?;
        debug!("Exchanged authorization code for provider access token");
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let userinfo: Userinfo = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(ProviderProfile {
            id: userinfo.sub,
            name: userinfo.name,
        })
    }
}

/// Pulls the sealed state value out of a `Cookie` request header.
pub(crate) fn extract_state_cookie(cookie_header: &str) -> Option<String> {
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie
            .strip_prefix(STATE_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
        {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
