use confique::Config;

/// Main configuration structure for the authgate server.
///
/// All values are read once at startup from the environment. The secrets and
/// the provider credentials have no defaults; loading fails when any of them
/// is absent.
#[derive(Debug, Config, Clone)]
pub struct AppConfig {
    /// Symmetric secret used to sign and verify access tokens (HS256)
    #[config(env = "AUTHGATE_JWT_SECRET")]
    pub jwt_secret: String,

    /// Separate secret protecting the transient login state cookie
    #[config(env = "AUTHGATE_COOKIE_SECRET")]
    pub cookie_secret: String,

    /// Externally visible base URL, e.g. "https://authgate.example.com".
    /// Used verbatim to build the OAuth callback URL; the server never tries
    /// to introspect its own address (it may sit behind a proxy or PaaS).
    #[config(env = "AUTHGATE_SERVER_URL")]
    pub server_url: String,

    /// The port the server will listen to (default: 3006)
    #[config(env = "AUTHGATE_PORT", default = 3006)]
    pub port: u16,

    /// Access token lifetime in seconds (default: 3600 = 1 hour)
    #[config(env = "AUTHGATE_TOKEN_TTL", default = 3600)]
    pub token_ttl: u64,

    /// Identity provider configuration
    #[config(nested)]
    pub google: GoogleConfig,
}

/// Google OAuth2 provider configuration.
///
/// The endpoint URLs default to Google's published endpoints and are only
/// overridden in tests, where a mock server stands in for the provider.
#[derive(Debug, Config, Clone)]
pub struct GoogleConfig {
    /// OAuth2 client id issued by the provider
    #[config(env = "AUTHGATE_GOOGLE_CLIENT_ID")]
    pub client_id: String,

    /// OAuth2 client secret issued by the provider
    #[config(env = "AUTHGATE_GOOGLE_CLIENT_SECRET")]
    pub client_secret: String,

    /// Authorization (consent screen) endpoint
    #[config(
        env = "AUTHGATE_GOOGLE_AUTH_URL",
        default = "https://accounts.google.com/o/oauth2/v2/auth"
    )]
    pub auth_url: String,

    /// Code exchange endpoint
    #[config(
        env = "AUTHGATE_GOOGLE_TOKEN_URL",
        default = "https://oauth2.googleapis.com/token"
    )]
    pub token_url: String,

    /// Userinfo (profile) endpoint
    #[config(
        env = "AUTHGATE_GOOGLE_USERINFO_URL",
        default = "https://openidconnect.googleapis.com/v1/userinfo"
    )]
    pub userinfo_url: String,

    /// Timeout in seconds for the server-to-provider exchange (default: 10)
    #[config(env = "AUTHGATE_GOOGLE_EXCHANGE_TIMEOUT", default = 10)]
    pub exchange_timeout: u64,
}

impl AppConfig {
    /// Creates a new configuration instance from environment variables
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().load()
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(provider_mock: &wiremock::MockServer) -> Self {
        Self {
            jwt_secret: "test-jwt-secret".to_string(),
            cookie_secret: "test-cookie-secret".to_string(),
            server_url: "http://127.0.0.1:3006".to_string(),
            port: 0, // Let the OS choose a port
            token_ttl: 3600,
            google: GoogleConfig {
                client_id: "test-client-id".to_string(),
                client_secret: "test-client-secret".to_string(),
                auth_url: format!("{}/auth", provider_mock.uri()),
                token_url: format!("{}/token", provider_mock.uri()),
                userinfo_url: format!("{}/userinfo", provider_mock.uri()),
                exchange_timeout: 5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &[(&str, &str)] = &[
        ("AUTHGATE_JWT_SECRET", "a-jwt-secret"),
        ("AUTHGATE_COOKIE_SECRET", "a-cookie-secret"),
        ("AUTHGATE_SERVER_URL", "https://authgate.example.com"),
        ("AUTHGATE_GOOGLE_CLIENT_ID", "client-id"),
        ("AUTHGATE_GOOGLE_CLIENT_SECRET", "client-secret"),
    ];

    // Environment variables are process-wide, so the load scenarios run in a
    // single test to avoid interference between parallel tests.
    #[test]
    fn test_config_from_env() {
        for (name, _value) in std::env::vars() {
            if name.starts_with("AUTHGATE_") {
                std::env::remove_var(name);
            }
        }

        // Missing secrets must fail the load
        assert!(AppConfig::new().is_err());

        for (name, value) in REQUIRED {
            std::env::set_var(name, value);
        }

        let config = AppConfig::new().unwrap();
        assert_eq!(config.jwt_secret, "a-jwt-secret");
        assert_eq!(config.cookie_secret, "a-cookie-secret");
        assert_eq!(config.server_url, "https://authgate.example.com");
        assert_eq!(config.port, 3006);
        assert_eq!(config.token_ttl, 3600);
        assert_eq!(config.google.client_id, "client-id");
        assert_eq!(
            config.google.auth_url,
            "https://accounts.google.com/o/oauth2/v2/auth"
        );
        assert_eq!(config.google.exchange_timeout, 10);

        // Overrides apply on top of the defaults
        std::env::set_var("AUTHGATE_PORT", "8080");
        std::env::set_var("AUTHGATE_TOKEN_TTL", "60");
        let config = AppConfig::new().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl, 60);

        for (name, _value) in REQUIRED {
            std::env::remove_var(name);
        }
        std::env::remove_var("AUTHGATE_PORT");
        std::env::remove_var("AUTHGATE_TOKEN_TTL");
    }
}
