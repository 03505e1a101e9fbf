use crate::config::AppConfig;
use crate::directory::{Directory, StaticDirectory};
use crate::oauth::{OAuthClient, OAuthError};
use crate::token::TokenCodec;
use std::sync::Arc;

/// Shared application state. Everything here is constructed once at startup
/// and immutable afterwards, so requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenCodec>,
    pub directory: Arc<dyn Directory>,
    pub oauth: Arc<OAuthClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, OAuthError> {
        let oauth = OAuthClient::new(&config)?;
        Ok(Self {
            tokens: Arc::new(TokenCodec::new(&config.jwt_secret)),
            directory: Arc::new(StaticDirectory::with_default_people()),
            oauth: Arc::new(oauth),
            config: Arc::new(config),
        })
    }
}
