use crate::errors::ApiError;
use crate::oauth::{OAuthError, ProviderProfile};
use crate::openapi::AUTH_TAG;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::{header, HeaderMap, StatusCode};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;

/// Message returned alongside a freshly issued token
const SUCCESS_TEXT: &str = "Tokens for the select few! Check your authorization header.";

/// Callback parameters the provider may append when redirecting back to us
#[derive(Debug, Deserialize)]
pub(crate) struct LoginQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/login",
    tag = AUTH_TAG,
    responses(
        (status = 302, description = "Redirect to the identity provider's consent screen"),
        (status = 200, description = "Login succeeded; the access token is in the Authorization response header"),
        (status = 401, description = "The provider denied the login or the handshake failed")
    )
)]
pub(crate) async fn login_handler(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Response {
    // Provider denials come back as an `error` callback parameter
    if let Some(error) = query.error {
        let message = query.error_description.unwrap_or(error);
        warn!("Login denied by provider: {message}");
        return handshake_failure(&message);
    }

    // A `code` parameter means we are on the callback leg of the handshake
    if let Some(code) = query.code {
        let Some(returned_state) = query.state else {
            warn!("Login callback without a state parameter");
            return handshake_failure(&OAuthError::MissingState.to_string());
        };
        let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());

        return match state
            .oauth
            .complete(&code, &returned_state, cookie_header)
            .await
        {
            Ok(profile) => issue_token_response(&state, &profile),
            Err(e) => {
                warn!("Login handshake failed: {e}");
                handshake_failure(&e.to_string())
            }
        };
    }

    // No prior authentication state: send the client to the provider
    match state.oauth.begin() {
        Ok(redirect) => (
            StatusCode::FOUND,
            [
                (header::LOCATION, redirect.location),
                (header::SET_COOKIE, redirect.set_cookie),
            ],
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start login flow: {e}");
            ApiError::internal("failed to start login flow").into_response()
        }
    }
}

/// Converts the provider's identity assertion into an access token, returned
/// in the `Authorization` response header rather than the body.
fn issue_token_response(state: &AppState, profile: &ProviderProfile) -> Response {
    match state.tokens.issue(&profile.id, state.config.token_ttl) {
        Ok(token) => {
            info!("Issued access token for identity {}", profile.id);
            (
                StatusCode::OK,
                [
                    (header::AUTHORIZATION, token),
                    (header::SET_COOKIE, state.oauth.clear_state_cookie()),
                ],
                Json(json!({ "text": SUCCESS_TEXT })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to issue access token: {e}");
            ApiError::internal("failed to issue access token").into_response()
        }
    }
}

/// Terminal per-request handshake failure: the underlying message reaches the
/// client, no token is issued, and the server keeps serving.
fn handshake_failure(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        format!("Authentication failed due to {message}"),
    )
        .into_response()
}
