use crate::state::AppState;
use crate::token::VerifyError;
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use log::warn;
use serde_json::json;

/// Verified identity attached to the request for downstream handlers.
#[derive(Debug, Clone)]
pub struct AuthnIdentity(pub String);

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

// The client only ever sees these generic messages; the specific rejection
// reason goes to the log.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        };
        let body = Json(json!({
            "error": error_message,
        }));
        (status, body).into_response()
    }
}

/// Verifies the caller's access token and attaches the embedded identity to
/// the request. Runs in front of every protected route; a request that fails
/// here never reaches its handler.
pub(super) async fn authentication_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = match extract_token(&request) {
        Some(token) => token,
        None => {
            warn!("Attempt to access protected resource without a token");
            return Err(AuthError::MissingToken);
        }
    };

    let claims = state.tokens.verify(&token).map_err(|e| {
        match e {
            VerifyError::Expired => warn!("Rejected expired access token"),
            VerifyError::BadSignature => warn!("Rejected access token with invalid signature"),
            VerifyError::Malformed => warn!("Rejected malformed access token"),
        }
        AuthError::InvalidToken
    })?;

    request.extensions_mut().insert(AuthnIdentity(claims.id));
    Ok(next.run(request).await)
}

/// Pulls the candidate token out of the request.
///
/// The `Authorization` header always wins over the `token` query parameter;
/// when the header is present but invalid the request is rejected rather than
/// falling back to the query parameter, so the tie-break is deterministic.
fn extract_token(request: &Request<Body>) -> Option<String> {
    if let Some(header) = request.headers().get(http::header::AUTHORIZATION) {
        return header.to_str().ok().map(strip_bearer);
    }

    let query = request.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

// Tokens are issued raw in the Authorization response header, but clients
// commonly send them back with a "Bearer " prefix; accept both.
fn strip_bearer(value: &str) -> String {
    if value.to_lowercase().starts_with("bearer ") {
        value[7..].to_string()
    } else {
        value.to_string()
    }
}
