use crate::api::authn_middleware::AuthnIdentity;
use crate::directory::UserProfile;
use crate::openapi::USER_TAG;
use crate::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::StatusCode;
use log::debug;

#[utoipa::path(
    get,
    path = "/profile",
    tag = USER_TAG,
    params(
        ("Authorization" = String, Header, description = "Access token issued by /login"),
    ),
    responses(
        (status = 200, description = "Profile of the authenticated caller; empty body when the identity is not in the directory", body = UserProfile),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub(crate) async fn profile_handler(
    State(state): State<AppState>,
    Extension(AuthnIdentity(identity)): Extension<AuthnIdentity>,
) -> Response {
    match state.directory.lookup(&identity) {
        Some(profile) => Json(profile).into_response(),
        // A verified token for an identity outside the directory is a normal
        // outcome, not a fault: success status, empty body.
        None => {
            debug!("No directory entry for identity {identity}");
            StatusCode::OK.into_response()
        }
    }
}
