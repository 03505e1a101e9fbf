pub(crate) mod authn_middleware;
pub(crate) mod greet;
pub(crate) mod login;
pub(crate) mod profile;
pub(crate) mod root;

use crate::state::AppState;
use axum::{middleware, routing::get, Router};

/// Combines all routes into a single router.
///
/// The route table is static: it is evaluated once at startup and nothing is
/// registered afterwards.
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(root::root_handler))
        .route(
            "/login",
            get(login::login_handler).post(login::login_handler),
        )
        .merge(protected_routes(state))
}

/// Creates a router for protected routes that require a verified access token.
///
/// `/login` stays outside this router on purpose: it drives its own handshake
/// and must stay reachable without a token (try-mode authentication).
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::profile_handler))
        .route("/{name}", get(greet::greet_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authn_middleware::authentication_middleware,
        ))
}
