use crate::directory::UserProfile;
use utoipa::OpenApi;

pub(crate) const AUTH_TAG: &str = "Authentication API";
pub(crate) const USER_TAG: &str = "User API";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::root::root_handler,
        crate::api::login::login_handler,
        crate::api::profile::profile_handler,
        crate::api::greet::greet_handler,
    ),
    components(schemas(UserProfile)),
    tags(
        (name = AUTH_TAG, description = "OAuth2 login and token issuance"),
        (name = USER_TAG, description = "Token-protected user endpoints"),
    ),
    info(
        title = "authgate API",
        description = "OAuth2 login and token-based authorization service",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
