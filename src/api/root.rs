use crate::openapi::USER_TAG;
use axum::Json;
use serde_json::{json, Value};

#[utoipa::path(
    get,
    path = "/",
    tag = USER_TAG,
    responses(
        (status = 200, description = "Informational text, no authentication required")
    )
)]
pub(crate) async fn root_handler() -> Json<Value> {
    Json(json!({ "text": "Token not required" }))
}
