use crate::openapi::USER_TAG;
use axum::extract::Path;

#[utoipa::path(
    get,
    path = "/{name}",
    tag = USER_TAG,
    params(
        ("name" = String, Path, description = "Name to greet, percent-encoded"),
        ("Authorization" = String, Header, description = "Access token issued by /login"),
    ),
    responses(
        (status = 200, description = "Plaintext greeting with the name re-escaped for transport"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub(crate) async fn greet_handler(Path(name): Path<String>) -> String {
    // The router percent-decodes the path segment; re-escape it so the
    // greeting stays transport-safe whatever the client sent.
    format!("Hello, {}!", urlencoding::encode(&name))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::TestFixture;
    use http::StatusCode;

    #[tokio::test]
    async fn test_greet_reescapes_decoded_name() {
        let fixture = TestFixture::new().await;
        let token = fixture.issue_token("1", 3600);

        let response = fixture.get_with_token("/hello%20world", &token).await;
        response.assert_ok();
        assert_eq!(response.text(), "Hello, hello%20world!");
    }

    #[tokio::test]
    async fn test_greet_plain_name() {
        let fixture = TestFixture::new().await;
        let token = fixture.issue_token("2", 3600);

        let response = fixture.get_with_token("/world", &token).await;
        response.assert_ok();
        assert_eq!(response.text(), "Hello, world!");
    }

    #[tokio::test]
    async fn test_greet_requires_token() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/world").await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}
