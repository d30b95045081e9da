//! Integration tests for token acquisition using wiremock.
//!
//! These tests mock the ZentraCloud token endpoint to verify that the
//! auth module sends the right form body, parses the token out of the
//! response, and preserves the vendor's rejection reason on failure.

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zentra::auth::{acquire_token_at, ApiToken, Credentials};
use zentra::error::ZentraError;

fn token_url(server: &MockServer) -> String {
    format!("{}/api/v1/tokens", server.uri())
}

#[tokio::test]
async fn valid_credentials_yield_a_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=ladybird"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "4f1d68a3b2c94a6c9d3f"
        })))
        .mount(&server)
        .await;

    let credentials = Credentials::new("ladybird", "hunter2").unwrap();
    let token = acquire_token_at(&token_url(&server), &credentials)
        .await
        .unwrap();

    assert!(
        !token.as_str().is_empty(),
        "a successful login must yield a non-empty token"
    );
    assert_eq!(token.as_str(), "4f1d68a3b2c94a6c9d3f");
}

#[tokio::test]
async fn invalid_credentials_surface_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "non_field_errors": ["Unable to login with provided credentials."]
        })))
        .mount(&server)
        .await;

    let credentials = Credentials::new("ladybird", "wrong").unwrap();
    let result = acquire_token_at(&token_url(&server), &credentials).await;

    match result {
        Err(ZentraError::Auth { status, body }) => {
            assert_eq!(status.as_u16(), 400);
            assert!(
                body.contains("Unable to login"),
                "the vendor's rejection reason must be preserved, got: {body}"
            );
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_token_body_is_a_parse_error() {
    let server = MockServer::start().await;

    // A 200 whose body lacks the token field, e.g. a captive portal or a
    // misconfigured proxy answering in the vendor's place.
    Mock::given(method("POST"))
        .and(path("/api/v1/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "detail": "ok"
        })))
        .mount(&server)
        .await;

    let credentials = Credentials::new("ladybird", "hunter2").unwrap();
    let result = acquire_token_at(&token_url(&server), &credentials).await;

    assert!(
        matches!(result, Err(ZentraError::Parse(_))),
        "a success body without a token must be a parse error"
    );
}

#[tokio::test]
async fn direct_token_performs_zero_network_calls() {
    // A server that expects no requests at all: wrapping an existing
    // token string must never touch the network.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let token = ApiToken::new("abc123").unwrap();
    assert_eq!(token.as_str(), "abc123");

    server.verify().await;
}

#[tokio::test]
async fn empty_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(matches!(
        Credentials::new("", "hunter2"),
        Err(ZentraError::Configuration(_))
    ));
    assert!(matches!(
        Credentials::new("ladybird", ""),
        Err(ZentraError::Configuration(_))
    ));

    server.verify().await;
}
