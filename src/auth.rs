//! Credential handling and token acquisition for the ZentraCloud API.
//!
//! ZentraCloud issues long-lived access tokens from `POST /api/v1/tokens`
//! in exchange for a username/password form body. The token never refreshes
//! locally: the vendor invalidates it server-side, and the caller acquires
//! a new one. Consumers pass the resulting [`ApiToken`] to
//! [`ZentraClient`](crate::client::ZentraClient), which attaches it as an
//! `Authorization: Token <value>` header on every data request.
//!
//! A pre-existing token string can be wrapped directly with
//! [`ApiToken::new`], bypassing the network entirely.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ZentraError};

/// ZentraCloud v1 token endpoint.
pub const TOKEN_URL: &str = "https://zentracloud.com/api/v1/tokens";

/// A validated username/password pair for the token endpoint.
///
/// Construction fails with `Configuration` when either value is empty,
/// so a `Credentials` in hand always represents a sendable login.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from explicit username and password values.
    ///
    /// # Errors
    ///
    /// - `ZentraError::Configuration` when either value is empty.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(ZentraError::Configuration(
                "username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(ZentraError::Configuration(
                "password must not be empty".to_string(),
            ));
        }
        Ok(Credentials { username, password })
    }

    /// Reads credentials from the `ZENTRA_UN` and `ZENTRA_PW` environment
    /// variables.
    ///
    /// Environment-based injection is a caller convention, not a library
    /// requirement; this constructor exists so scripts and test harnesses
    /// don't each reinvent it.
    ///
    /// # Errors
    ///
    /// - `ZentraError::Configuration` when either variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("ZENTRA_UN").unwrap_or_default();
        let password = std::env::var("ZENTRA_PW").unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(ZentraError::Configuration(
                "ZENTRA_UN and ZENTRA_PW must both be set".to_string(),
            ));
        }
        Credentials::new(username, password)
    }

    /// The username these credentials will log in as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Form body for the token endpoint (the build step, no I/O).
    fn to_request(&self) -> TokenRequest<'_> {
        TokenRequest {
            username: &self.username,
            password: &self.password,
        }
    }
}

/// Form body sent to the token endpoint.
/// Fields are serialized as `application/x-www-form-urlencoded` by
/// reqwest's `.form()`.
#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Subset of the token endpoint response that the library needs.
/// Additional fields are silently ignored by serde because the struct
/// is not marked `deny_unknown_fields`.
#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// An opaque, non-empty ZentraCloud access token.
///
/// Immutable once created. The library never refreshes or invalidates it;
/// if the vendor revokes the token, data requests start failing with
/// `Api` errors and the caller acquires a fresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a pre-existing token string, performing no network call.
    ///
    /// # Errors
    ///
    /// - `ZentraError::Configuration` when the token string is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(ZentraError::Configuration(
                "token must not be empty".to_string(),
            ));
        }
        Ok(ApiToken(token))
    }

    /// Reads a pre-existing token from the `ZENTRA_TOKEN` environment
    /// variable, performing no network call.
    ///
    /// # Errors
    ///
    /// - `ZentraError::Configuration` when the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        ApiToken::new(std::env::var("ZENTRA_TOKEN").unwrap_or_default())
    }

    /// The raw token value, as sent in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parses a token endpoint response body into an [`ApiToken`]
/// (the parse step, no I/O).
///
/// # Errors
///
/// - `ZentraError::Parse` when the body is not JSON, lacks the `token`
///   field, or carries an empty token.
pub fn parse_token_response(body: &str) -> Result<ApiToken> {
    let response: TokenResponse = serde_json::from_str(body)?;
    if response.token.is_empty() {
        return Err(ZentraError::Parse(
            "token endpoint returned an empty token".to_string(),
        ));
    }
    Ok(ApiToken(response.token))
}

/// Exchanges credentials for an access token (build + send + parse).
///
/// Performs exactly one HTTPS POST to [`TOKEN_URL`].
///
/// # Errors
///
/// - `ZentraError::Auth` when the token endpoint returns a non-success
///   status (invalid credentials). The response body is preserved.
/// - `ZentraError::Network` on transport-level failure.
/// - `ZentraError::Parse` when the success body lacks a usable token.
pub async fn acquire_token(credentials: &Credentials) -> Result<ApiToken> {
    acquire_token_at(TOKEN_URL, credentials).await
}

/// Like [`acquire_token`], but against an explicit token URL.
///
/// Exists so tests can point token acquisition at a local mock server
/// instead of the real ZentraCloud endpoint.
pub async fn acquire_token_at(token_url: &str, credentials: &Credentials) -> Result<ApiToken> {
    debug!(url = token_url, username = credentials.username(), "requesting access token");

    let client = reqwest::Client::new();
    let response = client
        .post(token_url)
        .form(&credentials.to_request())
        .send()
        .await?;

    // Read the body before checking the status so the vendor's rejection
    // reason survives into the error.
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ZentraError::Auth { status, body });
    }

    parse_token_response(&body)
}
