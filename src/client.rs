//! Authenticated HTTP client for the ZentraCloud v1 API.
//!
//! `ZentraClient` wraps a `reqwest::Client`, a base URL, and an immutable
//! [`ApiToken`], providing the single JSON GET helper that the settings,
//! statuses, and readings wrappers share. The client is passed explicitly
//! into every endpoint call; there is no ambient global session.
//!
//! Token lifecycle:
//! - The token is set once at construction and never changes. ZentraCloud
//!   tokens don't expire on a schedule; the vendor invalidates them
//!   server-side, at which point requests fail with `Api` errors and the
//!   caller acquires a fresh token.
//! - No 401 retry, no backoff: one HTTP failure is one error.

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::auth::ApiToken;
use crate::error::{Result, ZentraError};

/// ZentraCloud v1 API base. All data endpoint paths are relative to this.
const BASE_URL: &str = "https://zentracloud.com/api/v1/";

/// Connect timeout for API calls. Covers TCP + TLS handshake only.
const API_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout. Readings responses for a wide time range can
/// run to several megabytes of JSON, so this is well above the connect
/// timeout.
const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds a `reqwest::Client` with explicit timeouts for API calls.
fn build_api_client() -> Client {
    Client::builder()
        .connect_timeout(API_CONNECT_TIMEOUT)
        .timeout(API_REQUEST_TIMEOUT)
        .build()
        .expect("failed to build HTTP client for the ZentraCloud API")
}

/// Authenticated HTTP client for the ZentraCloud data endpoints.
///
/// Design decisions:
/// - `base_url` is stored as a `String` rather than a `&'static str` so it
///   can be overridden in tests (e.g. pointing at a wiremock server).
/// - The token cannot be empty: [`ApiToken`] construction enforces that,
///   so a `ZentraClient` in hand always carries a sendable credential.
#[derive(Debug, Clone)]
pub struct ZentraClient {
    client: Client,
    base_url: String,
    token: ApiToken,
}

impl ZentraClient {
    /// Creates a client against the production ZentraCloud API.
    pub fn new(token: ApiToken) -> Self {
        ZentraClient {
            client: build_api_client(),
            base_url: BASE_URL.to_string(),
            token,
        }
    }

    /// Constructor that accepts a custom base URL, used by tests to point
    /// at a local mock server instead of the real API. The base URL must
    /// end with `/`; endpoint paths are appended to it verbatim.
    pub fn with_base_url(token: ApiToken, base_url: &str) -> Self {
        ZentraClient {
            client: build_api_client(),
            base_url: base_url.to_string(),
            token,
        }
    }

    /// The token this client authenticates with.
    pub fn token(&self) -> &ApiToken {
        &self.token
    }

    /// Sends an authenticated GET request and returns the response body as
    /// loosely typed JSON. All three endpoint wrappers delegate here.
    ///
    /// `path` is relative to the base URL (no leading slash). `query` pairs
    /// are appended as URL query parameters.
    ///
    /// ZentraCloud reports some failures, such as an unknown serial number
    /// on the readings endpoint, inside a 2xx body shaped
    /// `{"Error": "..."}`. Those are detected here and surfaced as
    /// `Api` errors so no wrapper mistakes them for a malformed record.
    pub(crate) async fn get_json(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "sending GET request");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Token {}", self.token.as_str()))
            .query(query)
            .send()
            .await?;

        // Read the body before checking the status so the vendor's
        // diagnostic message survives into the error.
        let status = response.status();
        let body = response.text().await?;
        debug!(%url, %status, "received response");

        if !status.is_success() {
            return Err(ZentraError::Api { status, body });
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;

        if value.get("Error").is_some() {
            return Err(ZentraError::Api { status, body });
        }

        Ok(value)
    }
}

/// Validates a device serial number before it is placed into a query.
///
/// Serial numbers are vendor-assigned strings like `"06-00187"`. The
/// library doesn't second-guess the format beyond non-emptiness; an
/// unknown serial number is the vendor's call and comes back as an
/// `Api` error.
pub(crate) fn require_sn(sn: &str) -> Result<String> {
    if sn.trim().is_empty() {
        return Err(ZentraError::Configuration(
            "device serial number must not be empty".to_string(),
        ));
    }
    Ok(sn.to_string())
}
