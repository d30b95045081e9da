//! Typed error hierarchy for the zentra crate.
//!
//! `ZentraError` gives every failure a structured category that callers can
//! match on. Every variant carries enough information to:
//! - Distinguish the failure boundary (configuration, auth, API, parse,
//!   network).
//! - Display a human-readable message that includes the relevant context
//!   (HTTP status code, response body, missing field name).
//!
//! Design rationale:
//! - `Configuration` is raised before any I/O happens. A request that is
//!   missing its serial number or token never reaches the network.
//! - `Auth` and `Api` both preserve the raw response body. ZentraCloud error
//!   responses contain short diagnostic messages that `error_for_status()`
//!   style handling would discard.
//! - `Network` wraps `reqwest::Error` for transport-level failures (DNS,
//!   TCP, TLS, timeouts) that don't produce an HTTP status code.
//! - `Parse` covers both serde deserialization failures and response bodies
//!   that deserialize but lack a field the wrapper documents.

use reqwest::StatusCode;

/// Unified error type for all zentra library operations.
///
/// Each variant corresponds to a distinct failure boundary. Nothing is
/// retried or suppressed internally; every error propagates to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ZentraError {
    /// A required parameter was missing or empty, detected before any
    /// network I/O was attempted.
    ///
    /// Raised when a device serial number is empty, when credentials are
    /// blank, or when a token string is empty.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token endpoint returned a non-success HTTP status code.
    ///
    /// This covers invalid credentials and disabled accounts. The `body`
    /// field preserves ZentraCloud's response text, which contains the
    /// reason for the rejection.
    #[error("authentication failed ({status}): {body}")]
    Auth {
        /// The HTTP status code returned by the token endpoint.
        status: StatusCode,
        /// The raw response body text. May be empty if the body could not
        /// be read.
        body: String,
    },

    /// A data endpoint (settings, statuses, readings) returned a failure.
    ///
    /// Usually a non-success HTTP status (bad token, unknown serial number,
    /// malformed query). ZentraCloud also reports some failures, such as an
    /// unknown serial number on the readings endpoint, inside a 2xx body
    /// with an `"Error"` key; those surface through this variant as well,
    /// with the 2xx status and the error body preserved.
    #[error("API error {status}: {body}")]
    Api {
        /// The HTTP status code returned by the endpoint.
        status: StatusCode,
        /// The raw response body text.
        body: String,
    },

    /// The response JSON could not be converted into the documented record
    /// shape: either it was not valid JSON, or a field the wrapper relies
    /// on was missing or of the wrong type.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A network-level failure occurred (DNS resolution, TCP connection,
    /// TLS handshake, request timeout).
    ///
    /// No HTTP status code is available because the request did not
    /// complete. Wraps the underlying `reqwest::Error`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<serde_json::Error> for ZentraError {
    fn from(err: serde_json::Error) -> Self {
        ZentraError::Parse(err.to_string())
    }
}

impl ZentraError {
    /// Shorthand for a `Parse` error about a field the response should
    /// have carried but didn't.
    pub(crate) fn missing(field: &str) -> Self {
        ZentraError::Parse(format!("response is missing required field `{field}`"))
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, ZentraError>;
