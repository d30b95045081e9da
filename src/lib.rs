//! Async Rust client library for the ZentraCloud v1 API.
//!
//! Wraps the tokenized ZentraCloud REST endpoints: token acquisition,
//! device settings, device status, and time-series readings. JSON
//! responses are converted into typed, in-memory records.
//!
//! Each endpoint follows the same three-step contract: a `build_query`
//! function that validates parameters and encodes filters (no I/O), a
//! `parse` function that converts a response body into typed records (no
//! I/O, usable on saved fixtures), and a `get` function that composes
//! build + send + parse and is the primary entry point.
//!
//! # Modules
//!
//! - [`auth`]: credentials and access-token acquisition.
//! - [`client`]: authenticated HTTP client shared by the data endpoints.
//! - [`error`]: typed error hierarchy (`ZentraError`).
//! - [`readings`]: per-sensor time-series readings with mrid cursors.
//! - [`settings`]: device configuration snapshots.
//! - [`status`]: device health and cellular status.
//!
//! # Quick Start
//!
//! ```ignore
//! use zentra::auth::{acquire_token, Credentials};
//! use zentra::client::ZentraClient;
//! use zentra::readings::{get_readings, ReadingsQuery};
//!
//! let credentials = Credentials::from_env()?;
//! let token = acquire_token(&credentials).await?;
//! let client = ZentraClient::new(token);
//!
//! let query = ReadingsQuery { start_mrid: Some(103226), ..Default::default() };
//! let readings = get_readings(&client, "06-00187", &query).await?;
//! ```
//!
//! The library performs exactly one HTTP round trip per `get` call: no
//! retries, no token refresh, no auto-pagination. Callers paginate
//! readings by repeating `get` with an updated `start_mrid`.

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod error;
pub mod readings;
pub mod settings;
pub mod status;
