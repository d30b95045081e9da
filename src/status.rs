//! Device status for the ZentraCloud API.
//!
//! This module wraps `GET /api/v1/statuses`, which reports device health:
//! accumulated error counters and the cellular modem's connection history.
//! Like settings, status entries are timestamped server-side and the
//! optional `start_time`/`end_time` filters narrow which entries are
//! returned.
//!
//! The three-step contract:
//! - [`build_query`] validates the serial number and encodes the filters
//!   (no I/O).
//! - [`DeviceStatus::parse`] converts a response body into a typed record
//!   (no I/O, usable on saved fixtures).
//! - [`get_status`] composes build + send + parse.

use serde::Deserialize;

use crate::client::{require_sn, ZentraClient};
use crate::error::Result;
use crate::settings::{DeviceEnvelope, DeviceInfo, TimeRange};

// ── Status record ──────────────────────────────────────────────────────

/// A device's health report at the time of the request. Immutable snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceStatus {
    /// Device identity block.
    pub device_info: DeviceInfo,

    /// Error counters accumulated by the logger. Devices reset these on
    /// firmware update, so treat them as monotone only between resets.
    #[serde(default)]
    pub device_error_counters: DeviceErrorCounters,

    /// Cellular connection reports, one entry per upload attempt in the
    /// requested window. Empty for devices without a cellular modem.
    #[serde(default)]
    pub cellular_statuses: Vec<CellularStatus>,

    /// Error counters for the cellular modem. Defaults to all-`None` for
    /// devices without one.
    #[serde(default)]
    pub cellular_error_counters: CellularErrorCounters,
}

impl DeviceStatus {
    /// Parses a statuses response body into a typed record
    /// (the parse step, no I/O).
    ///
    /// # Errors
    ///
    /// - `ZentraError::Parse` when the payload lacks the `device` envelope,
    ///   the `device_info` block, or the serial number inside it.
    pub fn parse(body: serde_json::Value) -> Result<Self> {
        let envelope: DeviceEnvelope<DeviceStatus> = serde_json::from_value(body)?;
        Ok(envelope.device)
    }
}

/// Logger-level error counters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceErrorCounters {
    /// Per-port sensor error counts.
    #[serde(default)]
    pub sensor_errors: Vec<SensorErrorCount>,

    /// Number of recorded power failures.
    #[serde(default)]
    pub power_failures: Option<i64>,

    /// Number of watchdog resets.
    #[serde(default)]
    pub watchdog_resets: Option<i64>,
}

/// Error count for one sensor port.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorErrorCount {
    /// Logger port the counter belongs to.
    #[serde(default)]
    pub port: Option<u32>,

    /// Accumulated error count on that port.
    #[serde(default)]
    pub errors: Option<i64>,
}

/// One cellular connection report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CellularStatus {
    /// UTC seconds of the report.
    #[serde(default)]
    pub timestamp: Option<i64>,

    /// Received signal strength indicator, dBm.
    #[serde(default)]
    pub rssi: Option<i64>,

    /// Signal strength as a percentage.
    #[serde(default)]
    pub signal_percent: Option<i64>,

    /// Network/carrier the modem registered with.
    #[serde(default)]
    pub network: Option<String>,
}

/// Cellular modem error counters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CellularErrorCounters {
    /// Failed network registrations.
    #[serde(default)]
    pub registration_failures: Option<i64>,

    /// Failed connection attempts after registration.
    #[serde(default)]
    pub connection_failures: Option<i64>,

    /// Uploads that failed mid-transmission.
    #[serde(default)]
    pub transmission_failures: Option<i64>,
}

// ── Build + get ────────────────────────────────────────────────────────

/// Builds the query pairs for a statuses request (the build step, no I/O).
///
/// # Errors
///
/// - `ZentraError::Configuration` when `sn` is empty. No network call is
///   attempted in that case.
pub fn build_query(sn: &str, range: &TimeRange) -> Result<Vec<(&'static str, String)>> {
    let mut pairs = vec![("sn", require_sn(sn)?)];
    range.extend_query(&mut pairs);
    Ok(pairs)
}

/// Retrieves a device's status (build + send + parse in one call).
///
/// # Errors
///
/// - `ZentraError::Configuration` when `sn` is empty (no network call).
/// - `ZentraError::Api` when the endpoint returns a non-success status.
/// - `ZentraError::Parse` when the response payload lacks documented
///   fields.
/// - `ZentraError::Network` on transport-level failure.
pub async fn get_status(
    client: &ZentraClient,
    sn: &str,
    range: &TimeRange,
) -> Result<DeviceStatus> {
    let query = build_query(sn, range)?;
    let body = client.get_json("statuses", &query).await?;
    DeviceStatus::parse(body)
}
