//! Device settings for the ZentraCloud API.
//!
//! This module wraps `GET /api/v1/settings`, which returns the
//! configuration of one device (logger) as recorded by the vendor:
//! measurement intervals, time settings, GPS locations, and installation
//! metadata. Settings are versioned server-side; each sub-record carries a
//! `valid_since` timestamp and the optional `start_time`/`end_time` filters
//! narrow which versions are returned.
//!
//! The three-step contract:
//! - [`build_query`] validates the serial number and encodes the filters
//!   (no I/O).
//! - [`DeviceSettings::parse`] converts a response body into a typed
//!   record (no I/O, usable on saved fixtures).
//! - [`get_settings`] composes build + send + parse and is the primary
//!   entry point.
//!
//! This module also owns the types shared by all three data endpoints:
//! [`DeviceInfo`] and the [`DeviceEnvelope`] response wrapper.

use serde::Deserialize;

use crate::client::{require_sn, ZentraClient};
use crate::error::Result;

// ── Shared response types ──────────────────────────────────────────────

/// Identity block returned by every data endpoint under
/// `device.device_info`.
///
/// `device_sn` is always present; the remaining fields depend on device
/// model and firmware and default to `None` when omitted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceInfo {
    /// Vendor-assigned serial number (e.g. `"06-00187"`).
    pub device_sn: String,

    /// User-assigned device name, when one has been configured.
    #[serde(default)]
    pub device_name: Option<String>,

    /// Numeric device model code.
    #[serde(default)]
    pub device_type: Option<i64>,

    /// Firmware version number currently reported by the device.
    #[serde(default)]
    pub device_fw: Option<i64>,
}

/// Response envelope used by every data endpoint.
///
/// ZentraCloud nests each payload under a top-level `device` key,
/// `{ "device": ... }`. This wrapper is generic so the settings, status,
/// and readings modules can all reuse it.
#[derive(Debug, Deserialize)]
pub struct DeviceEnvelope<T> {
    /// The endpoint-specific payload.
    pub device: T,
}

// ── Settings record ────────────────────────────────────────────────────

/// A device's settings at the time of the request. Immutable snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceSettings {
    /// Device identity block.
    pub device_info: DeviceInfo,

    /// Measurement interval configuration, one entry per settings version.
    #[serde(default)]
    pub measurement_settings: Vec<MeasurementSetting>,

    /// Device clock configuration, one entry per settings version.
    #[serde(default)]
    pub time_settings: Vec<TimeSetting>,

    /// GPS fixes recorded for the device, one entry per settings version.
    #[serde(default)]
    pub locations: Vec<Location>,

    /// Installation metadata entries. The first entry is the active one;
    /// see [`DeviceSettings::installation`].
    #[serde(default)]
    pub installation_metadata: Vec<InstallationMetadata>,
}

impl DeviceSettings {
    /// Parses a settings response body into a typed record
    /// (the parse step, no I/O).
    ///
    /// # Errors
    ///
    /// - `ZentraError::Parse` when the payload lacks the `device` envelope,
    ///   the `device_info` block, or the serial number inside it.
    pub fn parse(body: serde_json::Value) -> Result<Self> {
        let envelope: DeviceEnvelope<DeviceSettings> = serde_json::from_value(body)?;
        Ok(envelope.device)
    }

    /// The currently active installation record, when the device has one.
    pub fn installation(&self) -> Option<&InstallationMetadata> {
        self.installation_metadata.first()
    }
}

/// How often the device samples and uploads, valid from `valid_since`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeasurementSetting {
    /// UTC seconds since which this settings version applies.
    pub valid_since: i64,

    /// Seconds between sensor measurements.
    #[serde(default)]
    pub measurement_interval_seconds: Option<i64>,

    /// Seconds between uploads to ZentraCloud.
    #[serde(default)]
    pub update_interval_seconds: Option<i64>,
}

/// Device clock configuration, valid from `valid_since`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeSetting {
    /// UTC seconds since which this settings version applies.
    pub valid_since: i64,

    /// Offset of the device's local clock from UTC, in seconds.
    #[serde(default)]
    pub device_time_offset: Option<i64>,

    /// Vendor daylight-saving mode code.
    #[serde(default)]
    pub daylight_saving_mode: Option<i64>,
}

/// A GPS fix recorded for the device, valid from `valid_since`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    /// UTC seconds since which this fix applies.
    pub valid_since: i64,

    /// Latitude in decimal degrees.
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees.
    #[serde(default)]
    pub longitude: Option<f64>,

    /// Altitude in meters, when the fix includes one.
    #[serde(default)]
    pub altitude: Option<f64>,

    /// Horizontal accuracy of the fix in meters.
    #[serde(default)]
    pub accuracy: Option<f64>,
}

/// Free-form installation details entered by the user in ZentraCloud.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstallationMetadata {
    /// Site name as entered in ZentraCloud.
    #[serde(default)]
    pub site_name: Option<String>,

    /// Application or crop description.
    #[serde(default)]
    pub application: Option<String>,

    /// Mounting elevation per sensor port.
    #[serde(default)]
    pub sensor_elevations: Vec<SensorElevation>,
}

/// Mounting elevation of one sensor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorElevation {
    /// Logger port the sensor is attached to.
    #[serde(default)]
    pub port: Option<u32>,

    /// Elevation value relative to the installation reference.
    #[serde(default)]
    pub elevation: Option<f64>,

    /// Units of the elevation value.
    #[serde(default)]
    pub units: Option<String>,
}

// ── Query types ────────────────────────────────────────────────────────

/// Optional time-range filter shared by the settings and statuses
/// endpoints. Both bounds are UTC seconds and inclusive: `start_time`
/// keeps entries with timestamps `>=` it, `end_time` keeps entries `<=`
/// it. `Default` leaves both unset, returning everything the vendor has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRange {
    /// Inclusive lower bound, UTC seconds.
    pub start_time: Option<i64>,
    /// Inclusive upper bound, UTC seconds.
    pub end_time: Option<i64>,
}

impl TimeRange {
    /// Appends the set bounds to a query-pair list.
    pub(crate) fn extend_query(&self, pairs: &mut Vec<(&'static str, String)>) {
        if let Some(start_time) = self.start_time {
            pairs.push(("start_time", start_time.to_string()));
        }
        if let Some(end_time) = self.end_time {
            pairs.push(("end_time", end_time.to_string()));
        }
    }
}

/// Builds the query pairs for a settings request (the build step, no I/O).
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

// ── Endpoint function ──────────────────────────────────────────────────

/// Retrieves a device's settings (build + send + parse in one call).
///
/// # Errors
///
/// - `ZentraError::Configuration` when `sn` is empty (no network call).
/// - `ZentraError::Api` when the endpoint returns a non-success status,
///   e.g. an invalid token or an unknown serial number.
/// - `ZentraError::Parse` when the response payload lacks documented
///   fields.
/// - `ZentraError::Network` on transport-level failure.
pub async fn get_settings(
    client: &ZentraClient,
    sn: &str,
    range: &TimeRange,
) -> Result<DeviceSettings> {
    let query = build_query(sn, range)?;
    let body = client.get_json("settings", &query).await?;
    DeviceSettings::parse(body)
}
