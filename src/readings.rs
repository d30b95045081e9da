//! Time-series readings for the ZentraCloud API.
//!
//! This module wraps `GET /api/v1/readings`. The endpoint returns one or
//! more timeseries blocks per device; a new block starts whenever the
//! sensor configuration changes. Within a block, the vendor packs readings
//! as rows of a heterogeneous JSON array:
//!
//! ```text
//! [timestamp, mrid, rssi, [port-1 measurements], [port-2 measurements], ...]
//! ```
//!
//! Column 3 is port 1. [`DeviceReadings::parse`] pivots these rows into
//! per-port series ([`PortSeries`]) ordered by non-decreasing timestamp,
//! which is the shape callers actually consume.
//!
//! Every reading carries an `mrid`, a monotonically increasing record
//! identifier. The `start_mrid`/`end_mrid` filters select on it, which
//! makes `mrid` the natural cursor for caller-driven pagination: request,
//! note the highest `mrid` received, repeat with `start_mrid` one past it.
//! The library never stitches pages itself.
//!
//! The three-step contract:
//! - [`build_query`] validates the serial number and encodes the filters
//!   (no I/O).
//! - [`DeviceReadings::parse`] converts a response body into typed records
//!   (no I/O, usable on saved fixtures).
//! - [`get_readings`] composes build + send + parse.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::client::{require_sn, ZentraClient};
use crate::error::{Result, ZentraError};
use crate::settings::DeviceInfo;

// ── Query types ────────────────────────────────────────────────────────

/// Optional filters for the readings endpoint. All bounds are inclusive:
/// `start_time`/`end_time` select on the reading timestamp (UTC seconds),
/// `start_mrid`/`end_mrid` select on the record identifier. `Default`
/// leaves everything unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingsQuery {
    /// Keep readings with timestamps `>=` this value, UTC seconds.
    pub start_time: Option<i64>,
    /// Keep readings with timestamps `<=` this value, UTC seconds.
    pub end_time: Option<i64>,
    /// Keep readings with `mrid >=` this value. The pagination cursor.
    pub start_mrid: Option<i64>,
    /// Keep readings with `mrid <=` this value.
    pub end_mrid: Option<i64>,
}

/// Builds the query pairs for a readings request (the build step, no I/O).
///
/// # Errors
///
/// - `ZentraError::Configuration` when `sn` is empty. No network call is
///   attempted in that case.
pub fn build_query(sn: &str, query: &ReadingsQuery) -> Result<Vec<(&'static str, String)>> {
    let mut pairs = vec![("sn", require_sn(sn)?)];
    if let Some(start_time) = query.start_time {
        pairs.push(("start_time", start_time.to_string()));
    }
    if let Some(end_time) = query.end_time {
        pairs.push(("end_time", end_time.to_string()));
    }
    if let Some(start_mrid) = query.start_mrid {
        pairs.push(("start_mrid", start_mrid.to_string()));
    }
    if let Some(end_mrid) = query.end_mrid {
        pairs.push(("end_mrid", end_mrid.to_string()));
    }
    Ok(pairs)
}

// ── Response types ─────────────────────────────────────────────────────

/// A device's readings at the time of the request. Immutable snapshot;
/// all children are owned by this record.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReadings {
    /// Device identity block.
    pub device_info: DeviceInfo,

    /// One block per sensor configuration present in the requested window.
    pub timeseries: Vec<TimeseriesRecord>,
}

/// Readings recorded under one sensor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesRecord {
    /// UTC seconds since which this configuration applies.
    pub valid_since: i64,

    /// The sensors attached while this configuration was active.
    pub sensors: Vec<SensorConfig>,

    /// Per-port series pivoted from the vendor's row format, keyed in
    /// ascending port order.
    pub ports: Vec<PortSeries>,
}

/// One attached sensor as reported in a timeseries configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorConfig {
    /// Logger port the sensor is attached to.
    #[serde(default)]
    pub port: Option<u32>,

    /// Vendor sensor model number.
    #[serde(default)]
    pub sensor_number: Option<i64>,

    /// Human-readable sensor name.
    #[serde(default)]
    pub sensor_name: Option<String>,
}

/// The readings of one sensor port, ordered by non-decreasing timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PortSeries {
    /// Logger port number (1-based).
    pub port: u32,

    /// The readings, sorted by timestamp.
    pub readings: Vec<Reading>,
}

/// One reading of one port at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// When the device recorded the reading.
    pub timestamp: DateTime<Utc>,

    /// Monotonically increasing record identifier. Usable as a cursor via
    /// [`ReadingsQuery::start_mrid`].
    pub mrid: i64,

    /// Cellular signal strength at upload time, dBm.
    pub rssi: i64,

    /// The sensor outputs recorded at this instant. A multi-output sensor
    /// (e.g. an atmospheric sensor) reports several measurements per
    /// reading.
    pub measurements: Vec<Measurement>,
}

/// A single sensor output value with its metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measurement {
    /// What the value measures (e.g. `"Air Temperature"`).
    #[serde(default)]
    pub description: Option<String>,

    /// Units of the value (e.g. `" °C"`; the vendor pads some unit
    /// strings with a leading space).
    #[serde(default)]
    pub units: Option<String>,

    /// The measured value. `None` when the sensor reported no value for
    /// this output.
    #[serde(default)]
    pub value: Option<f64>,

    /// Sensor-level error flag for this output.
    #[serde(default)]
    pub error: bool,
}

// ── Parsing ────────────────────────────────────────────────────────────

impl DeviceReadings {
    /// Parses a readings response body into typed records
    /// (the parse step, no I/O).
    ///
    /// Pivots the vendor's row-major `values` arrays into per-port series
    /// and sorts each series by timestamp.
    ///
    /// # Errors
    ///
    /// - `ZentraError::Parse` when the payload lacks the `device`
    ///   envelope, a `configuration` block, the `values` rows, or when a
    ///   row is malformed (fewer than three columns, non-numeric
    ///   timestamp/mrid/rssi, or a port cell that is not a measurement
    ///   list).
    pub fn parse(body: serde_json::Value) -> Result<Self> {
        let device = body
            .get("device")
            .ok_or_else(|| ZentraError::missing("device"))?;

        let device_info: DeviceInfo = serde_json::from_value(
            device
                .get("device_info")
                .cloned()
                .ok_or_else(|| ZentraError::missing("device.device_info"))?,
        )?;

        let timeseries = match device.get("timeseries") {
            Some(entries) => entries
                .as_array()
                .ok_or_else(|| {
                    ZentraError::Parse("`device.timeseries` is not an array".to_string())
                })?
                .iter()
                .map(TimeseriesRecord::parse)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(DeviceReadings {
            device_info,
            timeseries,
        })
    }

    /// The highest `mrid` present in any series, or `None` when the
    /// response carried no readings. Callers paginate by passing this
    /// plus one as the next request's `start_mrid`.
    pub fn last_mrid(&self) -> Option<i64> {
        self.timeseries
            .iter()
            .flat_map(|record| &record.ports)
            .flat_map(|series| &series.readings)
            .map(|reading| reading.mrid)
            .max()
    }
}

impl TimeseriesRecord {
    fn parse(entry: &serde_json::Value) -> Result<Self> {
        let configuration = entry
            .get("configuration")
            .ok_or_else(|| ZentraError::missing("timeseries.configuration"))?;

        let valid_since = configuration
            .get("valid_since")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| ZentraError::missing("configuration.valid_since"))?;

        let sensors: Vec<SensorConfig> = match configuration.get("sensors") {
            Some(sensors) => serde_json::from_value(sensors.clone())?,
            None => Vec::new(),
        };

        let rows = configuration
            .get("values")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| ZentraError::missing("configuration.values"))?;

        // Pivot row-major values into per-port series. BTreeMap keeps the
        // ports in ascending order.
        let mut ports: BTreeMap<u32, Vec<Reading>> = BTreeMap::new();
        for row in rows {
            let row = row
                .as_array()
                .ok_or_else(|| ZentraError::Parse("values row is not an array".to_string()))?;
            if row.len() < 3 {
                return Err(ZentraError::Parse(
                    "values row has fewer than three columns".to_string(),
                ));
            }

            let timestamp_secs = row[0]
                .as_i64()
                .ok_or_else(|| ZentraError::Parse("row timestamp is not a number".to_string()))?;
            let timestamp = DateTime::<Utc>::from_timestamp(timestamp_secs, 0).ok_or_else(|| {
                ZentraError::Parse(format!("row timestamp {timestamp_secs} is out of range"))
            })?;
            let mrid = row[1]
                .as_i64()
                .ok_or_else(|| ZentraError::Parse("row mrid is not a number".to_string()))?;
            let rssi = row[2]
                .as_i64()
                .ok_or_else(|| ZentraError::Parse("row rssi is not a number".to_string()))?;

            // Column 3 is port 1, column 4 is port 2, and so on.
            for (offset, cell) in row[3..].iter().enumerate() {
                let port = offset as u32 + 1;
                let measurements: Vec<Measurement> = serde_json::from_value(cell.clone())?;
                ports.entry(port).or_default().push(Reading {
                    timestamp,
                    mrid,
                    rssi,
                    measurements,
                });
            }
        }

        let ports = ports
            .into_iter()
            .map(|(port, mut readings)| {
                // The vendor returns rows in upload order, which is almost
                // always chronological; sort to guarantee the ordering
                // invariant regardless. Stable, so equal timestamps keep
                // their mrid order.
                readings.sort_by_key(|reading| reading.timestamp);
                PortSeries { port, readings }
            })
            .collect();

        Ok(TimeseriesRecord {
            valid_since,
            sensors,
            ports,
        })
    }
}

// ── Endpoint function ──────────────────────────────────────────────────

/// Retrieves a device's readings (build + send + parse in one call).
///
/// # Errors
///
/// - `ZentraError::Configuration` when `sn` is empty (no network call).
/// - `ZentraError::Api` when the endpoint returns a non-success status,
///   or reports an unknown serial number inside a 2xx body.
/// - `ZentraError::Parse` when the response payload lacks documented
///   fields or a values row is malformed.
/// - `ZentraError::Network` on transport-level failure.
pub async fn get_readings(
    client: &ZentraClient,
    sn: &str,
    query: &ReadingsQuery,
) -> Result<DeviceReadings> {
    let pairs = build_query(sn, query)?;
    let body = client.get_json("readings", &pairs).await?;
    DeviceReadings::parse(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two rows, two ports: an atmospheric sensor on port 1 reporting two
    /// outputs, a water-content sensor on port 2 reporting one.
    fn readings_fixture() -> serde_json::Value {
        serde_json::json!({
            "device": {
                "device_info": {
                    "device_sn": "06-00187",
                    "device_type": 100,
                    "device_fw": 302
                },
                "timeseries": [
                    {
                        "configuration": {
                            "valid_since": 1588000000,
                            "sensors": [
                                {"port": 1, "sensor_number": 133, "sensor_name": "ATMOS 41"},
                                {"port": 2, "sensor_number": 119, "sensor_name": "TEROS 12"}
                            ],
                            "values": [
                                [
                                    1588002000, 103226, -67,
                                    [
                                        {"description": "Air Temperature", "units": " °C", "value": 22.8, "error": false},
                                        {"description": "Relative Humidity", "units": " RH", "value": 0.47, "error": false}
                                    ],
                                    [
                                        {"description": "Water Content", "units": " m³/m³", "value": 0.31, "error": false}
                                    ]
                                ],
                                [
                                    1588002300, 103227, -68,
                                    [
                                        {"description": "Air Temperature", "units": " °C", "value": 23.1, "error": false},
                                        {"description": "Relative Humidity", "units": " RH", "value": 0.46, "error": false}
                                    ],
                                    [
                                        {"description": "Water Content", "units": " m³/m³", "value": 0.30, "error": false}
                                    ]
                                ]
                            ]
                        }
                    }
                ]
            }
        })
    }

    // ── parse ────────────────────────────────────────────────────────

    #[test]
    fn readings_parse_pivots_rows_into_port_series() {
        let readings = DeviceReadings::parse(readings_fixture()).unwrap();
        assert_eq!(readings.device_info.device_sn, "06-00187");
        assert_eq!(readings.timeseries.len(), 1);

        let record = &readings.timeseries[0];
        assert_eq!(record.valid_since, 1588000000);
        assert_eq!(record.sensors.len(), 2);
        assert_eq!(record.sensors[0].sensor_name.as_deref(), Some("ATMOS 41"));

        // Two ports in the fixture, two readings each.
        assert_eq!(record.ports.len(), 2);
        assert_eq!(record.ports[0].port, 1);
        assert_eq!(record.ports[1].port, 2);
        assert_eq!(record.ports[0].readings.len(), 2);
        assert_eq!(record.ports[1].readings.len(), 2);

        let first = &record.ports[0].readings[0];
        assert_eq!(first.timestamp.timestamp(), 1588002000);
        assert_eq!(first.mrid, 103226);
        assert_eq!(first.rssi, -67);
        assert_eq!(first.measurements.len(), 2);
        assert_eq!(
            first.measurements[0].description.as_deref(),
            Some("Air Temperature")
        );
        assert_eq!(first.measurements[0].value, Some(22.8));

        let second_port = &record.ports[1].readings[0];
        assert_eq!(second_port.measurements.len(), 1);
        assert_eq!(second_port.measurements[0].value, Some(0.31));
    }

    #[test]
    fn readings_timestamps_are_non_decreasing_per_port() {
        // Rows arrive out of order here; parse must sort each series.
        let body = serde_json::json!({
            "device": {
                "device_info": {"device_sn": "06-00187"},
                "timeseries": [
                    {
                        "configuration": {
                            "valid_since": 1588000000,
                            "sensors": [{"port": 1, "sensor_number": 133}],
                            "values": [
                                [1588002600, 103228, -66, [{"value": 3.0}]],
                                [1588002000, 103226, -67, [{"value": 1.0}]],
                                [1588002300, 103227, -68, [{"value": 2.0}]]
                            ]
                        }
                    }
                ]
            }
        });
        let readings = DeviceReadings::parse(body).unwrap();
        let series = &readings.timeseries[0].ports[0];
        let stamps: Vec<i64> = series
            .readings
            .iter()
            .map(|reading| reading.timestamp.timestamp())
            .collect();
        assert_eq!(stamps, vec![1588002000, 1588002300, 1588002600]);
        assert!(
            stamps.windows(2).all(|pair| pair[0] <= pair[1]),
            "series must be ordered by non-decreasing timestamp"
        );
        // Values followed their rows through the sort.
        assert_eq!(series.readings[0].measurements[0].value, Some(1.0));
    }

    #[test]
    fn readings_parse_empty_timeseries() {
        let body = serde_json::json!({
            "device": {
                "device_info": {"device_sn": "06-00187"},
                "timeseries": []
            }
        });
        let readings = DeviceReadings::parse(body).unwrap();
        assert!(readings.timeseries.is_empty());
        assert_eq!(readings.last_mrid(), None);
    }

    #[test]
    fn readings_last_mrid_finds_the_maximum() {
        let readings = DeviceReadings::parse(readings_fixture()).unwrap();
        assert_eq!(readings.last_mrid(), Some(103227));
    }

    #[test]
    fn readings_parse_missing_envelope_is_parse_error() {
        let body = serde_json::json!({"timeseries": []});
        let result = DeviceReadings::parse(body);
        assert!(matches!(result, Err(ZentraError::Parse(_))));
    }

    #[test]
    fn readings_parse_missing_values_is_parse_error() {
        let body = serde_json::json!({
            "device": {
                "device_info": {"device_sn": "06-00187"},
                "timeseries": [
                    {"configuration": {"valid_since": 1588000000, "sensors": []}}
                ]
            }
        });
        let result = DeviceReadings::parse(body);
        assert!(
            matches!(result, Err(ZentraError::Parse(_))),
            "configuration without values must be a parse error"
        );
    }

    #[test]
    fn readings_parse_short_row_is_parse_error() {
        let body = serde_json::json!({
            "device": {
                "device_info": {"device_sn": "06-00187"},
                "timeseries": [
                    {
                        "configuration": {
                            "valid_since": 1588000000,
                            "sensors": [],
                            "values": [[1588002000, 103226]]
                        }
                    }
                ]
            }
        });
        let result = DeviceReadings::parse(body);
        assert!(matches!(result, Err(ZentraError::Parse(_))));
    }

    #[test]
    fn readings_parse_non_numeric_timestamp_is_parse_error() {
        let body = serde_json::json!({
            "device": {
                "device_info": {"device_sn": "06-00187"},
                "timeseries": [
                    {
                        "configuration": {
                            "valid_since": 1588000000,
                            "sensors": [],
                            "values": [["soon", 103226, -67, []]]
                        }
                    }
                ]
            }
        });
        let result = DeviceReadings::parse(body);
        assert!(matches!(result, Err(ZentraError::Parse(_))));
    }

    #[test]
    fn readings_row_without_port_columns_yields_no_series() {
        // A row with only the three scalar columns carries no measurements.
        let body = serde_json::json!({
            "device": {
                "device_info": {"device_sn": "06-00187"},
                "timeseries": [
                    {
                        "configuration": {
                            "valid_since": 1588000000,
                            "sensors": [],
                            "values": [[1588002000, 103226, -67]]
                        }
                    }
                ]
            }
        });
        let readings = DeviceReadings::parse(body).unwrap();
        assert!(readings.timeseries[0].ports.is_empty());
    }

    #[test]
    fn measurement_with_null_value_parses() {
        // Sensors report null for outputs they could not read.
        let json = r#"{"description": "Solar Radiation", "units": " W/m²", "value": null, "error": true}"#;
        let measurement: Measurement = serde_json::from_str(json).unwrap();
        assert_eq!(measurement.value, None);
        assert!(measurement.error);
    }

    // ── build ────────────────────────────────────────────────────────

    #[test]
    fn build_query_requires_serial_number() {
        let result = build_query("", &ReadingsQuery::default());
        assert!(
            matches!(result, Err(ZentraError::Configuration(_))),
            "empty serial number must fail before any I/O"
        );
    }

    #[test]
    fn build_query_encodes_all_filters() {
        let query = ReadingsQuery {
            start_time: Some(1588002000),
            end_time: Some(1588088400),
            start_mrid: Some(103226),
            end_mrid: Some(103999),
        };
        let pairs = build_query("06-00187", &query).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("sn", "06-00187".to_string()),
                ("start_time", "1588002000".to_string()),
                ("end_time", "1588088400".to_string()),
                ("start_mrid", "103226".to_string()),
                ("end_mrid", "103999".to_string()),
            ]
        );
    }

    #[test]
    fn build_query_with_cursor_only() {
        let query = ReadingsQuery {
            start_mrid: Some(103228),
            ..ReadingsQuery::default()
        };
        let pairs = build_query("06-00187", &query).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("sn", "06-00187".to_string()),
                ("start_mrid", "103228".to_string()),
            ]
        );
    }
}
