//! Floaty JSON adapter
//!
//! Floaty records one JSON document per ride: controller samples in `logs`,
//! phone GPS fixes in `locations`, both stamped in epoch milliseconds.
//! Samples Floaty failed to read come through as `null` (or `0` for the
//! temperatures) and are backfilled from the nearest earlier sample.

use crate::error::ParseError;
use crate::parser::helpers::{build_result, ParseWarnings};
use crate::types::{CanonicalRow, DataSource, ParseResult, State, Units, WarningKind};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const FLOATY_FORMAT: &str = "Floaty JSON";

/// Top level of a Floaty export
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatyDocument {
    pub id: String,
    pub name: Option<String>,
    pub board_id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub stop_reason: f64,
    pub polyline: String,
    pub distance: f64,
    pub locations: Vec<FloatyLocation>,
    pub logs: Vec<FloatyLog>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FloatyLocation {
    pub timestamp: f64,
    pub altitude: f64,
    pub latitude: f64,
    pub speed: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

/// One controller sample; `None` where Floaty could not read the value
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatyLog {
    pub timestamp: f64,
    pub adc1: Option<f64>,
    pub adc2: Option<f64>,
    pub amp_hours: Option<f64>,
    pub battery_current: Option<f64>,
    pub battery_percent: Option<f64>,
    pub battery_volts: Option<f64>,
    pub controller_temp: Option<f64>,
    pub duty_cycle: Option<f64>,
    pub fault_code: Option<f64>,
    pub input_tilt: Option<f64>,
    pub life_distance: Option<f64>,
    pub motor_current: Option<f64>,
    pub motor_temp: Option<f64>,
    pub pitch_angle: Option<f64>,
    pub remaining_distance: Option<f64>,
    pub roll_angle: Option<f64>,
    pub setpoint_adjustment_type: Option<f64>,
    pub speed: Option<f64>,
    pub state: Option<f64>,
    pub switch_state: Option<f64>,
    pub throttle: Option<f64>,
    pub trip_distance: Option<f64>,
    pub true_pitch_angle: Option<f64>,
    pub watt_hours: Option<f64>,
    /// Keys this adapter does not know, kept under their raw names
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// Backfilled sample fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backfilled {
    Adc1,
    Adc2,
    AmpHours,
    BatteryCurrent,
    BatteryVolts,
    ControllerTemp,
    DutyCycle,
    FaultCode,
    MotorCurrent,
    MotorTemp,
    PitchAngle,
    RollAngle,
    Speed,
    TripDistance,
    TruePitchAngle,
    WattHours,
}

const BACKFILLED_COUNT: usize = Backfilled::WattHours as usize + 1;

/// Last present value per field.
///
/// Carrying it forward gives the same answer as scanning backward from every
/// missing sample, in a single pass.
#[derive(Debug, Default)]
struct LastSeen {
    values: [Option<f64>; BACKFILLED_COUNT],
    filled: usize,
}

impl LastSeen {
    fn resolve(&mut self, field: Backfilled, value: Option<f64>) -> f64 {
        match value {
            Some(v) => {
                self.values[field as usize] = Some(v);
                v
            }
            None => {
                self.filled += 1;
                self.values[field as usize].unwrap_or(0.0)
            }
        }
    }

    /// Floaty writes 0 for a temperature it failed to read
    fn resolve_temperature(&mut self, field: Backfilled, value: Option<f64>) -> f64 {
        self.resolve(field, value.filter(|v| *v != 0.0))
    }
}

/// Decode a Floaty state code, `??` for null or unmapped codes
pub fn floaty_state(code: Option<f64>) -> &'static str {
    code.filter(|c| c.fract() == 0.0)
        .and_then(|c| State::from_floaty_code(c as i64))
        .unwrap_or(State::UnmappedCode)
        .as_str()
}

/// Pairs each sample with the latest fix at or before it.
///
/// Samples are chronological, so the cursor only moves forward. Samples
/// earlier than the first fix get the first fix.
struct LocationCursor<'a> {
    locations: &'a [FloatyLocation],
    position: usize,
}

impl<'a> LocationCursor<'a> {
    fn new(locations: &'a [FloatyLocation]) -> Self {
        Self {
            locations,
            position: 0,
        }
    }

    fn at(&mut self, timestamp: f64) -> Option<&'a FloatyLocation> {
        while let Some(next) = self.locations.get(self.position + 1) {
            if next.timestamp > timestamp {
                break;
            }
            self.position += 1;
        }
        self.locations.get(self.position)
    }
}

fn unmapped_fields(log: &FloatyLog) -> [(&'static str, Option<f64>); 7] {
    [
        ("batteryPercent", log.battery_percent),
        ("inputTilt", log.input_tilt),
        ("lifeDistance", log.life_distance),
        ("remainingDistance", log.remaining_distance),
        ("setpointAdjustmentType", log.setpoint_adjustment_type),
        ("switchState", log.switch_state),
        ("throttle", log.throttle),
    ]
}

fn extra_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Convert a validated document into canonical rows.
///
/// Unknown log keys are recorded once each and carried into `extra`.
pub fn rows_from_floaty(document: &FloatyDocument, warnings: &mut ParseWarnings) -> Vec<CanonicalRow> {
    let mut last_seen = LastSeen::default();
    let mut cursor = LocationCursor::new(&document.locations);
    let mut rows = Vec::with_capacity(document.logs.len());

    for (index, log) in document.logs.iter().enumerate() {
        let mut row = CanonicalRow::new(index);
        row.time = (log.timestamp - document.start_time) / 1000.0;

        row.adc1 = last_seen.resolve(Backfilled::Adc1, log.adc1);
        row.adc2 = last_seen.resolve(Backfilled::Adc2, log.adc2);
        row.ah = last_seen.resolve(Backfilled::AmpHours, log.amp_hours);
        row.current_battery = last_seen.resolve(Backfilled::BatteryCurrent, log.battery_current);
        row.voltage = last_seen.resolve(Backfilled::BatteryVolts, log.battery_volts);
        row.temp_mosfet =
            last_seen.resolve_temperature(Backfilled::ControllerTemp, log.controller_temp);
        row.duty = last_seen.resolve(Backfilled::DutyCycle, log.duty_cycle);
        row.motor_fault = last_seen.resolve(Backfilled::FaultCode, log.fault_code);
        row.current_motor = last_seen.resolve(Backfilled::MotorCurrent, log.motor_current);
        row.temp_motor = last_seen.resolve_temperature(Backfilled::MotorTemp, log.motor_temp);
        row.pitch = last_seen.resolve(Backfilled::PitchAngle, log.pitch_angle);
        row.roll = last_seen.resolve(Backfilled::RollAngle, log.roll_angle);
        row.speed = last_seen.resolve(Backfilled::Speed, log.speed);
        row.distance = last_seen.resolve(Backfilled::TripDistance, log.trip_distance);
        row.true_pitch = last_seen.resolve(Backfilled::TruePitchAngle, log.true_pitch_angle);
        row.wh = last_seen.resolve(Backfilled::WattHours, log.watt_hours);

        row.state_raw = log.state.unwrap_or(f64::NAN);
        row.state = floaty_state(log.state).to_string();

        if let Some(location) = cursor.at(log.timestamp) {
            row.gps_latitude = location.latitude;
            row.gps_longitude = location.longitude;
            row.gps_accuracy = location.accuracy;
            row.altitude = location.altitude;
        }

        for (name, value) in unmapped_fields(log) {
            if let Some(value) = value {
                row.extra.insert(name.to_string(), value.to_string());
            }
        }
        for (name, value) in &log.other {
            warnings.push_once(
                WarningKind::UnknownHeader,
                name,
                format!("Unknown header: '{name}'"),
            );
            if !value.is_null() {
                row.extra.insert(name.clone(), extra_value(value));
            }
        }

        rows.push(row);
    }

    log::debug!(
        "Floaty: backfilled {} missing values over {} samples",
        last_seen.filled,
        rows.len()
    );
    rows
}

/// Parse a Floaty JSON export.
///
/// A document that does not match the schema gives no rows and a
/// [`ParseError::Schema`] carrying the decoder error.
pub fn parse_floaty_json(input: &str) -> ParseResult {
    let document: FloatyDocument = match serde_json::from_str(input) {
        Ok(document) => document,
        Err(err) => return ParseResult::failed(DataSource::Floaty, ParseError::Schema(err)),
    };

    log::debug!(
        "Floaty ride {} ({}) on board {}: {} logs, {} locations, {:.0} ms, stop reason {}, distance {}, polyline {} chars",
        document.id,
        document.name.as_deref().unwrap_or("unnamed"),
        document.board_id,
        document.logs.len(),
        document.locations.len(),
        document.end_time - document.start_time,
        document.stop_reason,
        document.distance,
        document.polyline.len()
    );

    let mut warnings = ParseWarnings::new();
    let rows = rows_from_floaty(&document, &mut warnings);
    build_result(
        DataSource::Floaty,
        FLOATY_FORMAT,
        rows,
        Units::Metric,
        warnings,
    )
}
