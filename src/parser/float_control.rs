//! Float Control CSV adapter
//!
//! Float Control exports one comma-separated file per ride with a single
//! header line. Headers carry their unit (`Speed(km/h)`, `Distance(mi)`), which
//! decides the unit system of the whole sequence.

use crate::parser::helpers::{
    build_result, parse_float_value, read_csv_rows, HeaderTable, HeaderTarget, ParseWarnings,
};
use crate::types::{DataSource, ParseResult, RowKey, State, Units, WarningKind};

pub const FLOAT_CONTROL_FORMAT: &str = "Float Control CSV";

/// Raw Float Control header -> canonical column
pub const FLOAT_CONTROL_HEADERS: HeaderTable = &[
    ("Time(s)", HeaderTarget::Field(RowKey::Time)),
    ("State", HeaderTarget::State),
    ("Distance(km)", HeaderTarget::Field(RowKey::Distance)),
    ("Distance(mi)", HeaderTarget::Field(RowKey::Distance)),
    ("Speed(km/h)", HeaderTarget::Field(RowKey::Speed)),
    ("Speed(mph)", HeaderTarget::Field(RowKey::Speed)),
    ("Duty%", HeaderTarget::Field(RowKey::Duty)),
    ("Voltage", HeaderTarget::Field(RowKey::Voltage)),
    ("I-Battery", HeaderTarget::Field(RowKey::CurrentBattery)),
    ("I-Motor", HeaderTarget::Field(RowKey::CurrentMotor)),
    ("I-FldWeak", HeaderTarget::Field(RowKey::CurrentFieldWeakening)),
    ("Requested Amps", HeaderTarget::Field(RowKey::RequestedAmps)),
    ("Pitch", HeaderTarget::Field(RowKey::Pitch)),
    ("True Pitch", HeaderTarget::Field(RowKey::TruePitch)),
    ("Roll", HeaderTarget::Field(RowKey::Roll)),
    ("Setpoint", HeaderTarget::Field(RowKey::Setpoint)),
    ("SP-ATR", HeaderTarget::Field(RowKey::SetpointAtr)),
    ("SP-Carve", HeaderTarget::Field(RowKey::SetpointCarve)),
    ("SP-TrqTlt", HeaderTarget::Field(RowKey::SetpointTorqueTilt)),
    ("SP-BrkTlt", HeaderTarget::Field(RowKey::SetpointBreakTilt)),
    ("SP-Remote", HeaderTarget::Field(RowKey::SetpointRemote)),
    ("T-Mosfet", HeaderTarget::Field(RowKey::TempMosfet)),
    ("T-Mot", HeaderTarget::Field(RowKey::TempMotor)),
    ("T-Batt", HeaderTarget::Field(RowKey::TempBattery)),
    ("ADC1", HeaderTarget::Field(RowKey::Adc1)),
    ("ADC2", HeaderTarget::Field(RowKey::Adc2)),
    ("Motor-Fault", HeaderTarget::Field(RowKey::MotorFault)),
    ("Ah", HeaderTarget::Field(RowKey::Ah)),
    ("Ah Charged", HeaderTarget::Field(RowKey::AhCharged)),
    ("Wh", HeaderTarget::Field(RowKey::Wh)),
    ("Wh Charged", HeaderTarget::Field(RowKey::WhCharged)),
    ("ERPM", HeaderTarget::Field(RowKey::Erpm)),
    ("I-Booster", HeaderTarget::Field(RowKey::CurrentBooster)),
    ("Altitude(m)", HeaderTarget::Field(RowKey::Altitude)),
    ("State(num)", HeaderTarget::Field(RowKey::StateRaw)),
    ("GPS-Lat", HeaderTarget::Field(RowKey::GpsLatitude)),
    ("GPS-Long", HeaderTarget::Field(RowKey::GpsLongitude)),
    ("GPS-Accuracy", HeaderTarget::Field(RowKey::GpsAccuracy)),
    ("BMS-Fault", HeaderTarget::Field(RowKey::BmsFault)),
    ("BMS-Temp", HeaderTarget::Field(RowKey::BmsTemp)),
    ("BMS-Temp-Batt", HeaderTarget::Field(RowKey::BmsTempBattery)),
];

const METRIC_HEADERS: [&str; 2] = ["Speed(km/h)", "Distance(km)"];

/// Metric as soon as a km-suffixed speed or distance column is present
pub fn detect_units<S: AsRef<str>>(headers: &[S]) -> Units {
    let metric = headers
        .iter()
        .any(|header| METRIC_HEADERS.contains(&header.as_ref().trim()));
    if metric {
        Units::Metric
    } else {
        Units::Imperial
    }
}

/// Lower-case a firmware state and match it against the device set.
///
/// Unrecognised values are kept lower-cased and noted once per distinct raw value.
pub fn decode_state(value: &str, warnings: &mut ParseWarnings) -> String {
    let lower = value.trim().to_lowercase();
    if let Some(state) = State::from_device_token(&lower) {
        return state.as_str().to_string();
    }

    warnings.push_once(
        WarningKind::UnknownState,
        value,
        format!("Unknown state: '{value}'"),
    );
    lower
}

/// Parse a Float Control CSV export.
///
/// Never fails outright: an unreadable header line gives an empty result with
/// the error set, row-level problems are recorded and the row kept.
pub fn parse_float_control_csv(input: &str) -> ParseResult {
    let mut warnings = ParseWarnings::new();

    let table = read_csv_rows(
        input,
        b',',
        FLOAT_CONTROL_HEADERS,
        FLOAT_CONTROL_FORMAT,
        &mut warnings,
        |row, target, cell, warnings| match target {
            HeaderTarget::Field(RowKey::Duty) => {
                row.duty = parse_float_value(&cell.replace('%', ""), warnings);
            }
            HeaderTarget::Field(key) => row.set(key, parse_float_value(cell, warnings)),
            HeaderTarget::State => row.state = decode_state(cell, warnings),
            HeaderTarget::Ignore => {}
        },
    );

    let table = match table {
        Ok(table) => table,
        Err(err) => return ParseResult::failed(DataSource::FloatControl, err),
    };

    let units = detect_units(&table.headers);
    log::debug!(
        "Float Control: {} rows, {} units, {} warnings",
        table.rows.len(),
        units,
        warnings.len()
    );

    build_result(
        DataSource::FloatControl,
        FLOAT_CONTROL_FORMAT,
        table.rows,
        units,
        warnings,
    )
}
