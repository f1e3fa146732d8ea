//! VESC Tool CSV adapter
//!
//! VESC Tool writes `;`-separated logs whose headers already use canonical
//! column names. It has no footpad, distance or state columns; those are
//! forced to fixed values so downstream analytics see a uniform row.

use crate::conversion::meters_per_second_to_kmh;
use crate::parser::helpers::{
    build_result, parse_float_value, read_csv_rows, HeaderTable, HeaderTarget, ParseWarnings,
};
use crate::types::{DataSource, ParseResult, RowKey, State, Units};

pub const VESC_TOOL_FORMAT: &str = "VESC Tool CSV";

pub const VESC_TOOL_HEADERS: HeaderTable = &[
    ("time", HeaderTarget::Field(RowKey::Time)),
    ("voltage", HeaderTarget::Field(RowKey::Voltage)),
    ("temp_mosfet", HeaderTarget::Field(RowKey::TempMosfet)),
    ("temp_motor", HeaderTarget::Field(RowKey::TempMotor)),
    ("current_motor", HeaderTarget::Field(RowKey::CurrentMotor)),
    ("current_battery", HeaderTarget::Field(RowKey::CurrentBattery)),
    ("erpm", HeaderTarget::Field(RowKey::Erpm)),
    ("duty", HeaderTarget::Field(RowKey::Duty)),
    ("ah", HeaderTarget::Field(RowKey::Ah)),
    ("ah_charged", HeaderTarget::Field(RowKey::AhCharged)),
    ("wh", HeaderTarget::Field(RowKey::Wh)),
    ("wh_charged", HeaderTarget::Field(RowKey::WhCharged)),
    ("motor_fault", HeaderTarget::Field(RowKey::MotorFault)),
    ("speed", HeaderTarget::Field(RowKey::Speed)),
    ("roll", HeaderTarget::Field(RowKey::Roll)),
    ("pitch", HeaderTarget::Field(RowKey::Pitch)),
    ("gps_latitude", HeaderTarget::Field(RowKey::GpsLatitude)),
    ("gps_longitude", HeaderTarget::Field(RowKey::GpsLongitude)),
    ("altitude", HeaderTarget::Field(RowKey::Altitude)),
    ("gps_accuracy", HeaderTarget::Field(RowKey::GpsAccuracy)),
    ("temp_mos_1", HeaderTarget::Ignore),
    ("temp_mos_2", HeaderTarget::Ignore),
    ("temp_mos_3", HeaderTarget::Ignore),
    ("d_axis_current", HeaderTarget::Ignore),
    ("q_axis_current", HeaderTarget::Ignore),
    ("d_axis_voltage", HeaderTarget::Ignore),
    ("q_axis_voltage", HeaderTarget::Ignore),
    ("tachometer", HeaderTarget::Ignore),
    ("tachometer_abs", HeaderTarget::Ignore),
    ("encoder_position", HeaderTarget::Ignore),
    ("vesc_id", HeaderTarget::Ignore),
    ("ms_today_setup", HeaderTarget::Ignore),
    ("ms_today_imu", HeaderTarget::Ignore),
    ("amp_hours_setup", HeaderTarget::Ignore),
    ("amp_hours_charged_setup", HeaderTarget::Ignore),
    ("watt_hours_setup", HeaderTarget::Ignore),
    ("watt_hours_charged_setup", HeaderTarget::Ignore),
    ("current_in_setup", HeaderTarget::Ignore),
    ("current_motor_setup", HeaderTarget::Ignore),
    ("battery_level", HeaderTarget::Ignore),
    ("battery_wh_tot", HeaderTarget::Ignore),
    ("tacho_meters", HeaderTarget::Ignore),
    ("tacho_abs_meters", HeaderTarget::Ignore),
    ("num_vescs", HeaderTarget::Ignore),
    ("yaw", HeaderTarget::Ignore),
    ("accX", HeaderTarget::Ignore),
    ("accY", HeaderTarget::Ignore),
    ("accZ", HeaderTarget::Ignore),
    ("gyroX", HeaderTarget::Ignore),
    ("gyroY", HeaderTarget::Ignore),
    ("gyroZ", HeaderTarget::Ignore),
    ("gnss_posTime", HeaderTarget::Ignore),
    ("gnss_gVel", HeaderTarget::Ignore),
    ("gnss_vVel", HeaderTarget::Ignore),
    ("gnss_vAcc", HeaderTarget::Ignore),
];

/// Parse a VESC Tool CSV log.
///
/// `time` is logged as milliseconds since midnight; rows are rebased to
/// seconds since the first sample.
pub fn parse_vesc_tool_csv(input: &str) -> ParseResult {
    let mut warnings = ParseWarnings::new();

    let table = read_csv_rows(
        input,
        b';',
        VESC_TOOL_HEADERS,
        VESC_TOOL_FORMAT,
        &mut warnings,
        |row, target, cell, warnings| {
            if let HeaderTarget::Field(key) = target {
                let value = parse_float_value(cell, warnings);
                let value = match key {
                    RowKey::Duty => value * 100.0,
                    RowKey::Speed => meters_per_second_to_kmh(value),
                    _ => value,
                };
                row.set(key, value);
            }
        },
    );

    let mut rows = match table {
        Ok(table) => table.rows,
        Err(err) => return ParseResult::failed(DataSource::VescTool, err),
    };

    let start_ms = rows.first().map(|row| row.time).unwrap_or(0.0);
    for row in &mut rows {
        row.time = (row.time - start_ms) / 1000.0;
        row.adc1 = 0.0;
        row.adc2 = 0.0;
        row.distance = 0.0;
        row.state = State::Unknown.as_str().to_string();
        row.state_raw = 0.0;
        row.true_pitch = row.pitch;
    }

    log::debug!("VESC Tool: {} rows, {} warnings", rows.len(), warnings.len());

    build_result(
        DataSource::VescTool,
        VESC_TOOL_FORMAT,
        rows,
        Units::Metric,
        warnings,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::types::WarningKind;

    const HEADER: &str = "time;voltage;temp_mosfet;temp_mos_1;temp_motor;current_motor;current_battery;erpm;duty;ah;ah_charged;wh;wh_charged;tachometer;motor_fault;speed;roll;pitch;yaw;gps_latitude;gps_longitude;altitude;gps_accuracy;";

    fn log(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_parse_vesc_tool_log() {
        let input = log(&[
            "60848530;81.5;18.8;18.9;26.5;0;0;0;0.001;0.6502;0.0577;51.836;4.7486;195978;0;0;0;0.295746;0;0.0;0.0;0.0;0.0;",
            "60849530;81.4;18.9;18.9;26.6;12;3;1500;0.25;0.66;0.0577;52.1;4.7486;196100;0;5;1.2;0.5;0;51.5;-0.12;40.0;3.0;",
        ]);
        let result = parse_vesc_tool_csv(&input);

        assert_eq!(result.source, DataSource::VescTool);
        assert_eq!(result.units, Units::Metric);
        assert!(result.error.is_none(), "{:?}", result.warnings);
        assert_eq!(result.rows.len(), 2);

        let first = &result.rows[0];
        assert_eq!(first.time, 0.0);
        assert_eq!(first.voltage, 81.5);
        assert!((first.duty - 0.1).abs() < 1e-9);

        let second = &result.rows[1];
        assert_eq!(second.index, 1);
        assert_eq!(second.time, 1.0);
        assert_eq!(second.duty, 25.0);
        assert_eq!(second.speed, 18.0);
        assert_eq!(second.gps_latitude, 51.5);
        assert!(second.extra.is_empty());
    }

    #[test]
    fn test_forced_columns() {
        let input = log(&["1000;80;20;20;25;0;0;0;0;0;0;0;0;0;0;0;0;2.5;0;0;0;0;0;"]);
        let row = &parse_vesc_tool_csv(&input).rows[0];

        assert_eq!(row.adc1, 0.0);
        assert_eq!(row.adc2, 0.0);
        assert_eq!(row.distance, 0.0);
        assert_eq!(row.state, "UNKNOWN");
        assert_eq!(row.state_raw, 0.0);
        assert_eq!(row.true_pitch, 2.5);
        assert!(row.setpoint.is_nan());
    }

    #[test]
    fn test_invalid_cell_is_a_defect() {
        let input = log(&["1000;abc;20;20;25;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;"]);
        let result = parse_vesc_tool_csv(&input);

        assert_eq!(result.rows[0].voltage, 0.0);
        assert_eq!(result.warnings[0].kind, WarningKind::InvalidNumber);
        assert!(matches!(
            result.error,
            Some(ParseError::Rows { format: VESC_TOOL_FORMAT, .. })
        ));
    }

    #[test]
    fn test_empty_log() {
        let result = parse_vesc_tool_csv(HEADER);
        assert!(result.rows.is_empty());
        assert!(result.error.is_none());
    }
}
