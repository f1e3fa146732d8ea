use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical numeric columns shared by every log source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKey {
    Adc1,
    Adc2,
    Ah,
    AhCharged,
    Altitude,
    BmsFault,
    BmsTemp,
    BmsTempBattery,
    CurrentBattery,
    CurrentBooster,
    CurrentFieldWeakening,
    CurrentMotor,
    Distance,
    Duty,
    Erpm,
    GpsAccuracy,
    GpsLatitude,
    GpsLongitude,
    MotorFault,
    Pitch,
    RequestedAmps,
    Roll,
    Setpoint,
    SetpointAtr,
    SetpointBreakTilt,
    SetpointCarve,
    SetpointRemote,
    SetpointTorqueTilt,
    Speed,
    StateRaw,
    TempBattery,
    TempMosfet,
    TempMotor,
    Time,
    TruePitch,
    Voltage,
    Wh,
    WhCharged,
}

impl RowKey {
    /// Every key, in canonical column order
    pub const ALL: [RowKey; 38] = [
        RowKey::Time,
        RowKey::Speed,
        RowKey::Distance,
        RowKey::Duty,
        RowKey::Erpm,
        RowKey::Voltage,
        RowKey::CurrentMotor,
        RowKey::CurrentBattery,
        RowKey::CurrentBooster,
        RowKey::CurrentFieldWeakening,
        RowKey::RequestedAmps,
        RowKey::Ah,
        RowKey::AhCharged,
        RowKey::Wh,
        RowKey::WhCharged,
        RowKey::TempMotor,
        RowKey::TempMosfet,
        RowKey::TempBattery,
        RowKey::Pitch,
        RowKey::TruePitch,
        RowKey::Roll,
        RowKey::Setpoint,
        RowKey::SetpointAtr,
        RowKey::SetpointCarve,
        RowKey::SetpointTorqueTilt,
        RowKey::SetpointBreakTilt,
        RowKey::SetpointRemote,
        RowKey::Adc1,
        RowKey::Adc2,
        RowKey::MotorFault,
        RowKey::StateRaw,
        RowKey::GpsLatitude,
        RowKey::GpsLongitude,
        RowKey::GpsAccuracy,
        RowKey::Altitude,
        RowKey::BmsFault,
        RowKey::BmsTemp,
        RowKey::BmsTempBattery,
    ];

    /// Canonical snake_case column name
    pub fn name(self) -> &'static str {
        match self {
            RowKey::Adc1 => "adc1",
            RowKey::Adc2 => "adc2",
            RowKey::Ah => "ah",
            RowKey::AhCharged => "ah_charged",
            RowKey::Altitude => "altitude",
            RowKey::BmsFault => "bms_fault",
            RowKey::BmsTemp => "bms_temp",
            RowKey::BmsTempBattery => "bms_temp_battery",
            RowKey::CurrentBattery => "current_battery",
            RowKey::CurrentBooster => "current_booster",
            RowKey::CurrentFieldWeakening => "current_field_weakening",
            RowKey::CurrentMotor => "current_motor",
            RowKey::Distance => "distance",
            RowKey::Duty => "duty",
            RowKey::Erpm => "erpm",
            RowKey::GpsAccuracy => "gps_accuracy",
            RowKey::GpsLatitude => "gps_latitude",
            RowKey::GpsLongitude => "gps_longitude",
            RowKey::MotorFault => "motor_fault",
            RowKey::Pitch => "pitch",
            RowKey::RequestedAmps => "requested_amps",
            RowKey::Roll => "roll",
            RowKey::Setpoint => "setpoint",
            RowKey::SetpointAtr => "setpoint_atr",
            RowKey::SetpointBreakTilt => "setpoint_break_tilt",
            RowKey::SetpointCarve => "setpoint_carve",
            RowKey::SetpointRemote => "setpoint_remote",
            RowKey::SetpointTorqueTilt => "setpoint_torque_tilt",
            RowKey::Speed => "speed",
            RowKey::StateRaw => "state_raw",
            RowKey::TempBattery => "temp_battery",
            RowKey::TempMosfet => "temp_mosfet",
            RowKey::TempMotor => "temp_motor",
            RowKey::Time => "time",
            RowKey::TruePitch => "true_pitch",
            RowKey::Voltage => "voltage",
            RowKey::Wh => "wh",
            RowKey::WhCharged => "wh_charged",
        }
    }

    /// Look a key up by its canonical name
    pub fn from_name(name: &str) -> Option<RowKey> {
        RowKey::ALL.iter().copied().find(|key| key.name() == name)
    }

    /// Columns only present on sources with the matching sensor
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            RowKey::TempBattery | RowKey::BmsFault | RowKey::BmsTemp | RowKey::BmsTempBattery
        )
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical state tokens.
///
/// A merge of the states reported by the board firmware, the footpad and
/// charge labels generated by the point-of-interest extractor, and the
/// placeholders used when a source cannot say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Riding,
    Startup,
    Quickstop,
    StopHalf,
    StopFull,
    StopAngle,
    Wheelslip,
    OneFootpadAtSpeed,
    NoFootpadsAtSpeed,
    ChargePoint,
    /// Floaty reported a state code with no known meaning
    UnmappedCode,
    /// The source does not log a state at all
    Unknown,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Riding => "riding",
            State::Startup => "startup",
            State::Quickstop => "quickstop",
            State::StopHalf => "stop half",
            State::StopFull => "stop full",
            State::StopAngle => "stop angle",
            State::Wheelslip => "wheelslip",
            State::OneFootpadAtSpeed => "one footpad at speed",
            State::NoFootpadsAtSpeed => "no footpads at speed",
            State::ChargePoint => "charge point",
            State::UnmappedCode => "??",
            State::Unknown => "UNKNOWN",
        }
    }

    /// Match a lower-cased firmware state against the closed device set
    pub fn from_device_token(lower: &str) -> Option<State> {
        match lower {
            "riding" => Some(State::Riding),
            "startup" => Some(State::Startup),
            "stop half" => Some(State::StopHalf),
            "stop full" => Some(State::StopFull),
            "stop angle" => Some(State::StopAngle),
            "wheelslip" => Some(State::Wheelslip),
            "quickstop" => Some(State::Quickstop),
            _ => None,
        }
    }

    /// Floaty's numeric state codes
    pub fn from_floaty_code(code: i64) -> Option<State> {
        match code {
            1 => Some(State::Riding),
            3 => Some(State::Wheelslip),
            7 => Some(State::StopAngle),
            8 => Some(State::StopHalf),
            9 => Some(State::StopFull),
            11 => Some(State::Startup),
            13 => Some(State::Quickstop),
            _ => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized ride sample.
///
/// Fields a source cannot provide hold `NaN`; the battery temperature and BMS
/// columns are `None` unless the source logs that sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub index: usize,

    pub time: f64,
    pub speed: f64,
    pub distance: f64,
    pub duty: f64,
    pub erpm: f64,

    pub voltage: f64,
    pub current_motor: f64,
    pub current_battery: f64,
    pub current_booster: f64,
    pub current_field_weakening: f64,
    pub requested_amps: f64,
    pub ah: f64,
    pub ah_charged: f64,
    pub wh: f64,
    pub wh_charged: f64,

    pub temp_motor: f64,
    pub temp_mosfet: f64,
    pub temp_battery: Option<f64>,

    pub pitch: f64,
    pub true_pitch: f64,
    pub roll: f64,
    pub setpoint: f64,
    pub setpoint_atr: f64,
    pub setpoint_carve: f64,
    pub setpoint_torque_tilt: f64,
    pub setpoint_break_tilt: f64,
    pub setpoint_remote: f64,

    pub adc1: f64,
    pub adc2: f64,

    pub motor_fault: f64,
    pub state_raw: f64,
    pub state: String,

    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub gps_accuracy: f64,
    pub altitude: f64,

    pub bms_fault: Option<f64>,
    pub bms_temp: Option<f64>,
    pub bms_temp_battery: Option<f64>,

    /// Raw text of columns without a canonical mapping, keyed by header
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl CanonicalRow {
    /// A row where every field is marked unsupported
    pub fn new(index: usize) -> Self {
        Self {
            index,
            time: f64::NAN,
            speed: f64::NAN,
            distance: f64::NAN,
            duty: f64::NAN,
            erpm: f64::NAN,
            voltage: f64::NAN,
            current_motor: f64::NAN,
            current_battery: f64::NAN,
            current_booster: f64::NAN,
            current_field_weakening: f64::NAN,
            requested_amps: f64::NAN,
            ah: f64::NAN,
            ah_charged: f64::NAN,
            wh: f64::NAN,
            wh_charged: f64::NAN,
            temp_motor: f64::NAN,
            temp_mosfet: f64::NAN,
            temp_battery: None,
            pitch: f64::NAN,
            true_pitch: f64::NAN,
            roll: f64::NAN,
            setpoint: f64::NAN,
            setpoint_atr: f64::NAN,
            setpoint_carve: f64::NAN,
            setpoint_torque_tilt: f64::NAN,
            setpoint_break_tilt: f64::NAN,
            setpoint_remote: f64::NAN,
            adc1: f64::NAN,
            adc2: f64::NAN,
            motor_fault: f64::NAN,
            state_raw: f64::NAN,
            state: State::Unknown.as_str().to_string(),
            gps_latitude: f64::NAN,
            gps_longitude: f64::NAN,
            gps_accuracy: f64::NAN,
            altitude: f64::NAN,
            bms_fault: None,
            bms_temp: None,
            bms_temp_battery: None,
            extra: BTreeMap::new(),
        }
    }

    /// Read a column; `None` only for an absent optional column
    pub fn get(&self, key: RowKey) -> Option<f64> {
        let value = match key {
            RowKey::Adc1 => self.adc1,
            RowKey::Adc2 => self.adc2,
            RowKey::Ah => self.ah,
            RowKey::AhCharged => self.ah_charged,
            RowKey::Altitude => self.altitude,
            RowKey::BmsFault => return self.bms_fault,
            RowKey::BmsTemp => return self.bms_temp,
            RowKey::BmsTempBattery => return self.bms_temp_battery,
            RowKey::CurrentBattery => self.current_battery,
            RowKey::CurrentBooster => self.current_booster,
            RowKey::CurrentFieldWeakening => self.current_field_weakening,
            RowKey::CurrentMotor => self.current_motor,
            RowKey::Distance => self.distance,
            RowKey::Duty => self.duty,
            RowKey::Erpm => self.erpm,
            RowKey::GpsAccuracy => self.gps_accuracy,
            RowKey::GpsLatitude => self.gps_latitude,
            RowKey::GpsLongitude => self.gps_longitude,
            RowKey::MotorFault => self.motor_fault,
            RowKey::Pitch => self.pitch,
            RowKey::RequestedAmps => self.requested_amps,
            RowKey::Roll => self.roll,
            RowKey::Setpoint => self.setpoint,
            RowKey::SetpointAtr => self.setpoint_atr,
            RowKey::SetpointBreakTilt => self.setpoint_break_tilt,
            RowKey::SetpointCarve => self.setpoint_carve,
            RowKey::SetpointRemote => self.setpoint_remote,
            RowKey::SetpointTorqueTilt => self.setpoint_torque_tilt,
            RowKey::Speed => self.speed,
            RowKey::StateRaw => self.state_raw,
            RowKey::TempBattery => return self.temp_battery,
            RowKey::TempMosfet => self.temp_mosfet,
            RowKey::TempMotor => self.temp_motor,
            RowKey::Time => self.time,
            RowKey::TruePitch => self.true_pitch,
            RowKey::Voltage => self.voltage,
            RowKey::Wh => self.wh,
            RowKey::WhCharged => self.wh_charged,
        };
        Some(value)
    }

    /// Write a column; optional columns become present
    pub fn set(&mut self, key: RowKey, value: f64) {
        let slot = match key {
            RowKey::Adc1 => &mut self.adc1,
            RowKey::Adc2 => &mut self.adc2,
            RowKey::Ah => &mut self.ah,
            RowKey::AhCharged => &mut self.ah_charged,
            RowKey::Altitude => &mut self.altitude,
            RowKey::BmsFault => {
                self.bms_fault = Some(value);
                return;
            }
            RowKey::BmsTemp => {
                self.bms_temp = Some(value);
                return;
            }
            RowKey::BmsTempBattery => {
                self.bms_temp_battery = Some(value);
                return;
            }
            RowKey::CurrentBattery => &mut self.current_battery,
            RowKey::CurrentBooster => &mut self.current_booster,
            RowKey::CurrentFieldWeakening => &mut self.current_field_weakening,
            RowKey::CurrentMotor => &mut self.current_motor,
            RowKey::Distance => &mut self.distance,
            RowKey::Duty => &mut self.duty,
            RowKey::Erpm => &mut self.erpm,
            RowKey::GpsAccuracy => &mut self.gps_accuracy,
            RowKey::GpsLatitude => &mut self.gps_latitude,
            RowKey::GpsLongitude => &mut self.gps_longitude,
            RowKey::MotorFault => &mut self.motor_fault,
            RowKey::Pitch => &mut self.pitch,
            RowKey::RequestedAmps => &mut self.requested_amps,
            RowKey::Roll => &mut self.roll,
            RowKey::Setpoint => &mut self.setpoint,
            RowKey::SetpointAtr => &mut self.setpoint_atr,
            RowKey::SetpointBreakTilt => &mut self.setpoint_break_tilt,
            RowKey::SetpointCarve => &mut self.setpoint_carve,
            RowKey::SetpointRemote => &mut self.setpoint_remote,
            RowKey::SetpointTorqueTilt => &mut self.setpoint_torque_tilt,
            RowKey::Speed => &mut self.speed,
            RowKey::StateRaw => &mut self.state_raw,
            RowKey::TempBattery => {
                self.temp_battery = Some(value);
                return;
            }
            RowKey::TempMosfet => &mut self.temp_mosfet,
            RowKey::TempMotor => &mut self.temp_motor,
            RowKey::Time => &mut self.time,
            RowKey::TruePitch => &mut self.true_pitch,
            RowKey::Voltage => &mut self.voltage,
            RowKey::Wh => &mut self.wh,
            RowKey::WhCharged => &mut self.wh_charged,
        };
        *slot = value;
    }

    /// Whether the row reports the `riding` state
    pub fn is_riding(&self) -> bool {
        self.state == State::Riding.as_str()
    }
}

impl Default for CanonicalRow {
    fn default() -> Self {
        Self::new(0)
    }
}
