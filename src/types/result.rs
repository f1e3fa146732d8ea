use crate::error::ParseError;
use crate::types::CanonicalRow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which adapter produced a row sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    None,
    FloatControl,
    Floaty,
    VescTool,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataSource::None => "none",
            DataSource::FloatControl => "Float Control",
            DataSource::Floaty => "Floaty",
            DataSource::VescTool => "VESC Tool",
        };
        f.write_str(name)
    }
}

/// Unit system of a row sequence's speed and distance columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn speed_label(self) -> &'static str {
        match self {
            Units::Metric => "km/h",
            Units::Imperial => "mph",
        }
    }

    pub fn distance_label(self) -> &'static str {
        match self {
            Units::Metric => "km",
            Units::Imperial => "mi",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Metric => f.write_str("metric"),
            Units::Imperial => f.write_str("imperial"),
        }
    }
}

/// Category of a recovered parse problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnknownHeader,
    InvalidNumber,
    UnknownState,
    MalformedRecord,
}

impl WarningKind {
    /// Row-level defects end up in the result's error; notices do not
    pub fn is_defect(self) -> bool {
        !matches!(self, WarningKind::UnknownState)
    }
}

/// A problem recovered locally while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of ingesting one file.
///
/// `rows` and `error` are independent: a partially broken file yields both
/// rows and an error, an unrecognised one yields only the error.
#[derive(Debug)]
pub struct ParseResult {
    pub source: DataSource,
    pub rows: Vec<CanonicalRow>,
    pub units: Units,
    pub warnings: Vec<ParseWarning>,
    pub error: Option<ParseError>,
}

impl ParseResult {
    /// A fatal result: no rows, metric units, the given error
    pub fn failed(source: DataSource, error: ParseError) -> Self {
        Self {
            source,
            rows: Vec::new(),
            units: Units::Metric,
            warnings: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ride duration in seconds, from first to last sample
    pub fn duration_seconds(&self) -> f64 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Check if any sample carries a usable GPS fix
    pub fn has_gps_data(&self) -> bool {
        self.rows
            .iter()
            .any(|row| row.gps_accuracy > 0.0 && row.gps_latitude.is_finite())
    }

    /// Warnings that were counted as row-level defects
    pub fn defects(&self) -> impl Iterator<Item = &ParseWarning> {
        self.warnings.iter().filter(|w| w.kind.is_defect())
    }
}
