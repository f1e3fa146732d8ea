//! Analysis configuration
//!
//! Thresholds and user preferences that drive gap detection, segmentation
//! and point-of-interest extraction. Everything has a default, so a JSON
//! config file only needs the keys it wants to change.

use crate::error::AnalysisError;
use crate::types::{State, Units};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Pause between samples that splits a ride
pub const RIDE_GAP_THRESHOLD_SECONDS: f64 = 60.0;
/// Pause long enough to have charged in between
pub const CHARGE_THRESHOLD_SECONDS: f64 = 600.0;
/// Voltage rise that marks a charge when no battery specs are given
pub const DEFAULT_CHARGE_THRESHOLD_VOLTS: f64 = 2.5;

/// Battery pack description supplied by the rider
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatterySpecs {
    pub cell_count: Option<u32>,
    pub cell_min_volt: Option<f64>,
    pub cell_max_volt: Option<f64>,
}

impl BatterySpecs {
    pub fn new(cell_count: u32, cell_min_volt: f64, cell_max_volt: f64) -> Self {
        Self {
            cell_count: Some(cell_count),
            cell_min_volt: Some(cell_min_volt),
            cell_max_volt: Some(cell_max_volt),
        }
    }

    /// All three values present and non-zero
    pub fn is_complete(&self) -> bool {
        matches!(
            (self.cell_count, self.cell_min_volt, self.cell_max_volt),
            (Some(count), Some(min), Some(max)) if count != 0 && min != 0.0 && max != 0.0
        )
    }

    /// Minimum voltage rise across a long pause that counts as a charge.
    ///
    /// A tenth of the pack's full voltage window, or
    /// [`DEFAULT_CHARGE_THRESHOLD_VOLTS`] when the specs are incomplete.
    pub fn charge_threshold_volts(&self) -> f64 {
        match (self.cell_count, self.cell_min_volt, self.cell_max_volt) {
            (Some(count), Some(min), Some(max)) if self.is_complete() => {
                let cells = f64::from(count);
                (cells * max - cells * min) * 0.1
            }
            _ => DEFAULT_CHARGE_THRESHOLD_VOLTS,
        }
    }
}

/// Settings for [`crate::analyze`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub ride_gap_threshold_seconds: f64,
    pub charge_threshold_seconds: f64,
    /// Point-of-interest labels to suppress
    pub hidden_states: BTreeSet<String>,
    /// Segment ids left off the map
    pub hidden_segments: BTreeSet<usize>,
    pub battery: BatterySpecs,
    /// Units the rider wants to see
    pub units: Units,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ride_gap_threshold_seconds: RIDE_GAP_THRESHOLD_SECONDS,
            charge_threshold_seconds: CHARGE_THRESHOLD_SECONDS,
            hidden_states: [State::Startup, State::StopHalf, State::OneFootpadAtSpeed]
                .iter()
                .map(|state| state.as_str().to_string())
                .collect(),
            hidden_segments: BTreeSet::new(),
            battery: BatterySpecs::default(),
            units: Units::Metric,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        for (name, value) in [
            ("ride_gap_threshold_seconds", self.ride_gap_threshold_seconds),
            ("charge_threshold_seconds", self.charge_threshold_seconds),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalysisError::NonPositiveThreshold { name, value });
            }
        }

        if self.charge_threshold_seconds <= self.ride_gap_threshold_seconds {
            return Err(AnalysisError::ChargeNotAboveRideGap {
                charge: self.charge_threshold_seconds,
                ride: self.ride_gap_threshold_seconds,
            });
        }
        Ok(())
    }

    pub fn charge_threshold_volts(&self) -> f64 {
        self.battery.charge_threshold_volts()
    }

    pub fn is_state_hidden(&self, state: &str) -> bool {
        self.hidden_states.contains(state)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_json::from_str(content).context("Failed to parse analysis config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid config file: {:?}", path))
    }
}
