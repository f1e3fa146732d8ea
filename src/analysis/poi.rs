//! Points of interest along a ride
//!
//! Three independent detectors run on every row: non-riding states reported
//! by the board, footpad sensors reading released at speed, and a voltage
//! rise across a long pause (the board was charged).

use crate::config::AnalysisConfig;
use crate::types::{CanonicalRow, PointOfInterest, State};

/// Footpad events are only raised above this speed
pub const FOOTPAD_SPEED_THRESHOLD: f64 = 2.0;
/// Combined ADC reading below which neither footpad pad is pressed
pub const NO_FOOTPADS_ADC_THRESHOLD: f64 = 2.0;
/// Combined ADC reading below which only one pad is pressed
pub const ONE_FOOTPAD_ADC_THRESHOLD: f64 = 4.0;

fn footpad_event(row: &CanonicalRow) -> Option<State> {
    if row.speed.is_nan() || row.speed <= FOOTPAD_SPEED_THRESHOLD {
        return None;
    }

    let combined_adc = row.adc1 + row.adc2;
    if combined_adc < NO_FOOTPADS_ADC_THRESHOLD {
        Some(State::NoFootpadsAtSpeed)
    } else if combined_adc < ONE_FOOTPAD_ADC_THRESHOLD {
        Some(State::OneFootpadAtSpeed)
    } else {
        None
    }
}

fn is_charge_point(previous: &CanonicalRow, row: &CanonicalRow, config: &AnalysisConfig) -> bool {
    row.time - previous.time > config.charge_threshold_seconds
        && row.voltage - previous.voltage > config.charge_threshold_volts()
}

/// Label every row with the events it triggers.
///
/// A row can carry several events at once. Labels listed in
/// [`AnalysisConfig::hidden_states`] are dropped one by one.
pub fn extract_points_of_interest(
    rows: &[CanonicalRow],
    config: &AnalysisConfig,
) -> Vec<PointOfInterest> {
    let mut points = Vec::new();
    let mut push = |index: usize, state: &str| {
        if !config.is_state_hidden(state) {
            points.push(PointOfInterest {
                index,
                state: state.to_string(),
            });
        }
    };

    let mut previous: Option<&CanonicalRow> = None;
    for row in rows {
        if !row.is_riding() {
            push(row.index, &row.state);
        }

        if let Some(event) = footpad_event(row) {
            push(row.index, event.as_str());
        }

        if let Some(previous) = previous {
            if is_charge_point(previous, row, config) {
                push(row.index, State::ChargePoint.as_str());
            }
        }

        previous = Some(row);
    }

    log::debug!("Found {} points of interest in {} rows", points.len(), rows.len());
    points
}
