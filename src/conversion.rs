//! Unit conversion and display formatting
//!
//! Adapters report speed and distance in the units the source logged them
//! in; these helpers move a row sequence into the rider's display units.

use crate::types::{CanonicalRow, Units};

const KM_PER_MILE: f64 = 1.609344;
const KMH_PER_METER_PER_SECOND: f64 = 3.6;

pub fn km_to_mi(km: f64) -> f64 {
    km / KM_PER_MILE
}

pub fn mi_to_km(mi: f64) -> f64 {
    mi * KM_PER_MILE
}

/// VESC Tool logs speed in m/s
pub fn meters_per_second_to_kmh(mps: f64) -> f64 {
    mps * KMH_PER_METER_PER_SECOND
}

fn identity(value: f64) -> f64 {
    value
}

/// Converter for speed or distance values between two unit systems
pub fn speed_mapper(from: Units, to: Units) -> fn(f64) -> f64 {
    match (from, to) {
        (Units::Metric, Units::Imperial) => km_to_mi,
        (Units::Imperial, Units::Metric) => mi_to_km,
        _ => identity,
    }
}

/// Copy of `rows` with speed and distance expressed in `to` units
pub fn convert_rows(rows: &[CanonicalRow], from: Units, to: Units) -> Vec<CanonicalRow> {
    let map = speed_mapper(from, to);
    rows.iter()
        .map(|row| CanonicalRow {
            speed: map(row.speed),
            distance: map(row.distance),
            ..row.clone()
        })
        .collect()
}

/// Format a value with one decimal, `??` when it is missing or NaN.
///
/// With `allow_int` whole numbers are printed without a fraction.
pub fn format_float(value: Option<f64>, allow_int: bool) -> String {
    match value {
        Some(n) if !n.is_nan() => {
            if allow_int && n.fract() == 0.0 {
                format!("{n}")
            } else {
                format!("{n:.1}")
            }
        }
        _ => "??".to_string(),
    }
}
