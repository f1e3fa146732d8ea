//! "Nice number" axis ticks
//!
//! Picks a round tick spacing (1, 2 or 5 times a power of ten) so that a
//! chart axis shows at most `max_ticks` human-friendly labels.

use serde::{Deserialize, Serialize};

/// Ticks returned when the input has no usable range
pub const FALLBACK_TICKS: [f64; 2] = [0.0, 100.0];

const MAX_TICK_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickOptions {
    /// Hard lower bound; overrides the data
    pub min: Option<f64>,
    /// Hard upper bound; overrides the data
    pub max: Option<f64>,
    /// Included in the range if the data does not reach it
    pub suggested_min: Option<f64>,
    pub suggested_max: Option<f64>,
    pub max_ticks: usize,
}

impl Default for TickOptions {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            suggested_min: None,
            suggested_max: None,
            max_ticks: 10,
        }
    }
}

/// Round `range` to 1, 2, 5 or 10 times its power of ten.
///
/// With `round` the cut-offs are biased up by half, so 1.4 rounds to 1 and
/// 2.9 to 2.
pub fn nice_num(range: f64, round: bool) -> f64 {
    let magnitude = 10f64.powf(range.log10().floor());
    let fraction = range / magnitude;
    let round_factor = if round { 1.5 } else { 1.0 };

    let nice_fraction = if fraction < 1.0 * round_factor {
        1.0
    } else if fraction < 2.0 * round_factor {
        2.0
    } else if fraction < 5.0 * round_factor {
        5.0
    } else {
        10.0
    };
    nice_fraction * magnitude
}

/// Compute axis ticks for `values`.
///
/// `NaN` values are ignored. When there is nothing to span (no values, a
/// single repeated value, fewer than two ticks allowed) [`FALLBACK_TICKS`]
/// is returned.
pub fn ticks(values: &[f64], options: &TickOptions) -> Vec<f64> {
    let present = values.iter().copied().filter(|v| !v.is_nan());

    let min = options.min.unwrap_or_else(|| {
        present
            .clone()
            .chain(options.suggested_min)
            .fold(f64::INFINITY, f64::min)
    });
    let max = options.max.unwrap_or_else(|| {
        present
            .clone()
            .chain(options.suggested_max)
            .fold(f64::NEG_INFINITY, f64::max)
    });

    if !min.is_finite() || !max.is_finite() || max <= min || options.max_ticks < 2 {
        return FALLBACK_TICKS.to_vec();
    }

    let range = nice_num(max - min, false);
    let spacing = nice_num(range / (options.max_ticks - 1) as f64, true);
    if !(spacing.is_finite() && spacing > 0.0) {
        return FALLBACK_TICKS.to_vec();
    }

    let nice_min = (min / spacing).floor() * spacing;
    let nice_max = (max / spacing).ceil() * spacing;
    let within_bounds =
        |n: f64| options.min.map_or(true, |lo| n >= lo) && options.max.map_or(true, |hi| n <= hi);

    let mut result = Vec::new();
    let mut n = nice_min;
    let mut iterations = 0;
    while n <= nice_max && iterations < MAX_TICK_ITERATIONS {
        if within_bounds(n) {
            result.push(n);
        }
        n += spacing;
        iterations += 1;
    }
    if max > nice_max {
        result.push(n);
    }

    // Walk left until the lowest value is covered; a tick at 0 always ends it
    let mut prefix = Vec::new();
    let mut first = result.first().copied();
    while let Some(tick) = first {
        if tick == 0.0 || tick.is_nan() || min >= tick || prefix.len() >= MAX_TICK_ITERATIONS {
            break;
        }
        let lower = tick - spacing;
        prefix.push(lower);
        first = Some(lower);
    }
    if !prefix.is_empty() {
        prefix.reverse();
        prefix.extend(result);
        result = prefix;
    }

    if result.is_empty() {
        return FALLBACK_TICKS.to_vec();
    }
    result
}
