//! Derived ride analytics
//!
//! [`analyze`] bundles gap detection, GPS correction, segmentation and
//! point-of-interest extraction for one parsed file.

pub mod gaps;
pub mod poi;

pub use gaps::*;
pub use poi::*;

use crate::config::AnalysisConfig;
use crate::types::{DataSource, ParseResult, PolylineSegment, RideAnalysis};

/// Run every analysis over a parsed ride
pub fn analyze(result: &ParseResult, config: &AnalysisConfig) -> RideAnalysis {
    let rows = &result.rows;
    let gaps = detect_gaps(rows, config.ride_gap_threshold_seconds);

    let mut points = gps_points(rows);
    // Only Float Control logs stale fixes after power-up
    if result.source == DataSource::FloatControl {
        let corrected = correct_gps_defects(&mut points, &gaps);
        log::debug!("Corrected {corrected} stale GPS fixes");
    }

    let segments = compute_segments(
        &gaps,
        rows.len(),
        config.charge_threshold_seconds,
        &config.hidden_segments,
    );
    let points_of_interest = extract_points_of_interest(rows, config);

    log::debug!(
        "{} gaps, {} segments, {} points of interest",
        gaps.len(),
        segments.len(),
        points_of_interest.len()
    );

    RideAnalysis {
        gaps,
        gps_points: points,
        segments,
        points_of_interest,
    }
}

/// Segments of an analysed ride travelled before row `limit`
pub fn travelled_segments(
    analysis: &RideAnalysis,
    config: &AnalysisConfig,
    limit: usize,
) -> Vec<PolylineSegment> {
    compute_travelled_segments(
        &analysis.gaps,
        analysis.gps_points.len(),
        config.charge_threshold_seconds,
        &config.hidden_segments,
        limit,
    )
}
