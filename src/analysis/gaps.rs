//! Ride gaps, stale GPS fix correction and map segments
//!
//! A ride is split wherever the logger paused for longer than the ride-gap
//! threshold. Gaps long enough to have charged in between start a new
//! segment id, which is what the map colours by and what riders hide.

use crate::types::{CanonicalRow, GpsGap, GpsPoint, PolylineSegment};
use std::collections::BTreeSet;

const TRAVELLED_LINE_COLOURS: [&str; 11] = [
    "#14b8a6", // teal
    "#0ea5e9", // sky
    "#6366f1", // indigo
    "#a855f7", // purple
    "#d946ef", // fuchsia
    "#ec4899", // pink
    "#f43f5e", // rose
    "#f97316", // orange
    "#eab308", // yellow
    "#84cc16", // lime
    "#22c55e", // green
];

/// Find pauses longer than `threshold_seconds` between consecutive rows.
///
/// The result always starts with [`GpsGap::START`], so segmenting never sees
/// an empty gap list.
pub fn detect_gaps(rows: &[CanonicalRow], threshold_seconds: f64) -> Vec<GpsGap> {
    let mut gaps = vec![GpsGap::START];
    for pair in rows.windows(2) {
        let seconds_elapsed = pair[1].time - pair[0].time;
        if seconds_elapsed > threshold_seconds {
            gaps.push(GpsGap {
                index: pair[1].index,
                seconds_elapsed,
            });
        }
    }
    gaps
}

/// One map point per row
pub fn gps_points(rows: &[CanonicalRow]) -> Vec<GpsPoint> {
    rows.iter()
        .map(|row| GpsPoint {
            latitude: row.gps_latitude,
            longitude: row.gps_longitude,
            accuracy: row.gps_accuracy,
        })
        .collect()
}

/// Row range `[start, end)` of every gap-bounded region
fn regions(gaps: &[GpsGap], len: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
    gaps.iter().enumerate().map(move |(i, gap)| {
        let end = gaps.get(i + 1).map_or(len, |next| next.index);
        (gap.index.min(len), end.min(len))
    })
}

/// Replace the stale fixes Float Control logs at the start of every region.
///
/// After power-up (and after each pause) the first fixes repeat an old
/// position. Within each region the first point with a real fix that moved
/// away from the region's first position is copied over every point before
/// it. Regions without such a point are left alone.
///
/// Each region is scanned at most once, so this is linear in the row count.
pub fn correct_gps_defects(points: &mut [GpsPoint], gaps: &[GpsGap]) -> usize {
    let mut corrected = 0;
    for (start, end) in regions(gaps, points.len()) {
        let Some(first) = points.get(start).copied() else {
            continue;
        };

        let replacement = points[start..end].iter().position(|point| {
            point.accuracy > 0.0
                && point.latitude.is_finite()
                && point.longitude.is_finite()
                && !point.same_position(&first)
        });

        if let Some(offset) = replacement {
            let fix = points[start + offset];
            for point in &mut points[start..start + offset] {
                point.latitude = fix.latitude;
                point.longitude = fix.longitude;
            }
            corrected += offset;
        }
    }
    corrected
}

/// Split a ride into map segments.
///
/// # Arguments
/// * `gaps` - Output of [`detect_gaps`]
/// * `len` - Number of rows in the ride
/// * `charge_threshold_seconds` - Gaps longer than this start a new segment id
/// * `hidden` - Segment ids to leave out; they still advance the id counter
pub fn compute_segments(
    gaps: &[GpsGap],
    len: usize,
    charge_threshold_seconds: f64,
    hidden: &BTreeSet<usize>,
) -> Vec<PolylineSegment> {
    let mut segments = Vec::with_capacity(gaps.len());
    let mut segment_idx = 0;

    for (gap, (start, end)) in gaps.iter().zip(regions(gaps, len)) {
        if gap.seconds_elapsed > charge_threshold_seconds {
            segment_idx += 1;
        }
        if !hidden.contains(&segment_idx) {
            segments.push(PolylineSegment {
                start,
                end,
                segment_idx,
            });
        }
    }
    segments
}

/// Segments travelled up to row `limit` (exclusive).
///
/// Ends are clamped to `limit` and the walk stops at the first segment whose
/// clamped end reaches it. Hidden segments are removed before the walk.
pub fn compute_travelled_segments(
    gaps: &[GpsGap],
    len: usize,
    charge_threshold_seconds: f64,
    hidden: &BTreeSet<usize>,
    limit: usize,
) -> Vec<PolylineSegment> {
    if limit == 0 {
        return Vec::new();
    }

    let mut travelled = Vec::new();
    for segment in compute_segments(gaps, len, charge_threshold_seconds, hidden) {
        let end = segment.end.min(limit);
        travelled.push(PolylineSegment {
            start: segment.start.min(end),
            end,
            ..segment
        });
        if end == limit {
            break;
        }
    }
    travelled
}

/// Points of each segment, ready to draw as polylines
pub fn segment_points<'a>(
    points: &'a [GpsPoint],
    segments: &[PolylineSegment],
) -> Vec<&'a [GpsPoint]> {
    segments
        .iter()
        .map(|segment| {
            let end = segment.end.min(points.len());
            &points[segment.start.min(end)..end]
        })
        .collect()
}

/// Line colour of a travelled segment
pub fn segment_colour(segment_idx: usize) -> &'static str {
    TRAVELLED_LINE_COLOURS[segment_idx % TRAVELLED_LINE_COLOURS.len()]
}
