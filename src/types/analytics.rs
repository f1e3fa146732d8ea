use serde::{Deserialize, Serialize};

/// A discontinuity in the ride timeline.
///
/// Marks the first row after a pause longer than the ride-gap threshold. Every
/// gap list starts with the synthetic `{ index: 0, seconds_elapsed: 0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsGap {
    pub index: usize,
    pub seconds_elapsed: f64,
}

impl GpsGap {
    pub const START: GpsGap = GpsGap {
        index: 0,
        seconds_elapsed: 0.0,
    };
}

/// Half-open row range `[start, end)` of one travelled stretch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolylineSegment {
    pub start: usize,
    pub end: usize,
    /// Advances only at charge-class gaps
    pub segment_idx: usize,
}

impl PolylineSegment {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A labelled event at a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub index: usize,
    pub state: String,
}

/// Map coordinate of a sample, with the fix accuracy it was logged with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

impl GpsPoint {
    pub fn same_position(&self, other: &GpsPoint) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

/// Derived analytics for one parsed ride
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideAnalysis {
    pub gaps: Vec<GpsGap>,
    /// One point per row, after any stale-fix correction
    pub gps_points: Vec<GpsPoint>,
    pub segments: Vec<PolylineSegment>,
    pub points_of_interest: Vec<PointOfInterest>,
}
