//! # Trip Segmenter
//!
//! Time-window segmentation of recorded GPS trips.
//!
//! A trip record carries an ordered trail of timestamped GPS points, a list of
//! time-bounded events and a trip-level summary. This library cuts such a
//! record down to a requested time window, interpolating trail points at the
//! window boundaries so segments line up exactly with the window.
//!
//! This library provides:
//! - Open trip record types that keep unknown JSON fields intact
//! - Boundary interpolation under a constant-speed assumption
//! - Distance rescaling so segment distances add up to the recorded trip distance
//! - Splitting a trip into consecutive windows, optionally in parallel
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel splitting with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use trip_segmenter::{SegmentConfig, SegmentWindow, TripRecord, TripSegmenter};
//!
//! let record = TripRecord::from_json(r#"{
//!     "trail": [
//!         {"timestamp": 0,     "location": {"latitude": 51.5000, "longitude": -0.1300}},
//!         {"timestamp": 10000, "location": {"latitude": 51.5010, "longitude": -0.1300}},
//!         {"timestamp": 20000, "location": {"latitude": 51.5020, "longitude": -0.1300}}
//!     ],
//!     "events": [],
//!     "trip": {"distance": 222.4}
//! }"#).unwrap();
//!
//! let window = SegmentWindow::new(5000, 15000);
//! let segmenter = TripSegmenter::new(&record, window, false, false, &SegmentConfig::default()).unwrap();
//! let segment = segmenter.segment_record().unwrap();
//!
//! assert_eq!(segment.trail.first().unwrap().timestamp, 5000);
//! assert_eq!(segment.trail.last().unwrap().timestamp, 15000);
//! assert_eq!(segment.trip.drive_time, Some(10.0));
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub mod error;
pub use error::SegmentationError;

// Distance, projection and tile helpers
pub mod geo_utils;

// Boundary interpolation between recorded trail points
pub mod interpolation;
pub use interpolation::{interpolate_location, interpolated_trail_point, requires_interpolation};

// Single-window segmentation
pub mod segment;
pub use segment::{SegmentTrail, TripSegmenter};

// Multi-window splitting
pub mod split;
pub use split::split_trip;

#[cfg(feature = "parallel")]
pub use split::split_trip_parallel;

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 coordinate. Any extra keys on the location object are kept.
///
/// # Example
/// ```
/// use trip_segmenter::Location;
/// let london = Location::new(51.5074, -0.1278);
/// assert!(london.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Location {
    /// Create a location with no extra fields.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, extra: Map::new() }
    }

    /// Check if the location has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A recorded GPS ping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    /// Epoch milliseconds
    #[serde(deserialize_with = "deserialize_timestamp_ms")]
    pub timestamp: i64,
    pub location: Location,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrailPoint {
    pub fn new(timestamp: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            location: Location::new(latitude, longitude),
            extra: Map::new(),
        }
    }
}

/// A time-bounded trip event (harsh braking, phone use, ...).
///
/// Only the two timestamps are interpreted; everything else is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Inclusive start, epoch milliseconds
    #[serde(deserialize_with = "deserialize_timestamp_ms")]
    pub timestamp: i64,
    /// Inclusive end, epoch milliseconds
    #[serde(rename = "timestampEnd", deserialize_with = "deserialize_timestamp_ms")]
    pub timestamp_end: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    pub fn new(timestamp: i64, timestamp_end: i64) -> Self {
        Self { timestamp, timestamp_end, extra: Map::new() }
    }
}

/// Trip-level summary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    /// Recorded trip distance in meters
    pub distance: f64,
    /// Drive time in seconds (derived for segments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_time: Option<f64>,
    /// Distance over drive time (derived for segments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Location>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TripSummary {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            drive_time: None,
            average_speed: None,
            start_location: None,
            end_location: None,
            extra: Map::new(),
        }
    }
}

/// A full trip document: trail, events, summary and whatever else the
/// upstream pipeline attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub trail: Vec<TrailPoint>,
    #[serde(default)]
    pub events: Vec<Event>,
    pub trip: TripSummary,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TripRecord {
    pub fn new(trail: Vec<TrailPoint>, events: Vec<Event>, trip: TripSummary) -> Self {
        Self { trail, events, trip, extra: Map::new() }
    }

    /// Decode a trip record from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SegmentationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a trip record from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, SegmentationError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Encode back into a JSON value, extra fields included.
    pub fn to_json_value(&self) -> Result<Value, SegmentationError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Trail length in kilometers, in trail order.
    pub fn trail_length_km(&self) -> f64 {
        geo_utils::trail_length_km(&self.trail)
    }
}

/// A requested time window in epoch milliseconds, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentWindow {
    pub start: i64,
    pub end: i64,
}

impl SegmentWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start) as f64 / 1000.0
    }

    /// Build consecutive windows from an ordered list of boundaries.
    ///
    /// `[a, b, c]` gives `[a, b]` and `[b, c]`. Fewer than two boundaries
    /// give no windows.
    ///
    /// ```
    /// use trip_segmenter::SegmentWindow;
    /// let windows = SegmentWindow::from_boundaries(&[0, 1000, 2500]);
    /// assert_eq!(windows, vec![SegmentWindow::new(0, 1000), SegmentWindow::new(1000, 2500)]);
    /// ```
    pub fn from_boundaries(boundaries: &[i64]) -> Vec<Self> {
        boundaries.windows(2).map(|w| Self::new(w[0], w[1])).collect()
    }
}

/// Configuration for boundary interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// A boundary is interpolated only when the surrounding trail gap is
    /// longer than this (kilometers, strict).
    /// Default: 0.01 km (GPS noise floor)
    pub minimum_distance_km_to_interpolate: f64,

    /// A boundary is interpolated only when the window boundary lies more
    /// than this many seconds from the nearest recorded point (strict).
    /// Default: 1.0 s (typical ping interval)
    pub minimum_seconds_to_interpolate: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            minimum_distance_km_to_interpolate: 0.01,
            minimum_seconds_to_interpolate: 1.0,
        }
    }
}

impl SegmentConfig {
    pub fn new(minimum_distance_km_to_interpolate: f64, minimum_seconds_to_interpolate: f64) -> Self {
        Self { minimum_distance_km_to_interpolate, minimum_seconds_to_interpolate }
    }

    /// Load from a JSON settings document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SegmentationError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Accepts integer or float milliseconds. Floats are rounded.
fn deserialize_timestamp_ms<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(ms) = number.as_i64() {
        return Ok(ms);
    }
    number
        .as_f64()
        .filter(|ms| ms.is_finite() && ms.abs() < i64::MAX as f64)
        .map(|ms| ms.round() as i64)
        .ok_or_else(|| D::Error::custom(format!("timestamp {} is out of range", number)))
}

// ============================================================================
// Tests
// ============================================================================
