//! Boundary interpolation between two recorded trail points.
//!
//! Motion between consecutive pings is modelled as constant speed along a
//! straight line in Web Mercator space. This is an approximation that holds
//! for the short gaps between GPS pings and degrades over long gaps or near
//! the poles.

use std::f64::consts::PI;

use crate::geo_utils::{from_web_mercator, haversine_km, to_web_mercator, WEB_MERCATOR_RADIUS_M};
use crate::{Location, SegmentConfig, TrailPoint};

/// Location at `timestamp` on the way from `previous` to `next`.
///
/// Returns the interpolated location together with the straight-line
/// distance (km) travelled from `previous` to reach it. A pair with no
/// distance or no elapsed time between them yields `previous`'s coordinates
/// and 0 km.
///
/// # Example
/// ```
/// use trip_segmenter::{TrailPoint, interpolate_location};
///
/// let previous = TrailPoint::new(0, 51.500, -0.130);
/// let next = TrailPoint::new(10_000, 51.502, -0.130);
///
/// let (location, km) = interpolate_location(&previous, &next, 5_000);
/// assert!((location.latitude - 51.501).abs() < 1e-5);
/// assert!(km > 0.1 && km < 0.12);
/// ```
pub fn interpolate_location(previous: &TrailPoint, next: &TrailPoint, timestamp: i64) -> (Location, f64) {
    let total_distance_km = haversine_km(&previous.location, &next.location);
    let total_duration_s = (next.timestamp - previous.timestamp) as f64 / 1000.0;
    let elapsed_s = (timestamp - previous.timestamp) as f64 / 1000.0;

    if total_distance_km <= 0.0 || total_duration_s <= 0.0 {
        let origin = Location::new(previous.location.latitude, previous.location.longitude);
        return (origin, 0.0);
    }

    let speed_km_per_s = total_distance_km / total_duration_s;
    let straight_line_km = speed_km_per_s * elapsed_s;
    let fraction = straight_line_km / total_distance_km;

    let from = to_web_mercator(&previous.location);
    let mut to = to_web_mercator(&next.location);

    // Short way round across the antimeridian
    let half_world = WEB_MERCATOR_RADIUS_M * PI;
    if to.x - from.x > half_world {
        to.x -= 2.0 * half_world;
    } else if from.x - to.x > half_world {
        to.x += 2.0 * half_world;
    }

    let projected = from + (to - from) * fraction;
    (from_web_mercator(projected), straight_line_km)
}

/// A copy of `previous` moved to its interpolated position at `timestamp`.
///
/// Every field other than the location and timestamp is taken from
/// `previous`.
pub fn interpolated_trail_point(previous: &TrailPoint, next: &TrailPoint, timestamp: i64) -> TrailPoint {
    let (location, _) = interpolate_location(previous, next, timestamp);
    TrailPoint {
        timestamp,
        location,
        extra: previous.extra.clone(),
    }
}

/// Whether a window boundary inside the gap `previous -> next` deserves an
/// interpolated point.
///
/// Both the gap's distance and `duration_s` (seconds between the boundary and
/// the nearest recorded point) must strictly exceed their thresholds.
/// Otherwise the recorded point is used as the boundary.
pub fn requires_interpolation(
    previous: &TrailPoint,
    next: &TrailPoint,
    duration_s: f64,
    config: &SegmentConfig,
) -> bool {
    let distance_km = haversine_km(&previous.location, &next.location);
    distance_km > config.minimum_distance_km_to_interpolate
        && duration_s > config.minimum_seconds_to_interpolate
}
