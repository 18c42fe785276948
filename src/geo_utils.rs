//! # Geographic Utilities
//!
//! Distance, projection and tile helpers used by trip segmentation.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_km`] | Great-circle distance between two locations |
//! | [`path_length_km`] | Total length of a sequence of locations |
//! | [`trail_length_km`] | Total length of a GPS trail |
//! | [`to_web_mercator`] | WGS84 (EPSG:4326) to Web Mercator (EPSG:3857) |
//! | [`from_web_mercator`] | Web Mercator (EPSG:3857) back to WGS84 |
//! | [`deg_to_tile`] | Slippy-map tile containing a coordinate |
//! | [`tile_to_deg`] | North-west corner of a slippy-map tile |
//!
//! ## Example
//!
//! ```rust
//! use trip_segmenter::{Location, geo_utils};
//!
//! let london = Location::new(51.5074, -0.1278);
//! let paris = Location::new(48.8566, 2.3522);
//!
//! let km = geo_utils::haversine_km(&london, &paris);
//! assert!((km - 343.5).abs() < 5.0);
//!
//! let planar = geo_utils::to_web_mercator(&london);
//! let back = geo_utils::from_web_mercator(planar);
//! assert!((back.latitude - london.latitude).abs() < 1e-9);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Distances are computed on a sphere of radius 6371 km and returned in
//! kilometers, since the interpolation thresholds are expressed in km.
//!
//! ### Web Mercator
//!
//! Interpolation runs in EPSG:3857 so that a point along the line between two
//! pings is an affine combination of their projected coordinates. Straight
//! lines in this projection are rhumb lines, not great circles; for the short
//! gaps between GPS pings the difference is negligible. Latitudes are clamped
//! to the projection's limit of ±85.05112878°.

use geo::Coord;
use std::f64::consts::PI;

use crate::{Location, TrailPoint};

/// Mean Earth radius used for haversine distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Sphere radius of the EPSG:3857 projection.
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which Web Mercator becomes a square world.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance in kilometers between two locations.
///
/// # Example
///
/// ```rust
/// use trip_segmenter::{Location, geo_utils};
///
/// let p = Location::new(0.0, 0.0);
/// let q = Location::new(0.0, 1.0);
/// // One degree of longitude at the equator
/// assert!((geo_utils::haversine_km(&p, &q) - 111.19).abs() < 0.01);
/// ```
#[inline]
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Total length in kilometers of a path through `locations`, in order.
///
/// Empty or single-point paths return 0.0.
pub fn path_length_km(locations: &[Location]) -> f64 {
    if locations.len() < 2 {
        return 0.0;
    }

    locations
        .windows(2)
        .map(|w| haversine_km(&w[0], &w[1]))
        .sum()
}

/// Total length in kilometers of a trail, in the order given.
pub fn trail_length_km(trail: &[TrailPoint]) -> f64 {
    if trail.len() < 2 {
        return 0.0;
    }

    trail
        .windows(2)
        .map(|w| haversine_km(&w[0].location, &w[1].location))
        .sum()
}

// =============================================================================
// Projection Functions
// =============================================================================

/// Project a WGS84 location to Web Mercator meters (`x` easting, `y` northing).
pub fn to_web_mercator(location: &Location) -> Coord<f64> {
    let lat = location
        .latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    Coord {
        x: WEB_MERCATOR_RADIUS_M * location.longitude.to_radians(),
        y: WEB_MERCATOR_RADIUS_M * (PI / 4.0 + lat / 2.0).tan().ln(),
    }
}

/// Inverse of [`to_web_mercator`]. Longitudes are wrapped into [-180, 180].
pub fn from_web_mercator(coord: Coord<f64>) -> Location {
    let latitude = (2.0 * (coord.y / WEB_MERCATOR_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    let longitude = wrap_longitude((coord.x / WEB_MERCATOR_RADIUS_M).to_degrees());
    Location::new(latitude, longitude)
}

/// Bring a longitude in degrees back into [-180, 180].
#[inline]
pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

// =============================================================================
// Tile Functions
// =============================================================================

/// Slippy-map tile `(x, y)` containing a coordinate at `zoom`.
///
/// # Example
///
/// ```rust
/// use trip_segmenter::geo_utils;
///
/// assert_eq!(geo_utils::deg_to_tile(0.0, 0.0, 1), (1, 1));
/// assert_eq!(geo_utils::deg_to_tile(51.5074, -0.1278, 10), (511, 340));
/// ```
pub fn deg_to_tile(latitude: f64, longitude: f64, zoom: u8) -> (u32, u32) {
    let n = 2f64.powi(zoom as i32);
    let lat_rad = latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    let x = ((longitude + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor();
    // Longitude 180 and the clamped poles land one past the last tile
    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

/// Latitude and longitude of the north-west corner of tile `(x, y)` at `zoom`.
pub fn tile_to_deg(x: u32, y: u32, zoom: u8) -> (f64, f64) {
    let n = 2f64.powi(zoom as i32);
    let longitude = x as f64 / n * 360.0 - 180.0;
    let latitude = (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan().to_degrees();
    (latitude, longitude)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_same_point() {
        let p = Location::new(51.5074, -0.1278);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_known_value() {
        // London to Paris is approximately 344 km
        let london = Location::new(51.5074, -0.1278);
        let paris = Location::new(48.8566, 2.3522);
        assert!(approx_eq(haversine_km(&london, &paris), 343.5, 5.0));
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = Location::new(40.7128, -74.0060);
        let b = Location::new(40.7306, -73.9352);
        assert!(approx_eq(haversine_km(&a, &b), haversine_km(&b, &a), 1e-12));
    }

    #[test]
    fn test_path_length_short_inputs() {
        assert_eq!(path_length_km(&[]), 0.0);
        assert_eq!(path_length_km(&[Location::new(51.5, -0.1)]), 0.0);
        assert_eq!(trail_length_km(&[TrailPoint::new(0, 51.5, -0.1)]), 0.0);
    }

    #[test]
    fn test_path_length_sums_legs() {
        let path = vec![
            Location::new(0.0, 0.0),
            Location::new(0.0, 1.0),
            Location::new(0.0, 2.0),
        ];
        let leg = haversine_km(&path[0], &path[1]);
        assert!(approx_eq(path_length_km(&path), 2.0 * leg, 1e-9));
    }

    #[test]
    fn test_trail_length_matches_path_length() {
        let trail = vec![
            TrailPoint::new(0, 51.5000, -0.1300),
            TrailPoint::new(1000, 51.5010, -0.1290),
            TrailPoint::new(2000, 51.5030, -0.1270),
        ];
        let locations: Vec<Location> = trail.iter().map(|p| p.location.clone()).collect();
        assert_eq!(trail_length_km(&trail), path_length_km(&locations));
    }

    #[test]
    fn test_web_mercator_known_values() {
        let origin = to_web_mercator(&Location::new(0.0, 0.0));
        assert!(approx_eq(origin.x, 0.0, 1e-6));
        assert!(approx_eq(origin.y, 0.0, 1e-6));

        // Half the world's width at the antimeridian
        let east = to_web_mercator(&Location::new(0.0, 180.0));
        assert!(approx_eq(east.x, 20_037_508.342_789_244, 1e-3));

        // London, as reported by any EPSG:3857 reference
        let london = to_web_mercator(&Location::new(51.5074, -0.1278));
        assert!(approx_eq(london.x, -14_226.63, 0.1));
        assert!(approx_eq(london.y, 6_711_542.48, 1.0));
    }

    #[test]
    fn test_web_mercator_round_trip() {
        for (lat, lon) in [(51.5074, -0.1278), (-33.8688, 151.2093), (64.1466, -21.9426)] {
            let back = from_web_mercator(to_web_mercator(&Location::new(lat, lon)));
            assert!(approx_eq(back.latitude, lat, 1e-9));
            assert!(approx_eq(back.longitude, lon, 1e-9));
        }
    }

    #[test]
    fn test_web_mercator_clamps_poles() {
        let pole = to_web_mercator(&Location::new(90.0, 0.0));
        assert!(pole.y.is_finite());
        let back = from_web_mercator(pole);
        assert!(approx_eq(back.latitude, MAX_MERCATOR_LATITUDE, 1e-6));
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(12.5), 12.5);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert!(approx_eq(wrap_longitude(190.0), -170.0, 1e-9));
        assert!(approx_eq(wrap_longitude(-190.0), 170.0, 1e-9));
    }

    #[test]
    fn test_tiles() {
        assert_eq!(deg_to_tile(0.0, 0.0, 0), (0, 0));
        assert_eq!(deg_to_tile(85.0, -180.0, 2), (0, 0));
        assert_eq!(deg_to_tile(-85.0, 180.0, 2), (3, 3));

        let (lat, lon) = tile_to_deg(0, 0, 3);
        assert!(approx_eq(lat, MAX_MERCATOR_LATITUDE, 1e-6));
        assert_eq!(lon, -180.0);

        // A tile's north-west corner maps back into the same tile
        let (x, y) = deg_to_tile(51.5074, -0.1278, 14);
        let (lat, lon) = tile_to_deg(x, y, 14);
        assert_eq!(deg_to_tile(lat - 1e-9, lon + 1e-9, 14), (x, y));
    }
}
