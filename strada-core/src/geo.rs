//! Spherical-earth distance and bearing primitives.

use crate::model::GeoPoint;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Great-circle distance between two points in meters (haversine formula).
#[must_use]
pub fn haversine_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat_from = from.lat.to_radians();
    let lat_to = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * half_chord.sqrt().min(1.0).asin()
}

/// Initial bearing from `from` towards `to`, in degrees within `[0, 360)`.
#[must_use]
pub fn initial_bearing_degrees(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat_from = from.lat.to_radians();
    let lat_to = to.lat.to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let east = delta_lon.sin() * lat_to.cos();
    let north = lat_from.cos() * lat_to.sin() - lat_from.sin() * lat_to.cos() * delta_lon.cos();

    east.atan2(north).to_degrees().rem_euclid(360.0)
}

/// Absolute difference between two bearings, folded into `[0, 180]`.
#[must_use]
pub fn bearing_difference_degrees(first: f64, second: f64) -> f64 {
    let delta = (first - second).abs().rem_euclid(360.0);
    if delta > 180.0 { 360.0 - delta } else { delta }
}
