//! Point-to-street distance and ranking of nearby streets.

use crate::geo::{bearing_difference_degrees, haversine_meters, initial_bearing_degrees};
use crate::model::{GeoPoint, Polyline, StreetSegment};

/// Segments shorter than this are treated as a single point.
pub const MIN_SEGMENT_METERS: f64 = 1.0;

/// Default matching threshold used by front-ends.
pub const DEFAULT_MAX_DISTANCE_METERS: f64 = 20.0;

#[derive(Debug, Clone, Copy)]
/// A street near a query point.
pub struct ProximityMatch<'a> {
    /// The matched street segment.
    pub street: &'a StreetSegment,
    /// Great-circle distance from the query point to the segment, in meters.
    pub distance_m: f64,
}

/// Distance in meters from `point` to the segment `start`-`end`.
///
/// Projects the point onto the great circle through the segment using
/// along-track and cross-track distances; when the projection falls outside
/// the segment the distance to the nearer endpoint is returned instead.
#[must_use]
pub fn segment_distance(point: GeoPoint, start: GeoPoint, end: GeoPoint) -> f64 {
    if start == end {
        return haversine_meters(point, start);
    }

    let start_to_point = haversine_meters(start, point);
    let segment_length = haversine_meters(start, end);

    if segment_length < MIN_SEGMENT_METERS {
        return start_to_point;
    }

    let delta = bearing_difference_degrees(
        initial_bearing_degrees(start, point),
        initial_bearing_degrees(start, end),
    )
    .to_radians();

    let cross_track = (start_to_point * delta.sin()).abs();
    let along_track = start_to_point * delta.cos();

    if along_track < 0.0 {
        haversine_meters(point, start)
    } else if along_track > segment_length {
        haversine_meters(point, end)
    } else {
        cross_track
    }
}

/// Minimum distance in meters from `point` to any segment of `polyline`.
///
/// A single-point polyline yields the direct distance to that point and an
/// empty one yields positive infinity, which no finite threshold matches.
#[must_use]
pub fn nearest_distance(point: GeoPoint, polyline: &Polyline) -> f64 {
    match polyline.points() {
        [] => f64::INFINITY,
        [only] => haversine_meters(point, *only),
        points => points
            .windows(2)
            .filter_map(|pair| match pair {
                [start, end] => Some(segment_distance(point, *start, *end)),
                _ => None,
            })
            .fold(f64::INFINITY, f64::min),
    }
}

/// Whether `point` lies within `max_meters` of `polyline`, with the distance.
#[must_use]
pub fn is_within(point: GeoPoint, polyline: &Polyline, max_meters: f64) -> (bool, f64) {
    let distance = nearest_distance(point, polyline);
    (distance <= max_meters, distance)
}

/// Streets within `max_meters` of `point`, nearest first.
///
/// Ties keep the order of `candidates`.
#[must_use]
pub fn rank<'a>(
    point: GeoPoint,
    candidates: &'a [StreetSegment],
    max_meters: f64,
) -> Vec<ProximityMatch<'a>> {
    let mut matches: Vec<ProximityMatch<'a>> = candidates
        .iter()
        .filter_map(|street| {
            let (near, distance_m) = is_within(point, &street.path, max_meters);
            near.then_some(ProximityMatch { street, distance_m })
        })
        .collect();

    matches.sort_by(|left, right| left.distance_m.total_cmp(&right.distance_m));
    matches
}
