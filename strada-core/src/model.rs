//! Domain data structures for cleaning rules, coordinates, and street segments.

use std::collections::BTreeSet;
use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Constraint on the day-of-month of a cleaning date.
pub enum DayParity {
    /// Any day of the month.
    #[default]
    Any,
    /// Only even-numbered days.
    Even,
    /// Only odd-numbered days.
    Odd,
}

impl DayParity {
    /// Check whether a day-of-month satisfies the constraint.
    #[must_use]
    pub fn accepts(self, day_of_month: u32) -> bool {
        match self {
            DayParity::Any => true,
            DayParity::Even => day_of_month.is_multiple_of(2),
            DayParity::Odd => !day_of_month.is_multiple_of(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Wall-clock window of a cleaning, as published by the data source.
pub struct TimeWindow {
    /// Start time, e.g. `07:00`.
    pub start: String,
    /// End time, e.g. `09:00`.
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Recurrence descriptor of a street cleaning.
pub struct CleaningRule {
    /// Weekday of the cleaning; `None` when the source could not be parsed.
    pub weekday: Option<Weekday>,
    /// Allowed occurrences of `weekday` within a month (1 to 5).
    pub week_ordinals: BTreeSet<u8>,
    /// Every week on `weekday`, overriding `week_ordinals`.
    pub weekly: bool,
    /// Even/odd day-of-month restriction.
    pub day_parity: DayParity,
    /// Optional time window, descriptive only.
    pub time_window: Option<TimeWindow>,
    /// Optional qualifier naming the stretch of street the rule covers.
    pub section: Option<String>,
}

impl fmt::Display for CleaningRule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(weekday) = self.weekday {
            parts.push(format!("Every {}", weekday_name(weekday)));
        }

        if !self.week_ordinals.is_empty() && self.week_ordinals.len() < 5 {
            let weeks = self
                .week_ordinals
                .iter()
                .map(|ordinal| format!("{ordinal}°"))
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("week {weeks}"));
        }

        match self.day_parity {
            DayParity::Even => parts.push("(even days)".to_owned()),
            DayParity::Odd => parts.push("(odd days)".to_owned()),
            DayParity::Any => {}
        }

        if let Some(window) = &self.time_window {
            parts.push(format!("{}-{}", window.start, window.end));
        }

        if let Some(section) = &self.section {
            parts.push(format!("[{section}]"));
        }

        if parts.is_empty() {
            formatter.write_str("Schedule unknown")
        } else {
            formatter.write_str(&parts.join(" "))
        }
    }
}

/// English display name of a weekday.
#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Weekday of an Italian two-letter day code as used by the dataset (`LU` to `DO`).
#[must_use]
pub fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code.trim().to_uppercase().as_str() {
        "LU" => Some(Weekday::Mon),
        "MA" => Some(Weekday::Tue),
        "ME" => Some(Weekday::Wed),
        "GI" => Some(Weekday::Thu),
        "VE" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "DO" => Some(Weekday::Sun),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// WGS84 coordinate in degrees, latitude first.
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Construct a point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Construct a point from a source `(lon, lat)` pair.
    #[must_use]
    pub const fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Ordered path of a street, stored latitude first.
pub struct Polyline {
    points: Vec<GeoPoint>,
}

impl Polyline {
    /// Build a polyline from points already in latitude/longitude order.
    #[must_use]
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Build a polyline from source `(lon, lat)` pairs.
    ///
    /// This is the single place where the source axis order is swapped.
    pub fn from_lon_lat<I>(coordinates: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self {
            points: coordinates
                .into_iter()
                .map(|(lon, lat)| GeoPoint::from_lon_lat(lon, lat))
                .collect(),
        }
    }

    /// Points of the path.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Whether the path has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same path walked in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One physical stretch of street with its cleaning schedule.
///
/// Several segments may share a name when a street is cleaned on different
/// days along its length.
pub struct StreetSegment {
    /// Display name of the street.
    pub name: String,
    /// Cleaning schedule of this stretch.
    pub rule: CleaningRule,
    /// Geometry of this stretch.
    pub path: Polyline,
}

impl StreetSegment {
    /// Construct a new segment.
    #[must_use]
    pub fn new<S: Into<String>>(name: S, rule: CleaningRule, path: Polyline) -> Self {
        Self {
            name: name.into(),
            rule,
            path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Metadata describing where a dataset comes from.
pub struct DatasetMeta {
    /// Short identifier, e.g. `florence`.
    pub id: String,
    /// Human-friendly name.
    pub name: String,
}
