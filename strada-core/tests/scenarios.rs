//! End-to-end checks of the recurrence engine and proximity matcher through the public API.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use strada_core::geo::{EARTH_RADIUS_METERS, haversine_meters};
use strada_core::recurrence::nth_weekday_of_month;
use strada_core::{CleaningRule, DayParity, GeoPoint, Polyline, is_within, nearest_distance};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Every day from 2023-01-01 through 2025-12-31.
fn reference_days() -> impl Iterator<Item = NaiveDate> {
    date(2023, 1, 1)
        .iter_days()
        .take_while(|day| *day <= date(2025, 12, 31))
}

fn all_weekdays() -> [Weekday; 7] {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
}

fn ordinal_of(day: NaiveDate) -> u8 {
    u8::try_from(day.day0() / 7 + 1).expect("week ordinal fits in u8")
}

#[test]
fn weekly_wednesday_from_a_wednesday_is_seven_days_later() {
    let rule = CleaningRule {
        weekday: Some(Weekday::Wed),
        weekly: true,
        ..CleaningRule::default()
    };
    let from = date(2024, 5, 15);
    assert_eq!(from.weekday(), Weekday::Wed);
    assert_eq!(rule.next_occurrence(from), from.checked_add_days(Days::new(7)));
}

#[test]
fn second_monday_moves_to_third_monday_or_next_first() {
    let rule = CleaningRule {
        weekday: Some(Weekday::Mon),
        week_ordinals: BTreeSet::from([1, 3]),
        ..CleaningRule::default()
    };

    for (year, month) in [(2024, 1), (2024, 4), (2024, 12), (2025, 6)] {
        let second = nth_weekday_of_month(year, month, Weekday::Mon, 2).expect("second monday");
        let expected = nth_weekday_of_month(year, month, Weekday::Mon, 3).expect("third monday");
        assert_eq!(rule.next_occurrence(second), Some(expected), "{year}-{month}");
    }
}

#[test]
fn weekly_results_are_strictly_future_and_on_the_weekday() {
    for weekday in all_weekdays() {
        let rule = CleaningRule {
            weekday: Some(weekday),
            weekly: true,
            ..CleaningRule::default()
        };
        for from in reference_days() {
            let next = rule.next_occurrence(from).expect("weekly rules always resolve");
            assert!(next > from, "{next} not after {from}");
            assert!((next - from).num_days() <= 7);
            assert_eq!(next.weekday(), weekday);
        }
    }
}

#[test]
fn ordinal_results_match_weekday_ordinal_and_parity() {
    let ordinal_sets: [&[u8]; 4] = [&[1], &[2, 4], &[1, 3, 5], &[5]];
    let parities = [DayParity::Any, DayParity::Even, DayParity::Odd];

    for weekday in [Weekday::Mon, Weekday::Thu, Weekday::Sat] {
        for ordinals in ordinal_sets {
            for parity in parities {
                let rule = CleaningRule {
                    weekday: Some(weekday),
                    week_ordinals: ordinals.iter().copied().collect(),
                    day_parity: parity,
                    ..CleaningRule::default()
                };

                for from in reference_days().step_by(5) {
                    let Some(next) = rule.next_occurrence(from) else {
                        continue;
                    };
                    assert!(next > from);
                    assert_eq!(next.weekday(), weekday);
                    assert!(rule.week_ordinals.contains(&ordinal_of(next)));
                    assert!(parity.accepts(next.day()), "{next} violates {parity:?}");
                }
            }
        }
    }
}

#[test]
fn weekly_parity_is_kept_unless_the_single_retry_applies() {
    for parity in [DayParity::Even, DayParity::Odd] {
        let rule = CleaningRule {
            weekday: Some(Weekday::Tue),
            weekly: true,
            day_parity: parity,
            ..CleaningRule::default()
        };

        for from in reference_days() {
            let next = rule.next_occurrence(from).expect("weekly rules always resolve");
            let days_ahead = (next - from).num_days();
            if days_ahead <= 7 {
                assert!(parity.accepts(next.day()));
            } else {
                assert!(days_ahead <= 14, "retry moves exactly one week");
            }
        }
    }
}

#[test]
fn fifteen_meters_from_a_hundred_meter_segment() {
    let meters_per_degree = EARTH_RADIUS_METERS.to_radians();
    let lat = 43.7731_f64;
    let lon = 11.2560_f64;
    let east = |meters: f64| meters / (meters_per_degree * lat.to_radians().cos());
    let north = |meters: f64| meters / meters_per_degree;

    let path = Polyline::from_lon_lat([(lon, lat), (lon + east(100.0), lat)]);
    let point = GeoPoint::new(lat + north(15.0), lon + east(50.0));

    let (near, distance) = is_within(point, &path, 20.0);
    assert!(near);
    assert!((distance - 15.0).abs() <= 0.5, "got {distance}");
}

#[test]
fn beyond_the_endpoint_measures_to_the_endpoint() {
    let start = GeoPoint::new(43.7700, 11.2500);
    let end = GeoPoint::new(43.7700, 11.2502);
    let point = GeoPoint::new(43.7701, 11.2510);

    let distance = nearest_distance(point, &Polyline::new(vec![start, end]));
    assert!((distance - haversine_meters(point, end)).abs() < 1e-6);
}
