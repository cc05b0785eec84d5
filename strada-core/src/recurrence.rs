//! Next-occurrence computation for cleaning rules.

use std::iter;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::model::CleaningRule;

/// Number of calendar months searched for ordinal schedules, current month included.
pub const SEARCH_HORIZON_MONTHS: u32 = 3;

impl CleaningRule {
    /// Next cleaning date strictly after `from`.
    ///
    /// Returns `None` when the weekday is unknown or, for ordinal schedules,
    /// when no date in the search horizon satisfies every constraint. Both are
    /// ordinary outcomes meaning "schedule currently indeterminate".
    ///
    /// Weekly schedules resolve a day-parity mismatch by moving one week
    /// forward once and accepting that date as is.
    #[must_use]
    pub fn next_occurrence(&self, from: NaiveDate) -> Option<NaiveDate> {
        let weekday = self.weekday?;

        if self.weekly || self.week_ordinals.is_empty() {
            let next = next_weekday_after(from, weekday)?;
            if self.day_parity.accepts(next.day()) {
                return Some(next);
            }
            return next.checked_add_days(Days::new(7));
        }

        let first_of_month = from.with_day(1)?;

        (0..SEARCH_HORIZON_MONTHS)
            .filter_map(|offset| first_of_month.checked_add_months(Months::new(offset)))
            .flat_map(|month| {
                self.week_ordinals.iter().filter_map(move |&ordinal| {
                    nth_weekday_of_month(month.year(), month.month(), weekday, ordinal)
                })
            })
            .filter(|candidate| *candidate > from && self.day_parity.accepts(candidate.day()))
            .min()
    }

    /// Upcoming cleaning dates after `from`, each computed from the previous one.
    pub fn occurrences(&self, from: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        iter::successors(self.next_occurrence(from), |previous| {
            self.next_occurrence(*previous)
        })
    }
}

/// First date strictly after `from` falling on `weekday`.
///
/// When `from` already is that weekday the result is one full week later.
#[must_use]
pub fn next_weekday_after(from: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let target = i64::from(weekday.num_days_from_monday());
    let current = i64::from(from.weekday().num_days_from_monday());
    let ahead = match (target - current).rem_euclid(7) {
        0 => 7,
        days => days,
    };
    from.checked_add_days(Days::new(ahead.unsigned_abs()))
}

/// Date of the `ordinal`-th `weekday` in the given month.
///
/// Returns `None` when the month has no such occurrence (for example a fifth
/// Monday in a month with four), for an ordinal of zero, or for an invalid month.
#[must_use]
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    ordinal: u8,
) -> Option<NaiveDate> {
    let weeks_after_first = u64::from(ordinal.checked_sub(1)?);
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;

    let target = i64::from(weekday.num_days_from_monday());
    let current = i64::from(first_of_month.weekday().num_days_from_monday());
    let offset = (target - current).rem_euclid(7).unsigned_abs();

    let first_occurrence = first_of_month.checked_add_days(Days::new(offset))?;
    let candidate = first_occurrence.checked_add_days(Days::new(weeks_after_first * 7))?;

    (candidate.month() == month).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::DayParity;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn ordinal_rule(weekday: Weekday, ordinals: &[u8], parity: DayParity) -> CleaningRule {
        CleaningRule {
            weekday: Some(weekday),
            week_ordinals: ordinals.iter().copied().collect(),
            day_parity: parity,
            ..CleaningRule::default()
        }
    }

    #[test]
    fn nth_weekday_finds_occurrences_inside_the_month() {
        // March 2024 starts on a Friday.
        assert_eq!(nth_weekday_of_month(2024, 3, Weekday::Fri, 1), Some(date(2024, 3, 1)));
        assert_eq!(nth_weekday_of_month(2024, 3, Weekday::Mon, 1), Some(date(2024, 3, 4)));
        assert_eq!(nth_weekday_of_month(2024, 3, Weekday::Sun, 5), Some(date(2024, 3, 31)));
    }

    #[test]
    fn nth_weekday_rejects_spill_into_next_month() {
        assert_eq!(nth_weekday_of_month(2024, 3, Weekday::Mon, 5), None);
        assert_eq!(nth_weekday_of_month(2023, 2, Weekday::Wed, 5), None);
    }

    #[test]
    fn nth_weekday_rejects_ordinal_zero_and_bad_month() {
        assert_eq!(nth_weekday_of_month(2024, 3, Weekday::Mon, 0), None);
        assert_eq!(nth_weekday_of_month(2024, 13, Weekday::Mon, 1), None);
    }

    #[test]
    fn next_weekday_skips_same_day() {
        // 2024-03-06 is a Wednesday.
        assert_eq!(next_weekday_after(date(2024, 3, 6), Weekday::Wed), Some(date(2024, 3, 13)));
        assert_eq!(next_weekday_after(date(2024, 3, 6), Weekday::Thu), Some(date(2024, 3, 7)));
        assert_eq!(next_weekday_after(date(2024, 3, 6), Weekday::Tue), Some(date(2024, 3, 12)));
    }

    #[test]
    fn unknown_weekday_has_no_occurrence() {
        let rule = CleaningRule {
            weekly: true,
            ..CleaningRule::default()
        };
        assert_eq!(rule.next_occurrence(date(2024, 3, 6)), None);
    }

    #[test]
    fn weekly_parity_mismatch_shifts_one_week_only() {
        // Next Thursday after 2024-03-06 is the 7th (odd); one retry lands on the 14th.
        let rule = CleaningRule {
            weekday: Some(Weekday::Thu),
            weekly: true,
            day_parity: DayParity::Even,
            ..CleaningRule::default()
        };
        assert_eq!(rule.next_occurrence(date(2024, 3, 6)), Some(date(2024, 3, 14)));
    }

    #[test]
    fn weekly_retry_is_accepted_even_if_parity_still_fails() {
        // Next Thursday after 2024-02-26 is 2024-02-29 (odd), the retry 2024-03-07 is odd too.
        let rule = CleaningRule {
            weekday: Some(Weekday::Thu),
            weekly: true,
            day_parity: DayParity::Even,
            ..CleaningRule::default()
        };
        assert_eq!(rule.next_occurrence(date(2024, 2, 26)), Some(date(2024, 3, 7)));
    }

    #[test]
    fn weekly_flag_overrides_ordinals() {
        let rule = CleaningRule {
            weekday: Some(Weekday::Mon),
            week_ordinals: BTreeSet::from([3]),
            weekly: true,
            ..CleaningRule::default()
        };
        // 2024-03-04 is the first Monday; weekly means the 11th, not the 18th.
        assert_eq!(rule.next_occurrence(date(2024, 3, 4)), Some(date(2024, 3, 11)));
    }

    #[test]
    fn ordinal_rule_moves_to_next_listed_week() {
        let rule = ordinal_rule(Weekday::Mon, &[1, 3], DayParity::Any);
        // 2024-03-11 is the second Monday of March.
        assert_eq!(rule.next_occurrence(date(2024, 3, 11)), Some(date(2024, 3, 18)));
        // From the third Monday the next one is the first Monday of April.
        assert_eq!(rule.next_occurrence(date(2024, 3, 18)), Some(date(2024, 4, 1)));
    }

    #[test]
    fn ordinal_rule_crosses_year_end() {
        let rule = ordinal_rule(Weekday::Tue, &[2], DayParity::Any);
        assert_eq!(rule.next_occurrence(date(2024, 12, 20)), Some(date(2025, 1, 14)));
    }

    #[test]
    fn ordinal_rule_skips_wrong_parity() {
        // First Fridays: 2024-03-01 (excluded, not after), 2024-04-05 (odd).
        // Second Fridays: 2024-03-08 and 2024-04-12 (both even).
        let rule = ordinal_rule(Weekday::Fri, &[1, 2], DayParity::Odd);
        assert_eq!(rule.next_occurrence(date(2024, 3, 1)), Some(date(2024, 4, 5)));
    }

    #[test]
    fn ordinal_rule_with_only_wrong_parity_is_indeterminate() {
        // Second Fridays of March, April and May 2024 fall on the 8th, 12th and 10th.
        let rule = ordinal_rule(Weekday::Fri, &[2], DayParity::Odd);
        assert_eq!(rule.next_occurrence(date(2024, 3, 1)), None);
    }

    #[test]
    fn ordinal_rule_without_candidates_in_horizon_is_indeterminate() {
        // 2023-05-31 is the last fifth Wednesday before August; June and July have none.
        let rule = ordinal_rule(Weekday::Wed, &[5], DayParity::Any);
        assert_eq!(rule.next_occurrence(date(2023, 5, 31)), None);
        assert_eq!(rule.next_occurrence(date(2023, 5, 30)), Some(date(2023, 5, 31)));
    }

    #[test]
    fn occurrences_walk_forward() {
        let rule = ordinal_rule(Weekday::Mon, &[1, 3], DayParity::Any);
        let upcoming: Vec<_> = rule.occurrences(date(2024, 3, 1)).take(4).collect();
        assert_eq!(
            upcoming,
            vec![
                date(2024, 3, 4),
                date(2024, 3, 18),
                date(2024, 4, 1),
                date(2024, 4, 15),
            ]
        );
    }
}
