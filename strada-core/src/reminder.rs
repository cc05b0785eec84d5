//! When and how urgently to remind about an upcoming cleaning.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::lookup::find_by_name;
use crate::model::StreetSegment;

/// Default number of days ahead within which reminders are sent.
pub const DEFAULT_WARNING_DAYS: i64 = 2;

/// Minimum time between two reminders for the same parking spot.
pub const REMINDER_COOLDOWN: TimeDelta = TimeDelta::hours(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How soon a cleaning is.
pub enum Urgency {
    /// The cleaning is today.
    Today,
    /// The cleaning is tomorrow.
    Tomorrow,
    /// The cleaning is within the warning window, in the given number of days.
    Upcoming(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of checking a cleaning date against today.
pub enum ReminderDecision {
    /// The cleaning date has passed; the stored parking spot is stale.
    Expired,
    /// The cleaning is further away than the warning window.
    NotYet(i64),
    /// A reminder is due.
    Remind(Urgency),
}

/// Classify a cleaning date relative to `today`.
#[must_use]
pub fn classify(next_cleaning: NaiveDate, today: NaiveDate, warning_days: i64) -> ReminderDecision {
    let days_until = (next_cleaning - today).num_days();

    match days_until {
        ..0 => ReminderDecision::Expired,
        0 => ReminderDecision::Remind(Urgency::Today),
        1 => ReminderDecision::Remind(Urgency::Tomorrow),
        days if days <= warning_days => ReminderDecision::Remind(Urgency::Upcoming(days)),
        days => ReminderDecision::NotYet(days),
    }
}

/// Whether a due reminder should actually be sent now.
///
/// Reminders are throttled to one per [`REMINDER_COOLDOWN`].
#[must_use]
pub fn should_notify(
    decision: ReminderDecision,
    now: NaiveDateTime,
    last_reminded: Option<NaiveDateTime>,
) -> bool {
    if !matches!(decision, ReminderDecision::Remind(_)) {
        return false;
    }

    last_reminded.is_none_or(|last| now - last >= REMINDER_COOLDOWN)
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Upcoming cleaning on one of the user's favorite streets.
pub struct FavoriteAlert {
    /// The favorite as the user entered it.
    pub favorite: String,
    /// Name of the resolved street segment.
    pub street: String,
    /// Next cleaning date.
    pub date: NaiveDate,
    /// Days from today until the cleaning.
    pub days_until: i64,
    /// Human-readable schedule of the segment.
    pub schedule: String,
}

/// Favorites cleaned within `warning_days` of `today`, soonest first.
#[must_use]
pub fn favorite_alerts<S: AsRef<str>>(
    favorites: &[S],
    streets: &[StreetSegment],
    today: NaiveDate,
    warning_days: i64,
) -> Vec<FavoriteAlert> {
    let mut alerts: Vec<FavoriteAlert> = favorites
        .iter()
        .filter_map(|favorite| {
            let street = find_by_name(streets, favorite.as_ref(), today)?;
            let date = street.rule.next_occurrence(today)?;
            let days_until = (date - today).num_days();

            (0..=warning_days).contains(&days_until).then(|| FavoriteAlert {
                favorite: favorite.as_ref().to_owned(),
                street: street.name.clone(),
                date,
                days_until,
                schedule: street.rule.to_string(),
            })
        })
        .collect();

    alerts.sort_by_key(|alert| alert.days_until);
    alerts
}
