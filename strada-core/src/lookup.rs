//! Resolving a street by name when several segments share it.

use chrono::NaiveDate;

use crate::model::StreetSegment;

/// Segments whose name contains `query`, ignoring case, in input order.
pub fn matches_by_name<'a>(
    streets: &'a [StreetSegment],
    query: &str,
) -> impl Iterator<Item = &'a StreetSegment> + use<'a> {
    let needle = query.trim().to_uppercase();
    streets
        .iter()
        .filter(move |street| !needle.is_empty() && street.name.to_uppercase().contains(&needle))
}

/// Pick the street segment a name refers to.
///
/// A unique match is returned as is. With several matches the one cleaned
/// soonest after `today` wins, earlier input winning ties; if none of them has
/// a computable next date the first match is returned.
#[must_use]
pub fn find_by_name<'a>(
    streets: &'a [StreetSegment],
    query: &str,
    today: NaiveDate,
) -> Option<&'a StreetSegment> {
    let candidates: Vec<&StreetSegment> = matches_by_name(streets, query).collect();

    match candidates.as_slice() {
        [] => None,
        [only] => Some(*only),
        [first, ..] => candidates
            .iter()
            .filter_map(|street| street.rule.next_occurrence(today).map(|date| (date, *street)))
            .min_by_key(|(date, _)| *date)
            .map(|(_, street)| street)
            .or(Some(*first)),
    }
}
