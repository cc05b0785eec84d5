//! Immutable generations of loaded streets and their atomic publication.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{NaiveDate, NaiveDateTime};

use crate::lookup::{find_by_name, matches_by_name};
use crate::model::{GeoPoint, StreetSegment};
use crate::proximity::{ProximityMatch, rank};

#[derive(Debug, Default)]
/// One loaded generation of the street dataset.
pub struct Catalog {
    streets: Vec<StreetSegment>,
    loaded_at: Option<NaiveDateTime>,
}

impl Catalog {
    /// Wrap a freshly loaded set of streets.
    #[must_use]
    pub fn new(streets: Vec<StreetSegment>, loaded_at: NaiveDateTime) -> Self {
        Self {
            streets,
            loaded_at: Some(loaded_at),
        }
    }

    /// All streets of this generation.
    #[must_use]
    pub fn streets(&self) -> &[StreetSegment] {
        &self.streets
    }

    /// Number of streets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streets.len()
    }

    /// Whether nothing has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }

    /// When this generation was loaded; `None` before the first load.
    #[must_use]
    pub fn loaded_at(&self) -> Option<NaiveDateTime> {
        self.loaded_at
    }

    /// Streets within `max_meters` of `point`, nearest first.
    #[must_use]
    pub fn nearby(&self, point: GeoPoint, max_meters: f64) -> Vec<ProximityMatch<'_>> {
        rank(point, &self.streets, max_meters)
    }

    /// All segments whose name contains `query`.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&StreetSegment> {
        matches_by_name(&self.streets, query).collect()
    }

    /// The segment a street name most likely refers to.
    #[must_use]
    pub fn find_by_name(&self, query: &str, today: NaiveDate) -> Option<&StreetSegment> {
        find_by_name(&self.streets, query, today)
    }
}

/// Shared slot holding the current catalog.
///
/// Readers take a snapshot [`Arc`] and keep a consistent generation for as long
/// as they hold it; [`CatalogHandle::publish`] swaps in a new generation without
/// disturbing them.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    /// Handle starting with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current generation.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the current generation.
    pub fn publish(&self, catalog: Catalog) {
        let fresh = Arc::new(catalog);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = fresh;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{CleaningRule, Polyline};

    fn loaded_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 6)
            .and_then(|day| day.and_hms_opt(0, 30, 0))
            .expect("valid timestamp")
    }

    fn street(name: &str) -> StreetSegment {
        StreetSegment::new(name, CleaningRule::default(), Polyline::default())
    }

    #[test]
    fn starts_empty() {
        let handle = CatalogHandle::new();
        let snapshot = handle.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.loaded_at(), None);
    }

    #[test]
    fn old_snapshot_survives_publish() {
        let handle = CatalogHandle::new();
        handle.publish(Catalog::new(vec![street("VIA ROMA")], loaded_at()));
        let before = handle.snapshot();

        handle.publish(Catalog::new(
            vec![street("VIA MAGGIO"), street("VIA ROMANA")],
            loaded_at(),
        ));
        let after = handle.snapshot();

        assert_eq!(before.len(), 1);
        assert_eq!(before.streets().first().map(|street| street.name.as_str()), Some("VIA ROMA"));
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn search_lists_all_name_matches() {
        let catalog = Catalog::new(
            vec![street("VIA ROMA"), street("VIA ROMANA"), street("VIA MAGGIO")],
            loaded_at(),
        );
        assert_eq!(catalog.search("roma").len(), 2);
    }
}
