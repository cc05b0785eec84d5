//! High-level service facade combining a dataset source with the engines.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogHandle};
use crate::exclusion::ExclusionList;
use crate::model::{DatasetMeta, GeoPoint, StreetSegment};
use crate::ports::{DatasetPort, PortError};
use crate::reminder::{FavoriteAlert, favorite_alerts};

#[derive(Debug, Clone)]
/// A nearby street, detached from the catalog generation it was found in.
pub struct NearbyStreet {
    /// The matched segment.
    pub street: StreetSegment,
    /// Distance from the query point, in meters.
    pub distance_m: f64,
    /// Next cleaning after the reference day, if determinable.
    pub next_cleaning: Option<NaiveDate>,
}

/// Public entry point for loading data and answering street queries.
pub struct StradaService {
    port: Arc<dyn DatasetPort>,
    exclusions: ExclusionList,
    catalog: CatalogHandle,
}

impl StradaService {
    /// Create a new service bound to a dataset source. No data is loaded yet.
    #[must_use]
    pub fn new(port: Arc<dyn DatasetPort>, exclusions: ExclusionList) -> Self {
        Self {
            port,
            exclusions,
            catalog: CatalogHandle::new(),
        }
    }

    /// Metadata of the dataset source.
    #[must_use]
    pub fn source(&self) -> &DatasetMeta {
        self.port.source()
    }

    /// Load the dataset, apply exclusions and publish it as the current catalog.
    ///
    /// On failure the previous catalog stays in place.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the source fails or yields no streets.
    pub async fn refresh(&self, now: NaiveDateTime) -> Result<usize, PortError> {
        let source = self.port.source();
        info!(source = %source.id, "refreshing street cleaning data");

        let streets = match self.port.load().await {
            Ok(streets) => self.exclusions.filter(streets),
            Err(err) => {
                warn!(source = %source.id, error = %err, "refresh failed, keeping previous data");
                return Err(err);
            }
        };

        if streets.is_empty() {
            warn!(source = %source.id, "dataset yielded no streets, keeping previous data");
            return Err(PortError::EmptyDataset);
        }

        let count = streets.len();
        self.catalog.publish(Catalog::new(streets, now));
        info!(source = %source.id, count, "street cleaning data loaded");
        Ok(count)
    }

    /// The current catalog generation.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.snapshot()
    }

    /// Streets within `max_meters` of `point`, nearest first.
    #[must_use]
    pub fn nearby(&self, point: GeoPoint, max_meters: f64, today: NaiveDate) -> Vec<NearbyStreet> {
        let catalog = self.catalog.snapshot();
        catalog
            .nearby(point, max_meters)
            .into_iter()
            .map(|hit| NearbyStreet {
                street: hit.street.clone(),
                distance_m: hit.distance_m,
                next_cleaning: hit.street.rule.next_occurrence(today),
            })
            .collect()
    }

    /// All segments whose name contains `query`, in dataset order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<StreetSegment> {
        self.catalog
            .snapshot()
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The segment a street name most likely refers to.
    #[must_use]
    pub fn find_by_name(&self, query: &str, today: NaiveDate) -> Option<StreetSegment> {
        self.catalog.snapshot().find_by_name(query, today).cloned()
    }

    /// Upcoming cleanings on favorite streets within the warning window.
    #[must_use]
    pub fn favorite_alerts<S: AsRef<str>>(
        &self,
        favorites: &[S],
        today: NaiveDate,
        warning_days: i64,
    ) -> Vec<FavoriteAlert> {
        let catalog = self.catalog.snapshot();
        favorite_alerts(favorites, catalog.streets(), today, warning_days)
    }
}
