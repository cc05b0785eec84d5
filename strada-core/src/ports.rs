//! Traits describing dataset sources and their shared error type.

use std::io::Error as IoError;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{DatasetMeta, StreetSegment};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while loading a street-cleaning dataset.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Reading a local dataset failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
    /// The dataset could not be decoded.
    #[error("Malformed dataset: {0}")]
    MalformedDataset(String),
    /// The dataset decoded fine but contained no usable street.
    #[error("Dataset contains no streets")]
    EmptyDataset,
}

#[async_trait]
/// Trait for sources of street geometries with their cleaning rules.
pub trait DatasetPort: Send + Sync {
    /// Metadata describing the dataset served by this port.
    fn source(&self) -> &DatasetMeta;

    /// Load every street segment of the dataset.
    ///
    /// Coordinates are converted to latitude/longitude order while loading.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the dataset cannot be fetched or decoded.
    async fn load(&self) -> Result<Vec<StreetSegment>, PortError>;
}
