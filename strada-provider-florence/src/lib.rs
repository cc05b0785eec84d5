//! Provider implementation for the Florence street cleaning open data (KML export).

mod kml;
mod kmz;
mod schedule;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};

use strada_core::{
    model::{DatasetMeta, Polyline, StreetSegment},
    ports::{DatasetPort, PortError},
};

use crate::kml::{RawPlacemark, parse_placemarks};
use crate::kmz::{extract_kml, is_archive};
use crate::schedule::DescriptionParser;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where the KML document is read from.
pub enum DatasetSource {
    /// Download over HTTP(S).
    Url(String),
    /// Read a previously saved document from disk.
    File(PathBuf),
}

/// Street cleaning dataset for Florence.
pub struct FlorenceDatasetPort {
    client: Client,
    source: DatasetSource,
    meta: DatasetMeta,
}

impl FlorenceDatasetPort {
    /// Create a new dataset port bound to the given HTTP client and source.
    #[must_use]
    pub fn new(client: Client, source: DatasetSource) -> Self {
        Self {
            client,
            source,
            meta: dataset_meta(),
        }
    }

    async fn read_document(&self) -> Result<Vec<u8>, PortError> {
        match &self.source {
            DatasetSource::Url(url) => {
                info!(%url, "downloading street cleaning KML");
                fetch_bytes(self.client.get(url)).await
            }
            DatasetSource::File(path) => {
                info!(path = %path.display(), "reading street cleaning KML");
                Ok(tokio::fs::read(path).await?)
            }
        }
    }
}

#[async_trait]
impl DatasetPort for FlorenceDatasetPort {
    fn source(&self) -> &DatasetMeta {
        &self.meta
    }

    async fn load(&self) -> Result<Vec<StreetSegment>, PortError> {
        let bytes = self.read_document().await?;
        let streets = decode_document(&bytes)?;
        info!(count = streets.len(), "parsed street cleaning entries");
        Ok(streets)
    }
}

/// Build the dataset port as a shareable trait object.
#[must_use]
pub fn plugin(client: Client, source: DatasetSource) -> Arc<dyn DatasetPort> {
    Arc::new(FlorenceDatasetPort::new(client, source))
}

fn dataset_meta() -> DatasetMeta {
    DatasetMeta {
        id: String::from("florence"),
        name: String::from("Firenze – Pulizia strade"),
    }
}

/// Decode a raw KML or zipped KMZ payload into street segments.
///
/// For KMZ payloads the first `.kml` entry of the archive is decoded.
///
/// # Errors
///
/// Returns [`PortError::MalformedDataset`] when the archive is broken or holds
/// no KML entry, or when the document is not valid UTF-8 KML.
pub fn decode_document(bytes: &[u8]) -> Result<Vec<StreetSegment>, PortError> {
    if is_archive(bytes) {
        return decode_kml(&extract_kml(bytes)?);
    }
    decode_kml(bytes)
}

fn decode_kml(bytes: &[u8]) -> Result<Vec<StreetSegment>, PortError> {
    let document = std::str::from_utf8(bytes)
        .map_err(|err| PortError::MalformedDataset(format!("document is not UTF-8: {err}")))?;
    let parser = DescriptionParser::new()
        .map_err(|err| PortError::MalformedDataset(format!("attribute pattern: {err}")))?;

    Ok(parse_placemarks(document)?
        .into_iter()
        .map(|placemark| street_from_placemark(&parser, placemark))
        .collect())
}

fn street_from_placemark(parser: &DescriptionParser, placemark: RawPlacemark) -> StreetSegment {
    let parsed = parser.parse(&placemark.description);
    if parsed.rule.weekday.is_none() {
        debug!(placemark = %placemark.name, "no weekday in description");
    }

    let name = parsed.street_name.unwrap_or(placemark.name);
    StreetSegment::new(name, parsed.rule, Polyline::from_lon_lat(placemark.coordinates))
}

// Small helper to fetch a body with status handling.
async fn fetch_bytes(req: RequestBuilder) -> Result<Vec<u8>, PortError> {
    let body = req
        .send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .bytes()
        .await
        .map_err(PortError::from)?;
    Ok(body.to_vec())
}
