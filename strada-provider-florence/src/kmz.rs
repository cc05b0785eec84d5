//! Unpacking of zipped KML exports (KMZ).

use std::io::{Cursor, Read};

use tracing::info;
use zip::ZipArchive;

use strada_core::ports::PortError;

/// Leading bytes of a ZIP archive, which is how KMZ exports arrive.
pub(crate) const ZIP_SIGNATURE: &[u8] = b"PK";

/// Whether `bytes` look like a zipped export rather than plain KML.
pub(crate) fn is_archive(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_SIGNATURE)
}

/// Contents of the first `.kml` entry of the archive, in archive order.
pub(crate) fn extract_kml(bytes: &[u8]) -> Result<Vec<u8>, PortError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| PortError::MalformedDataset(format!("invalid KMZ archive: {err}")))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| PortError::MalformedDataset(format!("invalid KMZ entry: {err}")))?;
        if !entry.name().ends_with(".kml") {
            continue;
        }

        info!(entry = entry.name(), "extracting KML from KMZ archive");
        let mut document = Vec::new();
        entry.read_to_end(&mut document)?;
        return Ok(document);
    }

    Err(PortError::MalformedDataset(
        "KMZ archive contains no .kml entry".to_owned(),
    ))
}
