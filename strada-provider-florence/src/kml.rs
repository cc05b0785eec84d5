//! Streaming extraction of placemarks from a KML document.

use std::{fmt, str};

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use tracing::debug;

use strada_core::ports::PortError;

/// Placemark as found in the document, coordinates still in `(lon, lat)` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawPlacemark {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) coordinates: Vec<(f64, f64)>,
}

/// Which text of the current placemark is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Name,
    Description,
    LineCoordinates,
    PolygonCoordinates,
}

#[derive(Default)]
struct PlacemarkBuilder {
    name: String,
    description: String,
    line: String,
    polygon: String,
}

impl PlacemarkBuilder {
    fn push(&mut self, target: Target, text: &str) {
        let buffer = match target {
            Target::Name => &mut self.name,
            Target::Description => &mut self.description,
            Target::LineCoordinates => &mut self.line,
            Target::PolygonCoordinates => &mut self.polygon,
        };
        buffer.push_str(text);
    }

    fn finish(self) -> Option<RawPlacemark> {
        let mut coordinates = parse_coordinates(&self.line);
        if coordinates.is_empty() {
            coordinates = parse_coordinates(&self.polygon);
        }

        let name = self.name.trim().to_owned();
        if coordinates.is_empty() {
            debug!(placemark = %name, "skipping placemark without coordinates");
            return None;
        }

        Some(RawPlacemark {
            name: if name.is_empty() { "Unknown".to_owned() } else { name },
            description: self.description.trim().to_owned(),
            coordinates,
        })
    }
}

/// Collect every placemark that carries line or polygon coordinates.
pub(crate) fn parse_placemarks(document: &str) -> Result<Vec<RawPlacemark>, PortError> {
    let mut reader = Reader::from_str(document);
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<PlacemarkBuilder> = None;
    let mut placemarks = Vec::new();

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(ref element) => {
                let name = str::from_utf8(element.local_name().as_ref())
                    .map_err(malformed)?
                    .to_owned();
                if name == "Placemark" {
                    current = Some(PlacemarkBuilder::default());
                }
                path.push(name);
            }
            Event::End(ref element) => {
                path.pop();
                if element.local_name().as_ref() == b"Placemark"
                    && let Some(builder) = current.take()
                {
                    placemarks.extend(builder.finish());
                }
            }
            Event::Text(ref text) => {
                if let (Some(builder), Some(target)) = (current.as_mut(), target_of(&path)) {
                    builder.push(target, str::from_utf8(text.as_ref()).map_err(malformed)?);
                }
            }
            Event::CData(ref data) => {
                if let (Some(builder), Some(target)) = (current.as_mut(), target_of(&path)) {
                    builder.push(target, str::from_utf8(data.as_ref()).map_err(malformed)?);
                }
            }
            Event::GeneralRef(ref reference) => {
                if let (Some(builder), Some(target)) = (current.as_mut(), target_of(&path)) {
                    if let Some(character) = reference.resolve_char_ref().map_err(malformed)? {
                        builder.push(target, character.encode_utf8(&mut [0; 4]));
                    } else {
                        let entity = str::from_utf8(reference.as_ref()).map_err(malformed)?;
                        let resolved = resolve_predefined_entity(entity).ok_or_else(|| {
                            PortError::MalformedDataset(format!("unknown entity &{entity};"))
                        })?;
                        builder.push(target, resolved);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(placemarks)
}

/// Decide where text inside the element at the end of `path` belongs.
fn target_of(path: &[String]) -> Option<Target> {
    let (leaf, ancestors) = path.split_last()?;
    let parent = ancestors.last().map(String::as_str);

    match (parent, leaf.as_str()) {
        (Some("Placemark"), "name") => Some(Target::Name),
        (Some("Placemark"), "description") => Some(Target::Description),
        (_, "coordinates") if ancestors.iter().any(|tag| tag == "LineString") => {
            Some(Target::LineCoordinates)
        }
        (_, "coordinates") if ancestors.iter().any(|tag| tag == "Polygon") => {
            Some(Target::PolygonCoordinates)
        }
        _ => None,
    }
}

/// Parse whitespace-separated `lon,lat[,alt]` tuples, dropping malformed ones.
pub(crate) fn parse_coordinates(text: &str) -> Vec<(f64, f64)> {
    text.split_whitespace()
        .filter_map(|tuple| {
            let mut parts = tuple.split(',').map(str::parse::<f64>);
            match (parts.next(), parts.next()) {
                (Some(Ok(lon)), Some(Ok(lat))) => Some((lon, lat)),
                _ => {
                    debug!(tuple, "dropping malformed coordinate tuple");
                    None
                }
            }
        })
        .collect()
}

fn malformed<E: fmt::Display>(err: E) -> PortError {
    PortError::MalformedDataset(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Pulizia strade</name>
    <Folder>
      <Placemark>
        <name>VIA DEI SERVI</name>
        <description><![CDATA[<table><tr><td><span class="atr-name">indirizzo</span></td><td><span class="atr-value">VIA DEI SERVI</span></td></tr></table>]]></description>
        <LineString>
          <coordinates>11.2570,43.7745,0 11.2578,43.7752,0</coordinates>
        </LineString>
      </Placemark>
      <Placemark>
        <name>PIAZZA SS. ANNUNZIATA</name>
        <description>&lt;span class="atr-name"&gt;indirizzo&lt;/span&gt;</description>
        <Polygon>
          <outerBoundaryIs>
            <LinearRing>
              <coordinates>11.2590,43.7768 11.2595,43.7770 bogus 11.2590,43.7768</coordinates>
            </LinearRing>
          </outerBoundaryIs>
        </Polygon>
      </Placemark>
      <Placemark>
        <name>NO GEOMETRY</name>
        <Point><coordinates>11.25,43.77</coordinates></Point>
      </Placemark>
    </Folder>
  </Document>
</kml>"#;

    #[test]
    fn extracts_line_and_polygon_placemarks() {
        let placemarks = parse_placemarks(DOCUMENT).expect("valid document");
        let names: Vec<&str> = placemarks.iter().map(|mark| mark.name.as_str()).collect();

        assert_eq!(names, vec!["VIA DEI SERVI", "PIAZZA SS. ANNUNZIATA"]);
    }

    #[test]
    fn keeps_lon_lat_order_and_drops_bad_tuples() {
        let placemarks = parse_placemarks(DOCUMENT).expect("valid document");

        assert_eq!(
            placemarks.first().map(|mark| mark.coordinates.clone()),
            Some(vec![(11.2570, 43.7745), (11.2578, 43.7752)])
        );
        assert_eq!(placemarks.get(1).map(|mark| mark.coordinates.len()), Some(3));
    }

    #[test]
    fn description_text_is_unescaped() {
        let placemarks = parse_placemarks(DOCUMENT).expect("valid document");

        assert!(
            placemarks
                .first()
                .is_some_and(|mark| mark.description.contains(r#"<span class="atr-value">VIA DEI SERVI</span>"#))
        );
        assert_eq!(
            placemarks.get(1).map(|mark| mark.description.as_str()),
            Some(r#"<span class="atr-name">indirizzo</span>"#)
        );
    }

    #[test]
    fn coordinates_need_two_numbers() {
        assert_eq!(parse_coordinates("11.2 43.7,x 11.2,43.7"), vec![(11.2, 43.7)]);
        assert!(parse_coordinates("   ").is_empty());
    }

    #[test]
    fn unbalanced_document_is_malformed() {
        let result = parse_placemarks("<kml><Placemark><name>VIA ROMA</Placemark></kml>");
        assert!(matches!(result, Err(PortError::MalformedDataset(_))));
    }
}
