//! Parsing of places-provider POI records into [`RawLocation`]s.
//!
//! Providers disagree on shape. Accepted inputs are a bare array of POIs or an
//! object holding one under `features` or `results`. Each POI is read from
//! its own fields first and then from a nested `properties` object, which
//! covers GeoJSON-style features.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::distance::haversine_km;
use crate::types::{Coordinates, RawLocation};

const DISPLAY_TEXT_KEYS: &[&str] = &["displayText", "display_text", "name", "place_name", "text"];
const ADDRESS_KEYS: &[&str] = &["address", "full_address"];

/// Locations parsed from one provider response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedPlaces {
    pub locations: Vec<RawLocation>,
    /// Entries dropped for missing or unusable display text or coordinates.
    pub skipped: usize,
}

/// Parse a provider response. With an `origin`, every location's
/// `distance_km` is set to its great-circle distance from it.
#[must_use]
pub fn parse_places(value: &Value, origin: Option<Coordinates>) -> ParsedPlaces {
    let entries: &[Value] = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match obj.get("features").or_else(|| obj.get("results")) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => {
                tracing::debug!("places response has no features or results array");
                &[]
            }
        },
        _ => &[],
    };

    let origin = origin.filter(Coordinates::is_valid);
    let mut parsed = ParsedPlaces::default();
    for (index, entry) in entries.iter().enumerate() {
        match parse_entry(entry, origin) {
            Some(location) => parsed.locations.push(location),
            None => {
                tracing::debug!(index, "skipping place without display text or coordinates");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

fn parse_entry(entry: &Value, origin: Option<Coordinates>) -> Option<RawLocation> {
    let obj = entry.as_object()?;
    let properties = obj.get("properties").and_then(Value::as_object);

    let display_text = text_field(obj, properties, DISPLAY_TEXT_KEYS)?;
    let address = text_field(obj, properties, ADDRESS_KEYS).unwrap_or_default();
    let coordinates = coordinates_of(obj).filter(Coordinates::is_valid)?;

    let id = id_field(obj, properties)
        .unwrap_or_else(|| make_place_id(&display_text, &address, coordinates));
    let distance_km = origin.map(|o| haversine_km(o, coordinates));

    Some(RawLocation {
        id,
        display_text,
        address,
        coordinates,
        distance_km,
    })
}

/// Stable id for a POI the provider did not identify.
#[must_use]
pub fn make_place_id(display_text: &str, address: &str, coordinates: Coordinates) -> String {
    let input = format!(
        "{}\x00{}\x00{:.6}\x00{:.6}",
        display_text.trim().to_lowercase(),
        address.trim().to_lowercase(),
        coordinates.lon,
        coordinates.lat,
    );
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

fn lookup<'a>(
    obj: &'a Map<String, Value>,
    properties: Option<&'a Map<String, Value>>,
    key: &str,
) -> Option<&'a Value> {
    obj.get(key).or_else(|| properties.and_then(|p| p.get(key)))
}

fn text_field(
    obj: &Map<String, Value>,
    properties: Option<&Map<String, Value>>,
    keys: &[&str],
) -> Option<String> {
    keys.iter()
        .filter_map(|k| lookup(obj, properties, k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn id_field(obj: &Map<String, Value>, properties: Option<&Map<String, Value>>) -> Option<String> {
    match lookup(obj, properties, "id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coordinates_of(obj: &Map<String, Value>) -> Option<Coordinates> {
    let pair = obj
        .get("coordinates")
        .or_else(|| obj.get("center"))
        .or_else(|| obj.get("geometry").and_then(|g| g.get("coordinates")));
    if let Some(pair) = pair.and_then(lon_lat_pair) {
        return Some(pair);
    }

    let lat = obj.get("lat").and_then(Value::as_f64)?;
    let lon = obj
        .get("lon")
        .or_else(|| obj.get("lng"))
        .and_then(Value::as_f64)?;
    Some(Coordinates::new(lon, lat))
}

fn lon_lat_pair(value: &Value) -> Option<Coordinates> {
    match value {
        Value::Array(items) if items.len() >= 2 => {
            Some(Coordinates::new(items[0].as_f64()?, items[1].as_f64()?))
        }
        Value::Object(obj) => {
            let lat = obj.get("lat").and_then(Value::as_f64)?;
            let lon = obj
                .get("lon")
                .or_else(|| obj.get("lng"))
                .and_then(Value::as_f64)?;
            Some(Coordinates::new(lon, lat))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_bare_array_with_mixed_spellings() {
        let body = json!([
            {"id": "a", "displayText": "Western Union", "address": "1 Main St", "coordinates": [121.0, 14.6]},
            {"id": 7, "name": "MoneyGram", "lng": 121.01, "lat": 14.61},
            {"place_name": "Remitly kiosk", "center": [121.02, 14.62]}
        ]);
        let parsed = parse_places(&body, None);
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.locations.len(), 3);
        assert_eq!(parsed.locations[0].address, "1 Main St");
        assert_eq!(parsed.locations[1].id, "7");
        assert_eq!(parsed.locations[1].coordinates, Coordinates::new(121.01, 14.61));
        assert_eq!(parsed.locations[2].address, "");
        assert!(parsed.locations.iter().all(|l| l.distance_km.is_none()));
    }

    #[test]
    fn parses_geojson_features() {
        let body = json!({"type": "FeatureCollection", "features": [{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-118.24, 34.05]},
            "properties": {"id": "poi-1", "name": "Ria Money Transfer", "full_address": "LA"}
        }]});
        let parsed = parse_places(&body, None);
        assert_eq!(parsed.locations.len(), 1);
        assert_eq!(parsed.locations[0].id, "poi-1");
        assert_eq!(parsed.locations[0].display_text, "Ria Money Transfer");
        assert_eq!(parsed.locations[0].address, "LA");
    }

    #[test]
    fn parses_results_object() {
        let body = json!({"results": [{"id": "x", "text": "Xoom", "lon": 1.0, "lat": 2.0}]});
        assert_eq!(parse_places(&body, None).locations.len(), 1);
    }

    #[test]
    fn entries_without_coordinates_or_text_are_skipped() {
        let body = json!([
            {"id": "no-coords", "name": "Western Union"},
            {"id": "no-text", "coordinates": [1.0, 2.0]},
            {"id": "blank-text", "name": "  ", "coordinates": [1.0, 2.0]},
            {"id": "out-of-range", "name": "Ria", "coordinates": [500.0, 2.0]},
            "not an object",
            {"id": "ok", "name": "Ria", "coordinates": [1.0, 2.0]}
        ]);
        let parsed = parse_places(&body, None);
        assert_eq!(parsed.skipped, 5);
        assert_eq!(parsed.locations.len(), 1);
        assert_eq!(parsed.locations[0].id, "ok");
    }

    #[test]
    fn missing_id_gets_stable_hash() {
        let body = json!([{"name": "Remitly", "address": "Main St", "coordinates": [1.0, 2.0]}]);
        let first = parse_places(&body, None);
        let second = parse_places(&body, None);
        assert_eq!(first.locations[0].id, second.locations[0].id);
        assert_eq!(first.locations[0].id.len(), 64);
    }

    #[test]
    fn place_id_ignores_case_and_padding() {
        let at = Coordinates::new(1.0, 2.0);
        assert_eq!(
            make_place_id("  Remitly ", "MAIN ST", at),
            make_place_id("remitly", "main st", at)
        );
        assert_ne!(
            make_place_id("remitly", "main st", at),
            make_place_id("remitly", "main st", Coordinates::new(1.0, 2.5))
        );
    }

    #[test]
    fn origin_sets_distances() {
        let body = json!([
            {"id": "here", "name": "Ria", "coordinates": [121.0, 14.6]},
            {"id": "there", "name": "Ria", "coordinates": [121.1, 14.6]}
        ]);
        let parsed = parse_places(&body, Some(Coordinates::new(121.0, 14.6)));
        let here = parsed.locations[0].distance_km.unwrap();
        let there = parsed.locations[1].distance_km.unwrap();
        assert!(here.abs() < 1e-9);
        assert!(there > 10.0 && there < 11.0, "got {there}");
    }

    #[test]
    fn non_collection_input_is_empty() {
        assert_eq!(parse_places(&json!("nope"), None), ParsedPlaces::default());
        assert_eq!(parse_places(&json!({"data": []}), None), ParsedPlaces::default());
    }
}
