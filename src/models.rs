//! Data models for the two remote GeoJSON feeds.
//!
//! The USGS earthquake feed is read into raw serde structures and then
//! validated into [`EarthquakeFeature`] records. Plate boundaries are kept as a
//! plain [`geojson::FeatureCollection`] wrapped in [`PlateBoundaries`].

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::QuakeMapError;

/// Fallback text for events the feed does not locate.
pub const UNKNOWN_PLACE: &str = "Unknown location";

/// Top-level GeoJSON response from USGS summary feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata (absent in hand-built collections)
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Earthquake events, left untyped so a single bad record cannot fail
    /// the whole document
    pub features: Vec<Value>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakeMapError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakeMapError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }

    /// Validate every feature, returning the good ones and the rejection
    /// errors for the rest.
    #[must_use]
    pub fn partition(&self) -> (Vec<EarthquakeFeature>, Vec<QuakeMapError>) {
        let mut quakes = Vec::with_capacity(self.features.len());
        let mut rejected = Vec::new();
        for raw in &self.features {
            match Feature::from_value(raw).and_then(|f| EarthquakeFeature::try_from(&f)) {
                Ok(quake) => quakes.push(quake),
                Err(e) => rejected.push(e),
            }
        }
        (quakes, rejected)
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// When this feed was generated (ms since epoch)
    pub generated: i64,

    /// Human-readable title
    pub title: String,

    /// Number of events in response
    pub count: usize,
}

/// A single raw earthquake record as published by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Always "Feature"
    #[serde(rename = "type")]
    pub type_: String,

    /// Unique event ID
    #[serde(default)]
    pub id: String,

    /// Geographic location
    #[serde(default)]
    pub geometry: Option<Geometry>,

    /// Event properties
    #[serde(default)]
    pub properties: Properties,
}

impl Feature {
    /// Read one record of a feed's `features` array.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the event if the record does not
    /// have the shape of a feed feature.
    pub fn from_value(raw: &Value) -> Result<Self, QuakeMapError> {
        Self::deserialize(raw).map_err(|e| {
            let id = raw.get("id").and_then(Value::as_str).unwrap_or("<no id>");
            QuakeMapError::Validation(format!("event {id}: {e}"))
        })
    }
}

/// Point geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Always "Point"
    #[serde(rename = "type")]
    pub type_: String,

    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties used by the map. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Properties {
    /// Magnitude value
    pub mag: Option<f64>,

    /// Magnitude type (mb, ml, mw, ...)
    #[serde(rename = "magType")]
    pub mag_type: Option<String>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: Option<i64>,

    /// Event page URL
    pub url: Option<String>,
}

/// Longitude, latitude and depth of an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
    /// Kilometers, positive down. Negative for events above the reference
    /// elevation.
    pub depth: f64,
}

/// A validated earthquake ready for styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarthquakeFeature {
    pub id: String,
    pub magnitude: f64,
    pub magnitude_type: Option<String>,
    pub place: String,
    pub coordinates: Coordinates,
    pub time: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl EarthquakeFeature {
    /// Depth in kilometers.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.coordinates.depth
    }
}

impl TryFrom<&Feature> for EarthquakeFeature {
    type Error = QuakeMapError;

    fn try_from(f: &Feature) -> Result<Self, Self::Error> {
        if f.id.is_empty() {
            return Err(QuakeMapError::Validation("empty event ID".into()));
        }
        let Some(geometry) = &f.geometry else {
            return Err(QuakeMapError::Validation(format!(
                "event {}: missing geometry",
                f.id
            )));
        };
        if f.type_ != "Feature" || geometry.type_ != "Point" {
            return Err(QuakeMapError::Validation(format!(
                "event {}: expected a Point feature, got {} with {} geometry",
                f.id, f.type_, geometry.type_
            )));
        }
        let &[longitude, latitude, depth] = geometry.coordinates.as_slice() else {
            return Err(QuakeMapError::Validation(format!(
                "event {}: expected 3 coordinates, got {}",
                f.id,
                geometry.coordinates.len()
            )));
        };
        let Some(magnitude) = f.properties.mag else {
            return Err(QuakeMapError::Validation(format!(
                "event {}: missing magnitude",
                f.id
            )));
        };

        Ok(Self {
            id: f.id.clone(),
            magnitude,
            magnitude_type: f.properties.mag_type.clone(),
            place: f
                .properties
                .place
                .clone()
                .unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
            coordinates: Coordinates {
                longitude,
                latitude,
                depth,
            },
            time: f
                .properties
                .time
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            url: f.properties.url.clone(),
        })
    }
}

/// Tectonic plate boundary lines and polygons.
#[derive(Debug, Clone)]
pub struct PlateBoundaries {
    pub collection: geojson::FeatureCollection,
}

impl Default for PlateBoundaries {
    fn default() -> Self {
        Self {
            collection: geojson::FeatureCollection {
                bbox: None,
                features: Vec::new(),
                foreign_members: None,
            },
        }
    }
}

impl PlateBoundaries {
    /// Parse and validate a boundaries document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a GeoJSON `FeatureCollection` or
    /// contains a feature that is not a line or polygon.
    pub fn from_json(json: &str) -> Result<Self, QuakeMapError> {
        let collection: geojson::FeatureCollection = serde_json::from_str(json)?;
        let plates = Self { collection };
        plates.validate()?;
        Ok(plates)
    }

    /// Check that every feature carries line or polygon geometry.
    pub fn validate(&self) -> Result<(), QuakeMapError> {
        for (i, feature) in self.collection.features.iter().enumerate() {
            let Some(geometry) = &feature.geometry else {
                return Err(QuakeMapError::Validation(format!(
                    "plate feature {i} has no geometry"
                )));
            };
            match geometry.value {
                geojson::Value::LineString(_)
                | geojson::Value::MultiLineString(_)
                | geojson::Value::Polygon(_)
                | geojson::Value::MultiPolygon(_) => {}
                geojson::Value::Point(_) | geojson::Value::MultiPoint(_) => {
                    return Err(QuakeMapError::Validation(format!(
                        "plate feature {i} has point geometry"
                    )));
                }
                geojson::Value::GeometryCollection(_) => {
                    return Err(QuakeMapError::Validation(format!(
                        "plate feature {i} is a geometry collection"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of boundary features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_feed() {
        let json = include_str!("../tools/sample_all_week.json");
        let feed: FeatureCollection =
            serde_json::from_str(json).expect("failed to parse sample feed");

        feed.validate().expect("invalid feed");
        assert_eq!(feed.type_, "FeatureCollection");
        assert_eq!(feed.features.len(), 6);

        let (quakes, rejected) = feed.partition();
        assert_eq!(quakes.len(), 4);
        assert_eq!(rejected.len(), 2);
        assert!(
            rejected
                .iter()
                .all(|e| matches!(e, QuakeMapError::Validation(_)))
        );
    }

    #[test]
    fn test_validated_fields() {
        let json = include_str!("../tools/sample_all_week.json");
        let feed: FeatureCollection = serde_json::from_str(json).expect("parse");
        let raw = Feature::from_value(&feed.features[0]).expect("feature");
        let quake = EarthquakeFeature::try_from(&raw).expect("valid");

        assert_eq!(quake.id, "ci40000001");
        assert!((quake.magnitude - 4.5).abs() < f64::EPSILON);
        assert!((quake.depth() - 12.3).abs() < f64::EPSILON);
        assert_eq!(quake.place, "10km NW of Ridgecrest, CA");
        assert!(quake.time.is_some());
    }

    #[test]
    fn test_missing_place_defaults() {
        let json = r#"{
            "type": "Feature",
            "id": "x1",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0, -0.5]},
            "properties": {"mag": 1.1}
        }"#;
        let raw: Feature = serde_json::from_str(json).expect("parse");
        let quake = EarthquakeFeature::try_from(&raw).expect("valid");
        assert_eq!(quake.place, UNKNOWN_PLACE);
        assert!(quake.depth() < 0.0);
    }

    #[test]
    fn test_rejects_short_coordinates() {
        let json = r#"{
            "type": "Feature",
            "id": "x2",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": {"mag": 1.1}
        }"#;
        let raw: Feature = serde_json::from_str(json).expect("parse");
        assert!(EarthquakeFeature::try_from(&raw).is_err());
    }

    #[test]
    fn test_malformed_records_do_not_sink_feed() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": "good", "properties": {"mag": 2.0},
                 "geometry": {"type": "Point", "coordinates": [1.0, 2.0, 3.0]}},
                {"type": "Feature", "id": "no-geometry", "properties": {"mag": 2.0},
                 "geometry": null},
                {"type": "Feature", "id": "null-coord", "properties": {"mag": 2.0},
                 "geometry": {"type": "Point", "coordinates": [1.0, null, 3.0]}},
                {"type": "Feature", "id": "text-coord", "properties": {"mag": 2.0},
                 "geometry": {"type": "Point", "coordinates": ["1", 2.0, 3.0]}},
                {"type": "Feature", "id": "no-properties", "properties": null,
                 "geometry": {"type": "Point", "coordinates": [1.0, 2.0, 3.0]}}
            ]
        }"#;
        let feed: FeatureCollection = serde_json::from_str(json).expect("document parses");
        let (quakes, rejected) = feed.partition();

        assert_eq!(quakes.len(), 1);
        assert_eq!(quakes[0].id, "good");
        assert_eq!(rejected.len(), 4);
        let messages: Vec<String> = rejected.iter().map(ToString::to_string).collect();
        assert!(messages[0].contains("missing geometry"));
        assert!(messages[1].contains("null-coord"));
        assert!(messages[3].contains("no-properties"));
    }

    #[test]
    fn test_wrong_collection_type() {
        let json = r#"{"type": "Feature", "features": []}"#;
        let feed: FeatureCollection = serde_json::from_str(json).expect("parse");
        assert!(feed.validate().is_err());
    }

    #[test]
    fn test_parse_sample_plates() {
        let json = include_str!("../tools/sample_plates.json");
        let plates = PlateBoundaries::from_json(json).expect("valid plates");
        assert_eq!(plates.len(), 2);
    }

    #[test]
    fn test_plates_reject_points() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
            }]
        }"#;
        let err = PlateBoundaries::from_json(json).expect_err("points rejected");
        assert!(matches!(err, QuakeMapError::Validation(_)));
    }
}
