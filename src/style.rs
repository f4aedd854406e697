//! Data-driven marker styling.
//!
//! Earthquakes are drawn as circle markers: fill color keyed on depth, radius
//! keyed on magnitude. Field names of [`StyleSpec`] serialize to Leaflet's
//! path options so the browser hands them straight to `L.circleMarker`.

use serde::Serialize;

use crate::models::EarthquakeFeature;

/// Radius used for events that would otherwise not be visible.
pub const MIN_RADIUS: f64 = 1.0;

/// Radius units per magnitude unit.
pub const RADIUS_PER_MAGNITUDE: f64 = 5.0;

const MARKER_OPACITY: f64 = 0.5;
const MARKER_FILL_OPACITY: f64 = 0.5;
const MARKER_STROKE_COLOR: &str = "#000000";
const MARKER_STROKE_WEIGHT: f64 = 0.5;

/// Depth classes, shallowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBand {
    /// depth <= 10 km
    Shallow,
    /// 10 < depth <= 30 km
    Upper,
    /// 30 < depth <= 50 km
    Middle,
    /// 50 < depth <= 70 km
    Lower,
    /// 70 < depth <= 90 km
    Deep,
    /// depth > 90 km
    VeryDeep,
}

impl DepthBand {
    /// All bands in increasing depth order.
    pub const ALL: [Self; 6] = [
        Self::Shallow,
        Self::Upper,
        Self::Middle,
        Self::Lower,
        Self::Deep,
        Self::VeryDeep,
    ];

    /// Classify a depth in kilometers. Thresholds are exclusive, so a
    /// boundary value belongs to the shallower band.
    #[must_use]
    pub fn classify(depth: f64) -> Self {
        match depth {
            d if d > 90.0 => Self::VeryDeep,
            d if d > 70.0 => Self::Deep,
            d if d > 50.0 => Self::Lower,
            d if d > 30.0 => Self::Middle,
            d if d > 10.0 => Self::Upper,
            _ => Self::Shallow,
        }
    }

    /// Fill color token for this band.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::VeryDeep => "red",
            Self::Deep => "#ff4000",
            Self::Lower => "#ff9500",
            Self::Middle => "#ffb300",
            Self::Upper => "#d4ff00",
            Self::Shallow => "green",
        }
    }

    /// Lower bound shown in the legend. The shallow band has no real floor;
    /// the legend starts it at -10 km.
    #[must_use]
    pub const fn legend_floor(self) -> f64 {
        match self {
            Self::Shallow => -10.0,
            Self::Upper => 10.0,
            Self::Middle => 30.0,
            Self::Lower => 50.0,
            Self::Deep => 70.0,
            Self::VeryDeep => 90.0,
        }
    }
}

/// Fill color for an event at `depth` kilometers.
#[must_use]
pub fn depth_color(depth: f64) -> &'static str {
    DepthBand::classify(depth).color()
}

/// Marker radius for a magnitude.
///
/// Anything not strictly positive (zero, negative, NaN) is drawn at
/// [`MIN_RADIUS`] so it stays visible.
#[must_use]
pub fn radius_size(magnitude: f64) -> f64 {
    if magnitude > 0.0 {
        magnitude * RADIUS_PER_MAGNITUDE
    } else {
        MIN_RADIUS
    }
}

/// Path options for one circle marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSpec {
    pub opacity: f64,
    pub fill_opacity: f64,
    pub fill_color: &'static str,
    #[serde(rename = "color")]
    pub stroke_color: &'static str,
    pub radius: f64,
    #[serde(rename = "weight")]
    pub stroke_weight: f64,
    pub stroke: bool,
}

/// Build the marker style for an earthquake.
#[must_use]
pub fn style_for(feature: &EarthquakeFeature) -> StyleSpec {
    StyleSpec {
        opacity: MARKER_OPACITY,
        fill_opacity: MARKER_FILL_OPACITY,
        fill_color: depth_color(feature.depth()),
        stroke_color: MARKER_STROKE_COLOR,
        radius: radius_size(feature.magnitude),
        stroke_weight: MARKER_STROKE_WEIGHT,
        stroke: true,
    }
}

/// Line style for plate boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
}

/// Plate boundaries are thin yellow lines.
pub const PLATE_STYLE: LineStyle = LineStyle {
    color: "yellow",
    weight: 1.0,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, FeatureCollection};

    const COLORS: [&str; 6] = ["red", "#ff4000", "#ff9500", "#ffb300", "#d4ff00", "green"];

    fn quake(magnitude: f64, depth: f64) -> EarthquakeFeature {
        EarthquakeFeature {
            id: "test".into(),
            magnitude,
            magnitude_type: None,
            place: "somewhere".into(),
            coordinates: Coordinates {
                longitude: 0.0,
                latitude: 0.0,
                depth,
            },
            time: None,
            url: None,
        }
    }

    #[test]
    fn test_depth_color_bands() {
        assert_eq!(depth_color(120.0), "red");
        assert_eq!(depth_color(80.0), "#ff4000");
        assert_eq!(depth_color(60.0), "#ff9500");
        assert_eq!(depth_color(40.0), "#ffb300");
        assert_eq!(depth_color(20.0), "#d4ff00");
        assert_eq!(depth_color(5.0), "green");
    }

    #[test]
    fn test_depth_boundaries_fall_in_lower_bucket() {
        assert_eq!(depth_color(90.0), "#ff4000");
        assert_eq!(depth_color(70.0), "#ff9500");
        assert_eq!(depth_color(50.0), "#ffb300");
        assert_eq!(depth_color(30.0), "#d4ff00");
        assert_eq!(depth_color(10.0), "green");
        assert_eq!(depth_color(90.001), "red");
    }

    #[test]
    fn test_depth_color_total() {
        assert_eq!(depth_color(-3.5), "green");
        assert_eq!(depth_color(f64::NAN), "green");
        assert_eq!(depth_color(f64::INFINITY), "red");

        let mut depth = -50.0;
        while depth < 200.0 {
            assert!(COLORS.contains(&depth_color(depth)));
            depth += 0.75;
        }
    }

    #[test]
    fn test_depth_bands_ordered() {
        let mut previous = None;
        let mut depth = -20.0;
        while depth < 150.0 {
            let band = DepthBand::classify(depth);
            let rank = DepthBand::ALL.iter().position(|b| *b == band);
            assert!(rank >= previous, "band went shallower at {depth}");
            previous = rank;
            depth += 0.5;
        }
    }

    #[test]
    fn test_radius_size() {
        assert!((radius_size(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((radius_size(2.0) - 10.0).abs() < f64::EPSILON);
        assert!((radius_size(4.5) - 22.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_radius_clamps_non_positive() {
        assert!((radius_size(-1.0) - MIN_RADIUS).abs() < f64::EPSILON);
        assert!((radius_size(-0.4) - MIN_RADIUS).abs() < f64::EPSILON);
        assert!((radius_size(f64::NAN) - MIN_RADIUS).abs() < f64::EPSILON);
    }

    #[test]
    fn test_style_constants() {
        let style = style_for(&quake(3.0, 20.0));
        assert!((style.opacity - 0.5).abs() < f64::EPSILON);
        assert!((style.fill_opacity - 0.5).abs() < f64::EPSILON);
        assert!((style.stroke_weight - 0.5).abs() < f64::EPSILON);
        assert_eq!(style.stroke_color, "#000000");
        assert!(style.stroke);
        assert_eq!(style.fill_color, "#d4ff00");
        assert!((style.radius - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_style_serializes_leaflet_names() {
        let value = serde_json::to_value(style_for(&quake(1.0, 1.0))).expect("serialize");
        for key in ["opacity", "fillOpacity", "fillColor", "color", "radius", "weight", "stroke"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_zero_magnitude_deep_event_from_feed() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "synthetic",
                "properties": {"mag": 0, "place": "nowhere"},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0, 95.0]}
            }]
        }"#;
        let feed: FeatureCollection = serde_json::from_str(json).expect("parse");
        let (quakes, rejected) = feed.partition();
        assert!(rejected.is_empty());

        let style = style_for(&quakes[0]);
        assert_eq!(style.fill_color, "red");
        assert!((style.radius - 1.0).abs() < f64::EPSILON);
    }
}
