//! Event filtering applied before earthquakes enter the map.

use crate::models::EarthquakeFeature;

/// Bounding box for geographic filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl std::str::FromStr for BBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vals = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid number in bbox: {e}"))?;

        let &[min_lat, min_lon, max_lat, max_lon] = vals.as_slice() else {
            return Err(format!(
                "bbox requires 4 values (minlat,minlon,maxlat,maxlon), got {}",
                vals.len()
            ));
        };

        for lat in [min_lat, max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude {lat} out of range [-90, 90]"));
            }
        }
        for lon in [min_lon, max_lon] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("longitude {lon} out of range [-180, 180]"));
            }
        }
        if min_lat > max_lat {
            return Err(format!("min_lat {min_lat} must be <= max_lat {max_lat}"));
        }
        // Boxes spanning the antimeridian are not supported.
        if min_lon > max_lon {
            return Err(format!("min_lon {min_lon} must be <= max_lon {max_lon}"));
        }

        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }
}

impl BBox {
    /// Check if a point is within the bounding box.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Combined filter criteria. The default passes everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventFilter {
    pub min_magnitude: Option<f64>,
    pub max_depth: Option<f64>,
    pub bbox: Option<BBox>,
}

impl EventFilter {
    /// Check if an event passes all filter criteria.
    #[must_use]
    pub fn matches(&self, event: &EarthquakeFeature) -> bool {
        if self.min_magnitude.is_some_and(|min| event.magnitude < min) {
            return false;
        }
        if self.max_depth.is_some_and(|max| event.depth() > max) {
            return false;
        }
        if let Some(bbox) = &self.bbox {
            let c = &event.coordinates;
            if !bbox.contains(c.latitude, c.longitude) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn event(magnitude: f64, depth: f64, lat: f64, lon: f64) -> EarthquakeFeature {
        EarthquakeFeature {
            id: "test".into(),
            magnitude,
            magnitude_type: None,
            place: "Test".into(),
            coordinates: Coordinates {
                longitude: lon,
                latitude: lat,
                depth,
            },
            time: None,
            url: None,
        }
    }

    #[test]
    fn test_bbox_parse() {
        let bbox: BBox = "32,-125,42,-114".parse().expect("valid bbox");
        assert!((bbox.min_lat - 32.0).abs() < f64::EPSILON);
        assert!((bbox.max_lon - -114.0).abs() < f64::EPSILON);
        assert!(bbox.contains(36.7783, -119.4179));
        assert!(!bbox.contains(19.4, -155.2));
    }

    #[test]
    fn test_bbox_parse_errors() {
        assert!("1,2,3".parse::<BBox>().is_err());
        assert!("a,b,c,d".parse::<BBox>().is_err());
        assert!("-91,0,10,10".parse::<BBox>().is_err());
        assert!("0,-181,10,10".parse::<BBox>().is_err());
        assert!("20,0,10,10".parse::<BBox>().is_err());
        assert!("0,10,10,-10".parse::<BBox>().is_err());
    }

    #[test]
    fn test_default_filter_passes_everything() {
        let filter = EventFilter::default();
        assert!(filter.matches(&event(-0.5, -2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_magnitude_and_depth() {
        let filter = EventFilter {
            min_magnitude: Some(2.5),
            max_depth: Some(70.0),
            bbox: None,
        };
        assert!(filter.matches(&event(3.0, 70.0, 0.0, 0.0)));
        assert!(!filter.matches(&event(2.4, 10.0, 0.0, 0.0)));
        assert!(!filter.matches(&event(5.0, 71.0, 0.0, 0.0)));
    }

    #[test]
    fn test_bbox_filter() {
        let filter = EventFilter {
            bbox: Some("32,-125,42,-114".parse().expect("valid")),
            ..Default::default()
        };
        assert!(filter.matches(&event(1.0, 5.0, 35.7, -117.7)));
        assert!(!filter.matches(&event(1.0, 5.0, 42.5, 143.1)));
    }
}
