//! Basemap and overlay registry.
//!
//! Basemaps are mutually exclusive background tile layers; overlays are
//! toggled independently on top of them. Display labels are unique across
//! both lists because the browser's layer control keys on them.

use serde::{Deserialize, Serialize};

use crate::errors::QuakeMapError;

const OSM_ATTRIBUTION: &str = r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;

const STAMEN_ATTRIBUTION: &str = r#"Map tiles by <a href="http://stamen.com">Stamen Design</a>, <a href="http://creativecommons.org/licenses/by/3.0">CC BY 3.0</a> &mdash; Map data &copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;

const TOPO_ATTRIBUTION: &str = r#"Map data: &copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors, <a href="http://viewfinderpanoramas.org">SRTM</a> | Map style: &copy; <a href="https://opentopomap.org">OpenTopoMap</a> (<a href="https://creativecommons.org/licenses/by-sa/3.0/">CC-BY-SA</a>)"#;

/// Label of the basemap selected on load.
pub const DEFAULT_BASEMAP: &str = "Default";

/// Tile layer configuration, serialized in the shape `L.tileLayer` expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasemapConfig {
    pub name: &'static str,
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` and optionally `{r}` and
    /// `{ext}` placeholders
    pub url: &'static str,
    pub attribution: &'static str,
    pub min_zoom: u8,
    pub max_zoom: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<&'static str>,
}

/// The four bundled basemaps.
pub const BASEMAPS: [BasemapConfig; 4] = [
    BasemapConfig {
        name: "GrayScale",
        url: "https://stamen-tiles-{s}.a.ssl.fastly.net/toner-lite/{z}/{x}/{y}{r}.{ext}",
        attribution: STAMEN_ATTRIBUTION,
        min_zoom: 0,
        max_zoom: 20,
        subdomains: Some("abcd"),
        ext: Some("png"),
    },
    BasemapConfig {
        name: "Water Color",
        url: "https://stamen-tiles-{s}.a.ssl.fastly.net/watercolor/{z}/{x}/{y}.{ext}",
        attribution: STAMEN_ATTRIBUTION,
        min_zoom: 1,
        max_zoom: 16,
        subdomains: Some("abcd"),
        ext: Some("jpg"),
    },
    BasemapConfig {
        name: "Topography",
        url: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        attribution: TOPO_ATTRIBUTION,
        min_zoom: 0,
        max_zoom: 17,
        subdomains: None,
        ext: None,
    },
    BasemapConfig {
        name: DEFAULT_BASEMAP,
        url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: OSM_ATTRIBUTION,
        min_zoom: 0,
        max_zoom: 19,
        subdomains: None,
        ext: None,
    },
];

/// Data layers that can be drawn over a basemap.
///
/// The lowercase name doubles as the `/api/layers/{kind}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Plates,
    Earthquakes,
}

/// An independently toggleable overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayConfig {
    pub name: &'static str,
    pub kind: OverlayKind,
    /// Shown on load
    pub visible: bool,
}

/// The two bundled overlays.
pub const OVERLAYS: [OverlayConfig; 2] = [
    OverlayConfig {
        name: "Tectonic Plates",
        kind: OverlayKind::Plates,
        visible: true,
    },
    OverlayConfig {
        name: "Earthquake Data",
        kind: OverlayKind::Earthquakes,
        visible: true,
    },
];

/// Named basemaps and overlays offered by the layer control.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerRegistry {
    basemaps: Vec<BasemapConfig>,
    overlays: Vec<OverlayConfig>,
}

impl LayerRegistry {
    /// Registry with the bundled basemaps and overlays.
    ///
    /// # Errors
    ///
    /// Returns an error if two bundled entries share a label.
    pub fn bundled() -> Result<Self, QuakeMapError> {
        let mut registry = Self::default();
        for basemap in BASEMAPS {
            registry.add_basemap(basemap)?;
        }
        for overlay in OVERLAYS {
            registry.add_overlay(overlay)?;
        }
        Ok(registry)
    }

    /// Register a basemap.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the label is already taken.
    pub fn add_basemap(&mut self, basemap: BasemapConfig) -> Result<(), QuakeMapError> {
        self.check_unique(basemap.name)?;
        self.basemaps.push(basemap);
        Ok(())
    }

    /// Register an overlay.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the label is already taken.
    pub fn add_overlay(&mut self, overlay: OverlayConfig) -> Result<(), QuakeMapError> {
        self.check_unique(overlay.name)?;
        self.overlays.push(overlay);
        Ok(())
    }

    fn check_unique(&self, name: &str) -> Result<(), QuakeMapError> {
        let taken = self.basemaps.iter().any(|b| b.name == name)
            || self.overlays.iter().any(|o| o.name == name);
        if taken {
            return Err(QuakeMapError::Validation(format!(
                "layer label '{name}' is already registered"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn basemaps(&self) -> &[BasemapConfig] {
        &self.basemaps
    }

    #[must_use]
    pub fn overlays(&self) -> &[OverlayConfig] {
        &self.overlays
    }

    /// Look up a basemap by label.
    #[must_use]
    pub fn basemap(&self, name: &str) -> Option<&BasemapConfig> {
        self.basemaps.iter().find(|b| b.name == name)
    }
}
