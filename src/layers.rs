//! Layer groups and the map view that owns them.
//!
//! The map view is built once at startup and shared by `Arc`. Each data
//! layer sits behind its own lock, so the two loaders never contend with each
//! other and readers always see either the old or the new content.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::basemap::{BasemapConfig, DEFAULT_BASEMAP, LayerRegistry, OverlayConfig};
use crate::client::{FeedClient, FeedType, PLATES_URL};
use crate::errors::QuakeMapError;
use crate::filters::EventFilter;
use crate::legend::Legend;
use crate::models::{EarthquakeFeature, FeatureCollection, PlateBoundaries};
use crate::popup::popup_text;
use crate::style::{PLATE_STYLE, StyleSpec, style_for};

/// Initial view: centered on California.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 36.7783,
    lng: -119.4179,
};

/// Initial zoom level.
pub const DEFAULT_ZOOM: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A named, replaceable collection of renderable features.
#[derive(Debug)]
pub struct LayerGroup<T> {
    name: &'static str,
    content: RwLock<T>,
}

impl<T: Clone + Default> LayerGroup<T> {
    /// Create an empty group.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            content: RwLock::new(T::default()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Swap in new content.
    pub async fn replace(&self, content: T) {
        *self.content.write().await = content;
    }

    /// Copy of the current content.
    pub async fn snapshot(&self) -> T {
        self.content.read().await.clone()
    }
}

/// An earthquake with its marker style and popup already computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledQuake {
    pub feature: EarthquakeFeature,
    pub style: StyleSpec,
    pub popup: String,
}

impl From<EarthquakeFeature> for StyledQuake {
    fn from(feature: EarthquakeFeature) -> Self {
        Self {
            style: style_for(&feature),
            popup: popup_text(&feature),
            feature,
        }
    }
}

/// Validate, filter and style every event in a feed. Records that fail
/// validation are logged and skipped.
#[must_use]
pub fn build_earthquake_layer(feed: &FeatureCollection, filter: &EventFilter) -> Vec<StyledQuake> {
    let (quakes, rejected) = feed.partition();
    for err in &rejected {
        debug!("skipping feature: {}", err);
    }
    if !rejected.is_empty() {
        warn!("skipped {} malformed earthquake records", rejected.len());
    }

    quakes
        .into_iter()
        .filter(|q| filter.matches(q))
        .map(StyledQuake::from)
        .collect()
}

/// Styled earthquakes as a GeoJSON `FeatureCollection`. Each feature's
/// properties carry its `style` and `popup`.
#[must_use]
pub fn earthquakes_geojson(quakes: &[StyledQuake]) -> Value {
    let features: Vec<Value> = quakes
        .iter()
        .map(|q| {
            let f = &q.feature;
            json!({
                "type": "Feature",
                "id": f.id,
                "geometry": {
                    "type": "Point",
                    "coordinates": [f.coordinates.longitude, f.coordinates.latitude, f.coordinates.depth],
                },
                "properties": {
                    "mag": f.magnitude,
                    "depth": f.depth(),
                    "place": f.place,
                    "time": f.time.map(|t| t.to_rfc3339()),
                    "url": f.url,
                    "style": q.style,
                    "popup": q.popup,
                },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Plate boundaries as GeoJSON with the line style attached to each feature.
///
/// # Errors
///
/// Returns an error if the collection cannot be serialized.
pub fn plates_geojson(plates: &PlateBoundaries) -> Result<Value, QuakeMapError> {
    let style = serde_json::to_value(PLATE_STYLE)?;
    let mut collection = plates.collection.clone();
    for feature in &mut collection.features {
        feature
            .properties
            .get_or_insert_with(serde_json::Map::new)
            .insert("style".to_string(), style.clone());
    }
    Ok(serde_json::to_value(&collection)?)
}

/// What the browser needs to build the map and its layer control.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub center: LatLng,
    pub zoom: u8,
    pub default_basemap: &'static str,
    pub basemaps: Vec<BasemapConfig>,
    pub overlays: Vec<OverlayConfig>,
    pub legend: String,
}

/// The map instance: view settings, layer registry and the two data layers.
#[derive(Debug)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub registry: LayerRegistry,
    pub legend: Legend,
    pub earthquakes: LayerGroup<Vec<StyledQuake>>,
    pub plates: LayerGroup<PlateBoundaries>,
}

impl MapView {
    /// Map with the default view and empty data layers.
    #[must_use]
    pub fn new(registry: LayerRegistry, legend: Legend) -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            registry,
            legend,
            earthquakes: LayerGroup::new("Earthquake Data"),
            plates: LayerGroup::new("Tectonic Plates"),
        }
    }

    #[must_use]
    pub fn config(&self) -> MapConfig {
        MapConfig {
            center: self.center,
            zoom: self.zoom,
            default_basemap: DEFAULT_BASEMAP,
            basemaps: self.registry.basemaps().to_vec(),
            overlays: self.registry.overlays().to_vec(),
            legend: self.legend.to_html(),
        }
    }
}

/// Where the data layers come from and which events to keep.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub feed: FeedType,
    pub plates_url: String,
    pub filter: EventFilter,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            feed: FeedType::default(),
            plates_url: PLATES_URL.to_string(),
            filter: EventFilter::default(),
        }
    }
}

/// Fetch both datasets concurrently and fill the map's layer groups.
///
/// Each fetch replaces its own group as soon as it completes. A failed fetch
/// is logged and leaves that group untouched.
pub async fn populate(map: &Arc<MapView>, client: &FeedClient, config: &LoadConfig) {
    tokio::join!(
        load_earthquakes(map, client, config),
        load_plates(map, client, config)
    );
}

async fn load_earthquakes(map: &Arc<MapView>, client: &FeedClient, config: &LoadConfig) {
    let fetch_client = client.clone();
    let feed_type = config.feed;
    let fetched =
        tokio::task::spawn_blocking(move || fetch_client.fetch_earthquakes(feed_type)).await;

    match fetched {
        Ok(Ok(feed)) => {
            let quakes = build_earthquake_layer(&feed, &config.filter);
            info!(
                "{}: loaded {} earthquakes from {} feed",
                map.earthquakes.name(),
                quakes.len(),
                feed_type
            );
            map.earthquakes.replace(quakes).await;
        }
        Ok(Err(e)) => warn!("earthquake feed unavailable: {}", e),
        Err(e) => warn!("earthquake loader failed: {}", e),
    }
}

async fn load_plates(map: &Arc<MapView>, client: &FeedClient, config: &LoadConfig) {
    let fetch_client = client.clone();
    let url = config.plates_url.clone();
    let fetched = tokio::task::spawn_blocking(move || fetch_client.fetch_plates(&url)).await;

    match fetched {
        Ok(Ok(plates)) => {
            info!("{}: loaded {} boundaries", map.plates.name(), plates.len());
            map.plates.replace(plates).await;
        }
        Ok(Err(e)) => warn!("plate boundaries unavailable: {}", e),
        Err(e) => warn!("plate loader failed: {}", e),
    }
}
