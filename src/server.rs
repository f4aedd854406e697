//! Web server for the map.
//!
//! Serves the Leaflet page plus JSON endpoints for the map configuration,
//! the two data layers and the legend:
//! - Axum for HTTP
//! - `tower-http` request tracing
//! - background tokio task that loads (and optionally refreshes) the layers

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::basemap::{DEFAULT_BASEMAP, LayerRegistry, OverlayKind};
use crate::client::FeedClient;
use crate::errors::QuakeMapError;
use crate::layers::{self, LoadConfig, MapConfig, MapView};
use crate::legend::Legend;
use crate::page;

/// Shortest accepted refresh interval in seconds.
pub const MIN_REFRESH_SECS: u64 = 60;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub load: LoadConfig,
    /// Reload both layers this often; `None` loads once at startup
    pub refresh: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            load: LoadConfig::default(),
            refresh: None,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    map: Arc<MapView>,
}

impl AppState {
    #[must_use]
    pub fn new(map: Arc<MapView>) -> Self {
        Self { map }
    }
}

/// Build the map view with the bundled layer registry.
///
/// # Errors
///
/// Returns an error if the registry or the legend is inconsistent.
pub fn build_map() -> Result<MapView, QuakeMapError> {
    let registry = LayerRegistry::bundled()?;
    if registry.basemap(DEFAULT_BASEMAP).is_none() {
        return Err(QuakeMapError::Validation(format!(
            "default basemap '{DEFAULT_BASEMAP}' is not registered"
        )));
    }
    Ok(MapView::new(registry, Legend::depth()?))
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/map", get(map_handler))
        .route("/api/layers/{kind}", get(layer_handler))
        .route("/api/legend", get(legend_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server.
///
/// The blocking feed client must be created outside the async runtime.
pub async fn run_server(config: ServerConfig, client: FeedClient) -> anyhow::Result<()> {
    let map = Arc::new(build_map()?);

    // Layers fill in the background; the page is usable before they arrive.
    let loader_map = Arc::clone(&map);
    let load = config.load.clone();
    let refresh = config.refresh;
    tokio::spawn(async move {
        load_layers(loader_map, client, load, refresh).await;
    });

    let app = create_router(AppState::new(map));

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("quakemap starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that populates the layer groups.
async fn load_layers(map: Arc<MapView>, client: FeedClient, load: LoadConfig, refresh: Option<u64>) {
    loop {
        layers::populate(&map, &client, &load).await;

        let Some(secs) = refresh else {
            return;
        };
        tokio::time::sleep(Duration::from_secs(secs.max(MIN_REFRESH_SECS))).await;
        tracing::debug!("refreshing layers");
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler.
async fn index_handler() -> Html<String> {
    Html(page::index_html())
}

/// Map view, basemaps, overlays and legend markup.
async fn map_handler(State(state): State<AppState>) -> Json<MapConfig> {
    Json(state.map.config())
}

/// Current content of one overlay as GeoJSON.
async fn layer_handler(
    State(state): State<AppState>,
    Path(kind): Path<OverlayKind>,
) -> Result<Json<Value>, (StatusCode, String)> {
    match kind {
        OverlayKind::Earthquakes => {
            let quakes = state.map.earthquakes.snapshot().await;
            Ok(Json(layers::earthquakes_geojson(&quakes)))
        }
        OverlayKind::Plates => {
            let plates = state.map.plates.snapshot().await;
            layers::plates_geojson(&plates).map(Json).map_err(|e| {
                tracing::error!("failed to serialize plates: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            })
        }
    }
}

/// Legend fragment for the bottom-right control.
async fn legend_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.map.legend.to_html())
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}
