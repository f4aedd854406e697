//! The Leaflet page.
//!
//! One template serves both modes: when served live the page pulls its
//! configuration and layers from the `/api` routes; when exported the same
//! data is embedded in the file so it works offline from the data feeds.

use serde::Serialize;
use serde_json::Value;

use crate::errors::QuakeMapError;
use crate::layers::MapConfig;

const BOOTSTRAP_MARKER: &str = "/*__QUAKEMAP_BOOTSTRAP__*/null";

/// Data embedded in an exported page.
#[derive(Debug, Serialize)]
struct Bootstrap<'a> {
    config: &'a MapConfig,
    layers: EmbeddedLayers<'a>,
}

#[derive(Debug, Serialize)]
struct EmbeddedLayers<'a> {
    earthquakes: &'a Value,
    plates: &'a Value,
}

/// Page that loads everything from the live API.
#[must_use]
pub fn index_html() -> String {
    PAGE_TEMPLATE.replace(BOOTSTRAP_MARKER, "null")
}

/// Self-contained page with configuration and both layers inlined.
///
/// # Errors
///
/// Returns an error if the embedded data cannot be serialized.
pub fn standalone_html(
    config: &MapConfig,
    earthquakes: &Value,
    plates: &Value,
) -> Result<String, QuakeMapError> {
    let bootstrap = Bootstrap {
        config,
        layers: EmbeddedLayers {
            earthquakes,
            plates,
        },
    };
    let json = serde_json::to_string(&bootstrap)?;
    Ok(PAGE_TEMPLATE.replace(BOOTSTRAP_MARKER, &script_safe(&json)))
}

/// Keep embedded JSON from closing the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>quakemap: Earthquakes and Tectonic Plates</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        html, body { height: 100%; margin: 0; padding: 0; }
        #map { height: 100%; width: 100%; }
        .info.legend {
            background: rgba(255, 255, 255, 0.9);
            padding: 6px 10px;
            border-radius: 4px;
            box-shadow: 0 1px 4px rgba(0, 0, 0, 0.3);
            font: 12px/18px 'Helvetica Neue', Arial, sans-serif;
        }
        .info.legend i {
            width: 18px;
            height: 18px;
            float: left;
            margin-right: 8px;
            opacity: 0.8;
        }
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
    (function () {
        var BOOTSTRAP = /*__QUAKEMAP_BOOTSTRAP__*/null;

        function load(url) {
            return fetch(url).then(function (r) {
                if (!r.ok) { throw new Error(url + ': HTTP ' + r.status); }
                return r.json();
            });
        }

        function layerData(kind) {
            if (BOOTSTRAP) { return Promise.resolve(BOOTSTRAP.layers[kind]); }
            return load('/api/layers/' + kind);
        }

        var drawers = {
            earthquakes: function (data, group) {
                L.geoJson(data, {
                    pointToLayer: function (feature, latlng) {
                        return L.circleMarker(latlng, feature.properties.style);
                    },
                    onEachFeature: function (feature, layer) {
                        layer.bindPopup(feature.properties.popup);
                    }
                }).addTo(group);
            },
            plates: function (data, group) {
                L.geoJson(data, {
                    style: function (feature) { return feature.properties.style; }
                }).addTo(group);
            }
        };

        function build(config) {
            var map = L.map('map', {
                center: [config.center.lat, config.center.lng],
                zoom: config.zoom
            });

            var basemaps = {};
            config.basemaps.forEach(function (b) {
                var options = { attribution: b.attribution, minZoom: b.minZoom, maxZoom: b.maxZoom };
                if (b.subdomains) { options.subdomains = b.subdomains; }
                if (b.ext) { options.ext = b.ext; }
                basemaps[b.name] = L.tileLayer(b.url, options);
            });
            basemaps[config.defaultBasemap].addTo(map);

            var overlays = {};
            config.overlays.forEach(function (o) {
                var group = L.layerGroup();
                overlays[o.name] = group;
                if (o.visible) { group.addTo(map); }
                layerData(o.kind)
                    .then(function (data) { drawers[o.kind](data, group); })
                    .catch(function (e) { console.error(o.name, e); });
            });

            L.control.layers(basemaps, overlays).addTo(map);

            var legend = L.control({ position: 'bottomright' });
            legend.onAdd = function () {
                var holder = L.DomUtil.create('div');
                holder.innerHTML = config.legend;
                return holder.firstChild;
            };
            legend.addTo(map);
        }

        if (BOOTSTRAP) {
            build(BOOTSTRAP.config);
        } else {
            load('/api/map').then(build).catch(function (e) { console.error(e); });
        }
    })();
    </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basemap::LayerRegistry;
    use crate::layers::MapView;
    use crate::legend::Legend;

    #[test]
    fn test_index_loads_from_api() {
        let html = index_html();
        assert!(html.contains("var BOOTSTRAP = null;"));
        assert!(html.contains("leaflet.js"));
        assert!(!html.contains("__QUAKEMAP_BOOTSTRAP__"));
    }

    #[test]
    fn test_standalone_embeds_data() {
        let map = MapView::new(
            LayerRegistry::bundled().expect("registry"),
            Legend::depth().expect("legend"),
        );
        let quakes = serde_json::json!({"type": "FeatureCollection", "features": []});
        let plates = serde_json::json!({"type": "FeatureCollection", "features": []});

        let html = standalone_html(&map.config(), &quakes, &plates).expect("render");
        assert!(!html.contains("var BOOTSTRAP = null;"));
        assert!(html.contains(r#""defaultBasemap":"Default""#));
        assert!(html.contains(r#""earthquakes":{"#));
    }

    #[test]
    fn test_embedded_json_cannot_close_script() {
        let map = MapView::new(
            LayerRegistry::bundled().expect("registry"),
            Legend::depth().expect("legend"),
        );
        let quakes = serde_json::json!({"popup": "</script><script>alert(1)</script>"});
        let plates = serde_json::json!({});

        let html = standalone_html(&map.config(), &quakes, &plates).expect("render");
        assert_eq!(html.matches("</script>").count(), 2);
    }
}
