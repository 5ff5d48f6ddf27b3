use crate::config::{MapFormat, OutputConfig};
use crate::overlay::{build_overlay, FillStyle, MapOverlay};
use crate::types::{AssessedRegion, Indicator};
use anyhow::{Context as _, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::info;

/// Serializes a finished overlay into a portable document.
pub trait MapWriter: Send + Sync {
    fn extension(&self) -> &'static str;
    fn render(&self, overlay: &MapOverlay) -> Result<String>;

    fn write(&self, overlay: &MapOverlay, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{}", overlay.file_stem(), self.extension()));
        let document = self.render(overlay)?;
        fs::write(&path, document)
            .with_context(|| format!("Failed to write map file: {:?}", path))?;
        Ok(path)
    }
}

pub struct GeoJsonWriter;

impl MapWriter for GeoJsonWriter {
    fn extension(&self) -> &'static str {
        "geojson"
    }

    fn render(&self, overlay: &MapOverlay) -> Result<String> {
        serde_json::to_string(&overlay.to_feature_collection())
            .context("Failed to serialize overlay to GeoJSON")
    }
}

/// Self-contained Leaflet page with the overlay, style and tooltip inlined.
pub struct HtmlMapWriter {
    tera: Tera,
    center: Option<[f64; 2]>,
    zoom: u8,
}

impl HtmlMapWriter {
    pub fn new(center: Option<[f64; 2]>, zoom: u8) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template("map.html", MAP_TEMPLATE)
            .context("Invalid map template")?;
        Ok(HtmlMapWriter { tera, center, zoom })
    }
}

// Keeps embedded data from closing the surrounding <script> element.
fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}

impl MapWriter for HtmlMapWriter {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, overlay: &MapOverlay) -> Result<String> {
        let [lat, lon] = self.center.or_else(|| overlay.center()).unwrap_or([0.0, 0.0]);
        let geojson = serde_json::to_string(&overlay.to_feature_collection())?;

        let mut context = Context::new();
        context.insert("title", overlay.theme);
        context.insert("center_lat", &lat);
        context.insert("center_lon", &lon);
        context.insert("zoom", &self.zoom);
        context.insert("style", &serde_json::to_string(&overlay.style)?);
        context.insert("tooltip", &serde_json::to_string(&overlay.tooltip)?);
        context.insert("geojson", &script_safe(geojson));

        self.tera.render("map.html", &context)
            .with_context(|| format!("Failed to render map for {}", overlay.theme))
    }
}

pub fn writers_for(output: &OutputConfig) -> Result<Vec<Box<dyn MapWriter>>> {
    let mut writers: Vec<Box<dyn MapWriter>> = Vec::new();
    for format in &output.formats {
        match format {
            MapFormat::Html => writers.push(Box::new(HtmlMapWriter::new(output.center, output.zoom)?)),
            MapFormat::Geojson => writers.push(Box::new(GeoJsonWriter)),
        }
    }
    Ok(writers)
}

/// Builds and writes one map per indicator theme. Themes only read the
/// shared assessment, so they are rendered in parallel.
pub fn generate_maps(output: &OutputConfig, assessed: &[AssessedRegion]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&output.dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output.dir))?;
    let writers = writers_for(output)?;
    let style = FillStyle::from(&output.style);

    let written: Vec<Vec<PathBuf>> = Indicator::ALL.par_iter().map(|&indicator| {
        let overlay = build_overlay(assessed, indicator, style.clone());
        info!("Rendering theme: {} ({:?})", overlay.theme, overlay.indicator);
        writers.iter()
            .map(|w| w.write(&overlay, &output.dir))
            .collect::<Result<Vec<_>>>()
    }).collect::<Result<_>>()?;

    let paths: Vec<PathBuf> = written.into_iter().flatten().collect();
    for path in &paths {
        info!("Wrote {:?}", path);
    }
    Ok(paths)
}

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<title>{{ title }}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
html, body, #map { height: 100%; margin: 0; }
.map-title { position: absolute; top: 10px; left: 60px; z-index: 1000; background: white; padding: 4px 8px; font: bold 16px sans-serif; }
</style>
</head>
<body>
<div class="map-title">{{ title }}</div>
<div id="map"></div>
<script>
var map = L.map("map").setView([{{ center_lat }}, {{ center_lon }}], {{ zoom }});
L.tileLayer("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", {
  attribution: "&copy; OpenStreetMap contributors"
}).addTo(map);

var style = {{ style }};
var tooltip = {{ tooltip }};
var data = {{ geojson }};

function escapeHtml(text) {
  var entities = { "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;" };
  return String(text == null ? "" : text).replace(/[&<>"']/g, function (c) { return entities[c]; });
}

L.geoJSON(data, {
  style: function () { return style; },
  onEachFeature: function (feature, layer) {
    var rows = tooltip.fields.map(function (field, i) {
      return "<tr><th>" + escapeHtml(tooltip.aliases[i]) + "</th><td>" + escapeHtml(feature.properties[field]) + "</td></tr>";
    });
    layer.bindTooltip("<table>" + rows.join("") + "</table>", { sticky: true });
  }
}).addTo(map);
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::config::StyleConfig;
    use crate::types::{IndicatorValues, Region};
    use geo::{polygon, MultiPolygon};
    use std::collections::BTreeMap;

    fn assessed(name: &str) -> AssessedRegion {
        let values = IndicatorValues { urban_planning: 65.0, ..Default::default() };
        AssessedRegion {
            region: Region {
                name: name.to_string(),
                geometry: MultiPolygon::new(vec![polygon![
                    (x: 76.0, y: 8.0), (x: 77.0, y: 8.0), (x: 77.0, y: 10.0), (x: 76.0, y: 10.0)
                ]]),
                attributes: BTreeMap::new(),
            },
            indicators: values,
            recommendations: Indicator::ALL.map(|i| classify(i, values.get(i))),
        }
    }

    fn overlay() -> MapOverlay {
        build_overlay(&[assessed("Kerala")], Indicator::UrbanPlanning, FillStyle::from(&StyleConfig::default()))
    }

    #[test]
    fn test_html_embeds_overlay_and_tooltip() {
        let writer = HtmlMapWriter::new(Some([23.2599, 77.4126]), 5).unwrap();

        let html = writer.render(&overlay()).unwrap();

        assert!(html.contains("<title>Urban Planning</title>"));
        assert!(html.contains("setView([23.2599, 77.4126], 5)"));
        assert!(html.contains(r#""fillColor":"blue""#));
        assert!(html.contains(r#""aliases":["State:","Recommendation:"]"#));
        assert!(html.contains("Focus on sustainable urbanization in high urban density areas"));
        assert!(html.contains(r#""name":"Kerala""#));
    }

    #[test]
    fn test_html_centers_on_regions_without_configured_center() {
        let writer = HtmlMapWriter::new(None, 6).unwrap();

        let html = writer.render(&overlay()).unwrap();

        assert!(html.contains("setView([9, 76.5], 6)") || html.contains("setView([9.0, 76.5], 6)"));
    }

    #[test]
    fn test_script_safe_escapes_closing_tags() {
        assert_eq!(script_safe(r#"{"name":"</script>"}"#.to_string()), r#"{"name":"<\/script>"}"#);
    }

    #[test]
    fn test_geojson_writer_output_parses() {
        let dir = tempfile::tempdir().unwrap();

        let path = GeoJsonWriter.write(&overlay(), dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "Urban_Planning_Interactive_Map.geojson");
        let content = fs::read_to_string(&path).unwrap();
        let parsed: geojson::GeoJson = content.parse().unwrap();
        assert!(matches!(parsed, geojson::GeoJson::FeatureCollection(ref fc) if fc.features.len() == 1));
    }

    #[test]
    fn test_generate_maps_writes_every_theme() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            dir: dir.path().join("maps"),
            ..OutputConfig::default()
        };

        let mut paths = generate_maps(&output, &[assessed("Kerala"), assessed("Goa")]).unwrap();
        paths.sort();

        let names: Vec<String> = paths.iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![
            "Environmental_Conservation_Interactive_Map.geojson",
            "Environmental_Conservation_Interactive_Map.html",
            "Infrastructure_Development_Interactive_Map.geojson",
            "Infrastructure_Development_Interactive_Map.html",
            "Socio-Economics_Analysis_Interactive_Map.geojson",
            "Socio-Economics_Analysis_Interactive_Map.html",
            "Urban_Planning_Interactive_Map.geojson",
            "Urban_Planning_Interactive_Map.html",
        ]);
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_generate_maps_honours_formats() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            dir: dir.path().to_path_buf(),
            formats: vec![MapFormat::Html],
            ..OutputConfig::default()
        };

        let paths = generate_maps(&output, &[assessed("Kerala")]).unwrap();

        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.extension().unwrap() == "html"));
    }
}
