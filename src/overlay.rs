use crate::config::StyleConfig;
use crate::types::{AssessedRegion, Indicator};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::{MultiPolygon, Rect};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Serialize;
use serde_json::Value;

pub const NAME_FIELD: &str = "name";
pub const RECOMMENDATION_FIELD: &str = "recommendation";
pub const VALUE_FIELD: &str = "value";

/// Uniform fill applied to every region of a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillStyle {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub weight: f64,
}

impl From<&StyleConfig> for FillStyle {
    fn from(style: &StyleConfig) -> Self {
        FillStyle {
            fill_color: style.fill_color.clone(),
            fill_opacity: style.fill_opacity,
            weight: style.weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipSpec {
    pub fields: Vec<&'static str>,
    pub aliases: Vec<&'static str>,
}

impl Default for TooltipSpec {
    fn default() -> Self {
        TooltipSpec {
            fields: vec![NAME_FIELD, RECOMMENDATION_FIELD],
            aliases: vec!["State:", "Recommendation:"],
        }
    }
}

#[derive(Debug, Clone)]
pub struct OverlayFeature {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    pub value: f64,
    pub recommendation: &'static str,
    pub attributes: JsonObject,
}

/// Everything a map renderer needs for one theme.
#[derive(Debug, Clone)]
pub struct MapOverlay {
    pub indicator: Indicator,
    pub theme: &'static str,
    pub features: Vec<OverlayFeature>,
    pub style: FillStyle,
    pub tooltip: TooltipSpec,
}

pub fn build_overlay(regions: &[AssessedRegion], indicator: Indicator, style: FillStyle) -> MapOverlay {
    let features = regions.iter().map(|assessed| {
        let value = assessed.indicators.get(indicator);
        OverlayFeature {
            name: assessed.region.name.clone(),
            geometry: assessed.region.geometry.clone(),
            value,
            recommendation: assessed.recommendation(indicator),
            attributes: assessed.region.attributes.clone().into_iter().collect(),
        }
    }).collect();

    MapOverlay {
        indicator,
        theme: indicator.theme(),
        features,
        style,
        tooltip: TooltipSpec::default(),
    }
}

/// `"Urban Planning"` becomes `"Urban_Planning_Interactive_Map"`.
pub fn map_file_stem(theme: &str) -> String {
    format!("{}_Interactive_Map", theme.replace(' ', "_"))
}

impl MapOverlay {
    pub fn file_stem(&self) -> String {
        map_file_stem(self.theme)
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self.features.iter().map(|f| {
            let mut properties = f.attributes.clone();
            properties.insert(NAME_FIELD.to_string(), Value::String(f.name.clone()));
            properties.insert(RECOMMENDATION_FIELD.to_string(), Value::String(f.recommendation.to_string()));
            properties.insert(VALUE_FIELD.to_string(), Value::from(f.value));

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&f.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        }).collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features.iter()
            .filter_map(|f| f.geometry.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    geo::Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    geo::Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }

    /// `[lat, lon]` of the bounding box centre.
    pub fn center(&self) -> Option<[f64; 2]> {
        self.bounds().map(|r| {
            let c = r.center();
            [c.y, c.x]
        })
    }
}
