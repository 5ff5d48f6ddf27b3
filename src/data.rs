use crate::config::{InputConfig, TableConfig};
use crate::error::PipelineError;
use crate::types::{AttributeRecord, AttributeTable, Region};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use serde_json::Value;
use shapefile::dbase::FieldValue;
use shapefile::Reader;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

pub fn load_boundaries(input: &InputConfig) -> Result<Vec<Region>> {
    let path = &input.boundaries;
    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| PipelineError::UnsupportedBoundaryFormat(format!("{:?} has no extension", path)))?;

    let regions = match extension.as_str() {
        "shp" => load_shapefile(path, &input.region_name_column)?,
        "json" | "geojson" => load_geojson(path, &input.region_name_column)?,
        other => return Err(PipelineError::UnsupportedBoundaryFormat(other.to_string()).into()),
    };

    if regions.is_empty() {
        return Err(PipelineError::EmptyBoundaries.into());
    }
    info!("Loaded {} boundary regions from {:?}", regions.len(), path);

    Ok(regions)
}

fn load_shapefile(path: &Path, name_column: &str) -> Result<Vec<Region>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut regions = Vec::new();

    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .map_err(|e| PipelineError::InvalidBoundaries(format!("feature {}: {}", index, e)))?;

        let name = match record.get(name_column) {
            Some(FieldValue::Character(Some(s))) => s.trim().to_string(),
            Some(FieldValue::Character(None)) => {
                warn!("Skipping shapefile feature {} with empty region name", index);
                continue;
            }
            Some(_) => {
                return Err(PipelineError::InvalidBoundaries(format!(
                    "region name attribute '{}' must be a string", name_column
                )).into())
            }
            None => {
                return Err(PipelineError::MissingBoundaryAttribute {
                    column: name_column.to_string(),
                    feature: index,
                }.into())
            }
        };

        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            shapefile::Shape::PolygonM(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            other => {
                warn!("Skipping non-polygon shape {:?} for region '{}'", other.shapetype(), name);
                continue;
            }
        };

        let attributes = record.into_iter()
            .filter(|(field, _)| field != name_column)
            .map(|(field, value)| (field, field_value_to_json(value)))
            .collect();

        regions.push(Region { name, geometry, attributes });
    }

    Ok(regions)
}

fn field_value_to_json(value: FieldValue) -> Value {
    match value {
        FieldValue::Character(Some(s)) => Value::String(s),
        FieldValue::Memo(s) => Value::String(s),
        FieldValue::Numeric(Some(n)) | FieldValue::Double(n) | FieldValue::Currency(n) => {
            serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
        }
        FieldValue::Float(Some(n)) => {
            serde_json::Number::from_f64(n as f64).map(Value::Number).unwrap_or(Value::Null)
        }
        FieldValue::Integer(n) => Value::from(n),
        FieldValue::Logical(Some(b)) => Value::Bool(b),
        _ => Value::Null,
    }
}

fn load_geojson(path: &Path, name_column: &str) -> Result<Vec<Region>> {
    use geojson::GeoJson;
    use std::io::BufReader;

    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let reader = BufReader::new(file);

    let geojson = GeoJson::from_reader(reader)
        .map_err(|e| PipelineError::InvalidBoundaries(format!("{:?}: {}", path, e)))?;
    regions_from_geojson(geojson, name_column)
}

pub fn regions_from_geojson(geojson: geojson::GeoJson, name_column: &str) -> Result<Vec<Region>> {
    let collection = match geojson {
        geojson::GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(PipelineError::InvalidBoundaries("GeoJSON must be a FeatureCollection".to_string()).into()),
    };

    let mut regions = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let mut properties = feature.properties.unwrap_or_default();

        let name = match properties.remove(name_column) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Null) => {
                warn!("Skipping GeoJSON feature {} with empty region name", index);
                continue;
            }
            Some(_) => {
                return Err(PipelineError::InvalidBoundaries(format!(
                    "region name attribute '{}' must be a string", name_column
                )).into())
            }
            None => {
                return Err(PipelineError::MissingBoundaryAttribute {
                    column: name_column.to_string(),
                    feature: index,
                }.into())
            }
        };

        let geometry = match feature.geometry {
            Some(geom) => {
                let valid_geo: geo::Geometry<f64> = geom.value.try_into()
                    .map_err(|e| anyhow!("Failed to convert geojson geometry: {:?}", e))?;

                match valid_geo {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => {
                        warn!("Skipping non-polygon geometry for region '{}'", name);
                        continue;
                    }
                }
            }
            None => {
                warn!("Skipping region '{}' without geometry", name);
                continue;
            }
        };

        regions.push(Region {
            name,
            geometry,
            attributes: properties.into_iter().collect(),
        });
    }

    Ok(regions)
}

/// Reads a delimited attribute table. The key column and every column in
/// `required` must be present in the header row.
pub fn load_attribute_table(name: &str, config: &TableConfig, required: &[&str]) -> Result<AttributeTable> {
    let file = File::open(&config.path)
        .with_context(|| format!("Failed to open {} CSV file: {:?}", name, config.path))?;
    let table = read_attribute_table(name, config, required, file)?;
    info!("Loaded {} {} rows from {:?}", table.records.len(), name, config.path);
    Ok(table)
}

pub fn read_attribute_table<R: std::io::Read>(
    name: &str,
    config: &TableConfig,
    required: &[&str],
    source: R,
) -> Result<AttributeTable> {
    let delimiter = u8::try_from(config.delimiter)
        .map_err(|_| anyhow!("Delimiter for {} data must be a single-byte character", name))?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = rdr.byte_headers()
        .with_context(|| format!("Failed to read {} CSV header", name))?
        .iter()
        .map(|h| config.encoding.decode(h))
        .collect();

    let key_idx = headers.iter().position(|h| *h == config.key_column)
        .ok_or_else(|| PipelineError::MissingColumn {
            dataset: name.to_string(),
            column: config.key_column.clone(),
        })?;

    if let Some(missing) = required.iter().find(|c| !headers.iter().any(|h| h == *c)) {
        return Err(PipelineError::MissingColumn {
            dataset: name.to_string(),
            column: missing.to_string(),
        }.into());
    }

    let mut records = Vec::new();

    for (line, result) in rdr.byte_records().enumerate() {
        let row = result.with_context(|| format!("Failed to read {} CSV row {}", name, line + 1))?;

        let key = row.get(key_idx).map(|k| config.encoding.decode(k)).unwrap_or_default();
        if key.trim().is_empty() {
            debug!("Skipping {} row {} with blank key", name, line + 1);
            continue;
        }

        let values: BTreeMap<String, String> = headers.iter().enumerate()
            .filter_map(|(i, h)| row.get(i).map(|v| (h.clone(), config.encoding.decode(v))))
            .collect();

        records.push(AttributeRecord { key, values });
    }

    Ok(AttributeTable {
        name: name.to_string(),
        headers,
        records,
    })
}
