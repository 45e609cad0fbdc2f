//! GeoJSON FeatureCollection output

use super::geometry::{PolygonRings, Properties, PropertyValue, ReleaseFeature};
use crate::core::error::{GbResult, ResultExt};
use serde_json::{Map, Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Decimal places kept for output coordinates
pub const COORDINATE_PRECISION: i32 = 7;

fn round_coordinate(v: f64) -> f64 {
  let scale = 10f64.powi(COORDINATE_PRECISION);
  (v * scale).round() / scale
}

fn property_json(value: &PropertyValue) -> Value {
  match value {
    PropertyValue::Text(s) => Value::String(s.clone()),
    // NaN/inf have no JSON form
    PropertyValue::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
    PropertyValue::Bool(b) => Value::Bool(*b),
    PropertyValue::Null => Value::Null,
  }
}

fn properties_json(properties: &Properties) -> Value {
  let map: Map<String, Value> = properties
    .iter()
    .map(|(k, v)| (k.clone(), property_json(v)))
    .collect();
  Value::Object(map)
}

fn multipolygon_json(polygons: &[PolygonRings]) -> Value {
  let coordinates: Vec<Value> = polygons
    .iter()
    .map(|rings| {
      Value::Array(
        rings
          .iter()
          .map(|ring| {
            Value::Array(
              ring
                .iter()
                .map(|[x, y]| json!([round_coordinate(*x), round_coordinate(*y)]))
                .collect(),
            )
          })
          .collect(),
      )
    })
    .collect();

  json!({ "type": "MultiPolygon", "coordinates": coordinates })
}

/// Build the FeatureCollection document
pub fn feature_collection(name: &str, features: &[ReleaseFeature]) -> Value {
  let features: Vec<Value> = features
    .iter()
    .map(|f| {
      json!({
        "type": "Feature",
        "properties": properties_json(&f.properties),
        "geometry": multipolygon_json(&f.polygons),
      })
    })
    .collect();

  json!({
    "type": "FeatureCollection",
    "name": name,
    "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::4326" } },
    "features": features,
  })
}

pub fn write_geojson(path: &Path, name: &str, features: &[ReleaseFeature]) -> GbResult<()> {
  let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
  let mut writer = BufWriter::new(file);
  serde_json::to_writer(&mut writer, &feature_collection(name, features))
    .with_context(|| format!("Failed to write {}", path.display()))?;
  writer.flush()?;
  Ok(())
}
