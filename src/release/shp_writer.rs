//! ESRI shapefile output (.shp/.shx/.dbf plus a WGS84 .prj)

use super::geometry::{Properties, PropertyValue, ReleaseFeature};
use crate::core::error::{GbError, GbResult, ResultExt};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// dBase field names are limited to 10 bytes
const MAX_FIELD_NAME: usize = 10;
const MAX_CHARACTER_WIDTH: usize = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
  Character(u8),
  Integer,
  Decimal,
  Logical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
  name: String,
  property: String,
  kind: ColumnKind,
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a character
fn truncate_bytes(s: &str, max: usize) -> &str {
  let mut end = 0;
  for (idx, c) in s.char_indices() {
    if idx + c.len_utf8() > max {
      break;
    }
    end = idx + c.len_utf8();
  }
  &s[..end]
}

fn dbf_name(property: &str) -> String {
  truncate_bytes(property, MAX_FIELD_NAME).to_string()
}

fn text_of(value: &PropertyValue) -> Option<String> {
  match value {
    PropertyValue::Text(s) => Some(s.clone()),
    PropertyValue::Number(n) => Some(n.to_string()),
    PropertyValue::Bool(b) => Some(b.to_string()),
    PropertyValue::Null => None,
  }
}

/// Derive the DBF schema from the values, one column per property name in name order
fn derive_columns(features: &[ReleaseFeature]) -> Vec<Column> {
  let mut seen: BTreeMap<&str, Vec<&PropertyValue>> = BTreeMap::new();
  for feature in features {
    for (name, value) in &feature.properties {
      seen.entry(name.as_str()).or_default().push(value);
    }
  }

  seen
    .into_iter()
    .map(|(property, values)| {
      let has_text = values.iter().any(|v| matches!(v, PropertyValue::Text(_)));
      let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| match v {
          PropertyValue::Number(n) => Some(*n),
          _ => None,
        })
        .collect();
      let has_bool = values.iter().any(|v| matches!(v, PropertyValue::Bool(_)));

      let kind = if has_text || (has_bool && !numbers.is_empty()) {
        let width = values
          .iter()
          .filter_map(|v| text_of(v))
          .map(|s| s.len())
          .max()
          .unwrap_or(1)
          .clamp(1, MAX_CHARACTER_WIDTH);
        ColumnKind::Character(width as u8)
      } else if !numbers.is_empty() {
        if numbers.iter().all(|n| n.fract() == 0.0 && n.abs() < 1e17) {
          ColumnKind::Integer
        } else {
          ColumnKind::Decimal
        }
      } else if has_bool {
        ColumnKind::Logical
      } else {
        ColumnKind::Character(1)
      };

      Column {
        name: dbf_name(property),
        property: property.to_string(),
        kind,
      }
    })
    .collect()
}

fn field_name(name: &str) -> GbResult<FieldName> {
  FieldName::try_from(name).map_err(|e| GbError::message(format!("Invalid DBF field name '{}': {:?}", name, e)))
}

fn table_builder(columns: &[Column]) -> GbResult<TableWriterBuilder> {
  let mut builder = TableWriterBuilder::new();
  for column in columns {
    let name = field_name(&column.name)?;
    builder = match column.kind {
      ColumnKind::Character(width) => builder.add_character_field(name, width),
      ColumnKind::Integer => builder.add_numeric_field(name, 18, 0),
      ColumnKind::Decimal => builder.add_numeric_field(name, 20, 8),
      ColumnKind::Logical => builder.add_logical_field(name),
    };
  }
  Ok(builder)
}

fn record_for(columns: &[Column], properties: &Properties) -> Record {
  let mut record = Record::default();
  for column in columns {
    let value = properties.get(&column.property).unwrap_or(&PropertyValue::Null);
    let field = match column.kind {
      ColumnKind::Character(width) => {
        FieldValue::Character(text_of(value).map(|text| truncate_bytes(&text, usize::from(width)).to_string()))
      }
      ColumnKind::Integer | ColumnKind::Decimal => FieldValue::Numeric(match value {
        PropertyValue::Number(n) => Some(*n),
        _ => None,
      }),
      ColumnKind::Logical => FieldValue::Logical(match value {
        PropertyValue::Bool(b) => Some(*b),
        _ => None,
      }),
    };
    record.insert(column.name.clone(), field);
  }
  record
}

fn polygon_for(feature: &ReleaseFeature) -> Polygon {
  let mut rings = Vec::new();
  for polygon in &feature.polygons {
    for (idx, ring) in polygon.iter().enumerate() {
      let points: Vec<Point> = ring.iter().map(|[x, y]| Point::new(*x, *y)).collect();
      rings.push(if idx == 0 {
        PolygonRing::Outer(points)
      } else {
        PolygonRing::Inner(points)
      });
    }
  }
  Polygon::with_rings(rings)
}

/// Write `<stem>.shp/.shx/.dbf/.prj` into `dir`
pub fn write_shapefile(dir: &Path, stem: &str, features: &[ReleaseFeature]) -> GbResult<()> {
  let shp_path = dir.join(format!("{}.shp", stem));
  let columns = derive_columns(features);

  {
    let mut writer = shapefile::Writer::from_path(&shp_path, table_builder(&columns)?)
      .with_context(|| format!("Failed to create {}", shp_path.display()))?;
    for feature in features {
      writer
        .write_shape_and_record(&polygon_for(feature), &record_for(&columns, &feature.properties))
        .with_context(|| format!("Failed to write feature to {}", shp_path.display()))?;
    }
  }

  fs::write(dir.join(format!("{}.prj", stem)), WGS84_PRJ)?;
  tracing::debug!(path = %shp_path.display(), features = features.len(), columns = columns.len(), "wrote shapefile");
  Ok(())
}
