//! Feature model and shapefile input
//!
//! Source shapefiles are read into a small owned model so the GeoJSON and
//! shapefile writers share one pass of coercion and shape ID stamping.

use crate::core::error::{GbError, GbResult, ResultExt};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Property name carrying the per-shape identifier
pub const SHAPE_ID: &str = "shapeID";

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
  Text(String),
  Number(f64),
  Bool(bool),
  Null,
}

pub type Properties = BTreeMap<String, PropertyValue>;

/// Closed ring of (x, y) positions
pub type Ring = Vec<[f64; 2]>;

/// Exterior ring followed by its holes
pub type PolygonRings = Vec<Ring>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
  Polygon(PolygonRings),
  MultiPolygon(Vec<PolygonRings>),
  /// Anything that cannot become a multipolygon (points, lines, null shapes)
  Unsupported(String),
}

impl Geometry {
  /// Wrap a single polygon as a one-member multipolygon
  pub fn into_multipolygon(self) -> GbResult<Vec<PolygonRings>> {
    match self {
      Geometry::Polygon(rings) => Ok(vec![rings]),
      Geometry::MultiPolygon(polygons) if !polygons.is_empty() => Ok(polygons),
      Geometry::MultiPolygon(_) => Err(GbError::message("empty MultiPolygon geometry cannot be written")),
      Geometry::Unsupported(kind) => Err(GbError::message(format!(
        "{} geometry cannot be coerced to MultiPolygon",
        kind
      ))),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
  pub geometry: Geometry,
  pub properties: Properties,
}

/// Feature after coercion, ready for the writers
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseFeature {
  pub polygons: Vec<PolygonRings>,
  pub properties: Properties,
}

/// `<ISO>-<ADM>-<version>-B<n>`
pub fn shape_id(iso: &str, adm: &str, version: &str, n: usize) -> String {
  format!("{}-{}-{}-B{}", iso, adm, version, n)
}

/// Coerce every feature to MultiPolygon and stamp 1-based shape IDs in input order
pub fn prepare_features(features: Vec<Feature>, iso: &str, adm: &str, version: &str) -> GbResult<Vec<ReleaseFeature>> {
  features
    .into_iter()
    .enumerate()
    .map(|(idx, feature)| {
      let n = idx + 1;
      let polygons = feature
        .geometry
        .into_multipolygon()
        .with_context(|| format!("feature {} of {}_{}", n, iso, adm))?;
      let mut properties = feature.properties;
      properties.insert(SHAPE_ID.to_string(), PropertyValue::Text(shape_id(iso, adm, version, n)));
      Ok(ReleaseFeature { polygons, properties })
    })
    .collect()
}

/// Group shapefile rings into polygons
///
/// Each outer ring opens a polygon; inner rings attach to the polygon opened
/// before them. An inner ring with no preceding outer ring is kept as its own
/// exterior. A record with no rings, or with a ring that has no points, is
/// an empty polygon and cannot be written.
pub fn group_rings(rings: impl IntoIterator<Item = (bool, Ring)>) -> Geometry {
  let mut polygons: Vec<PolygonRings> = Vec::new();
  for (is_outer, ring) in rings {
    if ring.is_empty() {
      return Geometry::Unsupported("empty Polygon".to_string());
    }
    match polygons.last_mut() {
      Some(current) if !is_outer => current.push(ring),
      _ => polygons.push(vec![ring]),
    }
  }

  match polygons.len() {
    0 => Geometry::Unsupported("empty Polygon".to_string()),
    1 => Geometry::Polygon(polygons.remove(0)),
    _ => Geometry::MultiPolygon(polygons),
  }
}

fn rings_of<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> [f64; 2]) -> Geometry {
  group_rings(rings.iter().map(|ring| match ring {
    PolygonRing::Outer(points) => (true, points.iter().map(&xy).collect()),
    PolygonRing::Inner(points) => (false, points.iter().map(&xy).collect()),
  }))
}

fn geometry_from_shape(shape: Shape) -> Geometry {
  match shape {
    Shape::Polygon(p) => rings_of(p.rings(), |pt| [pt.x, pt.y]),
    Shape::PolygonM(p) => rings_of(p.rings(), |pt| [pt.x, pt.y]),
    Shape::PolygonZ(p) => rings_of(p.rings(), |pt| [pt.x, pt.y]),
    other => Geometry::Unsupported(format!("{:?}", other.shapetype())),
  }
}

fn property_from_field(value: FieldValue) -> PropertyValue {
  match value {
    FieldValue::Character(Some(s)) => PropertyValue::Text(s.trim_end().to_string()),
    FieldValue::Memo(s) => PropertyValue::Text(s),
    FieldValue::Numeric(Some(n)) => PropertyValue::Number(n),
    FieldValue::Float(Some(f)) => PropertyValue::Number(f64::from(f)),
    FieldValue::Integer(i) => PropertyValue::Number(f64::from(i)),
    FieldValue::Double(d) => PropertyValue::Number(d),
    FieldValue::Currency(c) => PropertyValue::Number(c),
    FieldValue::Logical(Some(b)) => PropertyValue::Bool(b),
    FieldValue::Character(None) | FieldValue::Numeric(None) | FieldValue::Float(None) | FieldValue::Logical(None) => {
      PropertyValue::Null
    }
    other => PropertyValue::Text(format!("{:?}", other)),
  }
}

fn properties_from_record(record: Record) -> Properties {
  let fields: HashMap<String, FieldValue> = record.into();
  fields
    .into_iter()
    .map(|(name, value)| (name, property_from_field(value)))
    .collect()
}

/// Read every feature of a shapefile (with its .dbf) in file order
pub fn read_shapefile(path: &Path) -> GbResult<Vec<Feature>> {
  let mut reader =
    shapefile::Reader::from_path(path).with_context(|| format!("Failed to open shapefile {}", path.display()))?;

  let mut features = Vec::new();
  for item in reader.iter_shapes_and_records() {
    let (shape, record) = item.with_context(|| format!("Failed to read feature from {}", path.display()))?;
    features.push(Feature {
      geometry: geometry_from_shape(shape),
      properties: properties_from_record(record),
    });
  }
  Ok(features)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn square(x: f64, y: f64, size: f64) -> Ring {
    vec![[x, y], [x, y + size], [x + size, y + size], [x + size, y], [x, y]]
  }

  fn feature(geometry: Geometry, name: &str) -> Feature {
    let mut properties = Properties::new();
    properties.insert("shapeName".into(), PropertyValue::Text(name.into()));
    Feature { geometry, properties }
  }

  #[test]
  fn test_group_single_outer_with_hole() {
    let geometry = group_rings([(true, square(0.0, 0.0, 10.0)), (false, square(2.0, 2.0, 1.0))]);
    assert_eq!(
      geometry,
      Geometry::Polygon(vec![square(0.0, 0.0, 10.0), square(2.0, 2.0, 1.0)])
    );
  }

  #[test]
  fn test_group_multiple_outers() {
    let geometry = group_rings([
      (true, square(0.0, 0.0, 1.0)),
      (true, square(5.0, 5.0, 1.0)),
      (false, square(5.2, 5.2, 0.1)),
    ]);
    match geometry {
      Geometry::MultiPolygon(polys) => {
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[0].len(), 1);
        assert_eq!(polys[1].len(), 2);
      }
      other => panic!("expected multipolygon, got {:?}", other),
    }
  }

  #[test]
  fn test_leading_inner_ring_becomes_exterior() {
    let geometry = group_rings([(false, square(0.0, 0.0, 1.0))]);
    assert!(matches!(geometry, Geometry::Polygon(ref rings) if rings.len() == 1));
  }

  #[test]
  fn test_empty_rings_are_unsupported() {
    let none: Vec<(bool, Ring)> = Vec::new();
    assert_eq!(group_rings(none), Geometry::Unsupported("empty Polygon".into()));
    assert_eq!(
      group_rings([(true, square(0.0, 0.0, 1.0)), (false, Vec::new())]),
      Geometry::Unsupported("empty Polygon".into())
    );
    assert!(Geometry::MultiPolygon(Vec::new()).into_multipolygon().is_err());
  }

  #[test]
  fn test_polygon_wraps_into_single_member_multipolygon() {
    let polys = Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]).into_multipolygon().unwrap();
    assert_eq!(polys.len(), 1);
    assert!(Geometry::Unsupported("Point".into()).into_multipolygon().is_err());
  }

  #[test]
  fn test_shape_ids_are_sequential_from_one() {
    let features = vec![
      feature(Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]), "a"),
      feature(Geometry::MultiPolygon(vec![vec![square(1.0, 1.0, 1.0)]]), "b"),
      feature(Geometry::Polygon(vec![square(2.0, 2.0, 1.0)]), "c"),
    ];
    let prepared = prepare_features(features.clone(), "QAT", "ADM1", "3_0_0").unwrap();
    let ids: Vec<_> = prepared.iter().map(|f| f.properties[SHAPE_ID].clone()).collect();
    assert_eq!(
      ids,
      vec![
        PropertyValue::Text("QAT-ADM1-3_0_0-B1".into()),
        PropertyValue::Text("QAT-ADM1-3_0_0-B2".into()),
        PropertyValue::Text("QAT-ADM1-3_0_0-B3".into()),
      ]
    );

    // Same input, same identifiers
    let again = prepare_features(features, "QAT", "ADM1", "3_0_0").unwrap();
    assert_eq!(prepared, again);
  }

  #[test]
  fn test_unsupported_feature_fails_with_position() {
    let features = vec![
      feature(Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]), "a"),
      feature(Geometry::Unsupported("Point".into()), "b"),
    ];
    let err = prepare_features(features, "QAT", "ADM1", "3_0_0").unwrap_err();
    assert!(err.to_string().contains("feature 2"));
  }

  #[test]
  fn test_field_values_convert() {
    assert_eq!(
      property_from_field(FieldValue::Character(Some("Doha   ".into()))),
      PropertyValue::Text("Doha".into())
    );
    assert_eq!(property_from_field(FieldValue::Numeric(Some(4.5))), PropertyValue::Number(4.5));
    assert_eq!(property_from_field(FieldValue::Numeric(None)), PropertyValue::Null);
    assert_eq!(property_from_field(FieldValue::Logical(Some(true))), PropertyValue::Bool(true));
  }
}
