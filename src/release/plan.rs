//! Dry-run build plan: what a batch would build and where, without writing

use super::batch::PreparedBatch;
use super::layout::ReleaseLayout;
use super::product::ProductType;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct PlannedBuild {
  /// `ISO|ADM`
  pub boundary: String,
  pub product: ProductType,
  pub output_dir: Option<PathBuf>,
  /// Source shapefile, for products with a build step
  pub source: Option<PathBuf>,
  pub source_exists: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
  pub nightly: String,
  pub version: String,
  pub snapshot: PathBuf,
  pub input_table: PathBuf,
  pub release_table: PathBuf,
  pub jobs: usize,
  pub builds: Vec<PlannedBuild>,
}

impl BuildPlan {
  pub fn new(layout: &ReleaseLayout, prepared: &PreparedBatch, products: &[ProductType], jobs: usize) -> Self {
    let mut builds = Vec::new();
    for row in prepared.table.rows() {
      let ids = row.iso().zip(row.level());
      for &product in products {
        let source = match ids {
          Some((iso, adm)) if product.has_build_step() => Some(layout.source_shapefile(iso, adm)),
          _ => None,
        };
        builds.push(PlannedBuild {
          boundary: row.tag(),
          product,
          output_dir: ids.map(|(iso, adm)| layout.output_dir(product, iso, adm)),
          source_exists: source.as_ref().is_some_and(|p| p.is_file()),
          source,
        });
      }
    }

    Self {
      nightly: prepared.nightly.clone(),
      version: layout.version().to_string(),
      snapshot: prepared.snapshot.clone(),
      input_table: prepared.table_path.clone(),
      release_table: layout.release_table(),
      jobs,
      builds,
    }
  }

  /// Builds that will fail on a missing source
  pub fn missing_sources(&self) -> impl Iterator<Item = &PlannedBuild> {
    self
      .builds
      .iter()
      .filter(|b| b.product.has_build_step() && !b.source_exists)
  }
}
