//! Per-boundary build
//!
//! One metadata row is built for every requested product. Errors inside a
//! product build are caught here, written to `CRITICAL.txt` and returned as a
//! [`BuildOutcome::Failure`]; they never reach the batch.

use super::buildlog::BuildLog;
use super::bundle::{append_file, move_file, zip_dir};
use super::geometry::{prepare_features, read_shapefile};
use super::layout::ReleaseLayout;
use super::metadata::BoundaryRow;
use super::product::ProductType;
use super::{citation, geojson, shp_writer, sidecar};
use crate::core::error::{GbResult, ResultExt};
use serde::Serialize;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Result of building one product for one boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum BuildOutcome {
  Success { features: usize },
  Skipped(String),
  Failure(String),
}

impl BuildOutcome {
  pub fn is_failure(&self) -> bool {
    matches!(self, BuildOutcome::Failure(_))
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductOutcome {
  pub product: ProductType,
  #[serde(flatten)]
  pub outcome: BuildOutcome,
}

/// Outcomes of one metadata row across all requested products
#[derive(Debug, Clone, Serialize)]
pub struct BoundaryReport {
  /// `ISO|ADM`
  pub boundary: String,
  pub products: Vec<ProductOutcome>,
}

impl BoundaryReport {
  pub fn failed(&self) -> bool {
    self.products.iter().any(|p| p.outcome.is_failure())
  }

  pub fn count(&self, pred: impl Fn(&BuildOutcome) -> bool) -> usize {
    self.products.iter().filter(|p| pred(&p.outcome)).count()
  }
}

pub struct BoundaryBuilder<'a> {
  layout: &'a ReleaseLayout,
  log: BuildLog,
  products: &'a [ProductType],
}

impl<'a> BoundaryBuilder<'a> {
  pub fn new(layout: &'a ReleaseLayout, products: &'a [ProductType]) -> Self {
    Self {
      layout,
      log: BuildLog::new(layout.log_dir(layout.version())),
      products,
    }
  }

  pub fn log(&self) -> &BuildLog {
    &self.log
  }

  #[tracing::instrument(skip(self, row), fields(boundary = %row.tag()))]
  pub fn build(&self, row: &BoundaryRow) -> BoundaryReport {
    let tag = row.tag();

    let (iso, adm) = match (row.iso(), row.level()) {
      (Some(iso), Some(adm)) => (iso, adm),
      _ => return self.fail_all(tag, "metadata row has no boundaryISO or boundaryType".to_string()),
    };

    let products = self
      .products
      .iter()
      .map(|&product| {
        let outcome = match self.build_product(product, row, iso, adm) {
          Ok(outcome) => outcome,
          Err(e) => {
            let reason = e.to_string();
            self.log.critical(&tag, &format!("{} build failed: {}", product, reason));
            BuildOutcome::Failure(reason)
          }
        };
        ProductOutcome { product, outcome }
      })
      .collect();

    BoundaryReport { boundary: tag, products }
  }

  /// [`build`](Self::build), with a panic anywhere in the row turned into a
  /// failure of every product
  pub fn build_isolated(&self, row: &BoundaryRow) -> BoundaryReport {
    match panic::catch_unwind(AssertUnwindSafe(|| self.build(row))) {
      Ok(report) => report,
      Err(payload) => self.fail_all(row.tag(), format!("build panicked: {}", panic_detail(payload.as_ref()))),
    }
  }

  fn fail_all(&self, tag: String, reason: String) -> BoundaryReport {
    self.log.critical(&tag, &reason);
    BoundaryReport {
      products: self
        .products
        .iter()
        .map(|&product| ProductOutcome {
          product,
          outcome: BuildOutcome::Failure(reason.clone()),
        })
        .collect(),
      boundary: tag,
    }
  }

  fn build_product(&self, product: ProductType, row: &BoundaryRow, iso: &str, adm: &str) -> GbResult<BuildOutcome> {
    let out_dir = self.layout.output_dir(product, iso, adm);
    fs::create_dir_all(&out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

    match product {
      ProductType::Hpscu => self.build_hpscu(row, iso, adm, &out_dir),
      other => Ok(BuildOutcome::Skipped(format!("no build step for {}", other))),
    }
  }

  fn check_staleness(&self, iso: &str, adm: &str, final_bundle: &Path) {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    let raw = self.layout.raw_archive(iso, adm);
    if let (Some(built), Some(retrieved)) = (modified(final_bundle), modified(&raw))
      && built < retrieved
    {
      self.log.warn(
        &format!("{}|{}", iso, adm),
        "HPSCU artifact is older than the retrieved archive; rebuilding",
      );
    }
  }

  fn build_hpscu(&self, row: &BoundaryRow, iso: &str, adm: &str, out_dir: &Path) -> GbResult<BuildOutcome> {
    let stem = self.layout.artifact_stem(iso, adm);
    let final_bundle = out_dir.join(format!("{}-all.zip", stem));
    self.check_staleness(iso, adm, &final_bundle);

    let source = self.layout.source_shapefile(iso, adm);
    let features = read_shapefile(&source)?;
    let features = prepare_features(features, iso, adm, self.layout.version())?;
    tracing::debug!(features = features.len(), "read source features");

    geojson::write_geojson(&out_dir.join(format!("{}.geojson", stem)), &stem, &features)?;
    sidecar::write_json(&out_dir.join(format!("{}-metaData.json", stem)), row)?;
    sidecar::write_text(&out_dir.join(format!("{}-metaData.txt", stem)), row)?;

    let staging = self.layout.staging_dir(iso, adm);
    if staging.exists() {
      fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;
    shp_writer::write_shapefile(&staging, &stem, &features)?;
    zip_dir(&staging, &out_dir.join(format!("{}-shp.zip", stem)), |_| true)?;

    let staged_bundle = self.layout.staged_bundle(iso, adm);
    zip_dir(out_dir, &staged_bundle, |p| !p.to_string_lossy().ends_with("-all.zip"))?;

    let citation_path = self.layout.citation_path();
    if !citation_path.is_file() {
      citation::write(&citation_path, self.layout.version())?;
    }
    append_file(&staged_bundle, &citation_path, &self.layout.citation_name())?;
    move_file(&staged_bundle, &final_bundle)?;

    if let Err(e) = fs::remove_dir_all(&staging) {
      tracing::debug!(error = %e, "could not clean staging directory");
    }

    Ok(BuildOutcome::Success {
      features: features.len(),
    })
  }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
  payload
    .downcast_ref::<&str>()
    .map(|s| s.to_string())
    .or_else(|| payload.downcast_ref::<String>().cloned())
    .unwrap_or_else(|| "unknown panic".to_string())
}
