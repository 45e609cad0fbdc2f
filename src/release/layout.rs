//! Filesystem layout of a release tree
//!
//! ```text
//! <root>/
//!   gbRawData/metadata/*                                   nightly snapshots
//!   gbRawData/current/geoBoundaries-<nightly>.csv          full metadata table
//!   gbRawData/current/<ISO>/<ADM>/shapeFixes/<ISO>_<ADM>_fixedInternalTopology.shp
//!   gbRawData/currentZips/<ISO>_<ADM>.zip                  retrieved submissions
//!   gbReleaseData/geoBoundaries-<version>.csv
//!   gbReleaseData/<PRODUCT>/<ISO>/<ADM>/                   artifacts
//!   buildLogs/<version>/{WARN,CRITICAL}.txt
//!   tmp/
//! ```

use super::product::ProductType;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ReleaseLayout {
  root: PathBuf,
  version: String,
}

impl ReleaseLayout {
  pub fn new(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      version: version.into(),
    }
  }

  pub fn version(&self) -> &str {
    &self.version
  }

  fn raw_dir(&self) -> PathBuf {
    self.root.join("gbRawData")
  }

  pub fn snapshot_dir(&self) -> PathBuf {
    self.raw_dir().join("metadata")
  }

  pub fn raw_table(&self, nightly: &str) -> PathBuf {
    self.raw_dir().join("current").join(format!("geoBoundaries-{}.csv", nightly))
  }

  pub fn source_shapefile(&self, iso: &str, adm: &str) -> PathBuf {
    self
      .raw_dir()
      .join("current")
      .join(iso)
      .join(adm)
      .join("shapeFixes")
      .join(format!("{}_{}_fixedInternalTopology.shp", iso, adm))
  }

  pub fn raw_archive(&self, iso: &str, adm: &str) -> PathBuf {
    self.raw_dir().join("currentZips").join(format!("{}_{}.zip", iso, adm))
  }

  pub fn release_dir(&self) -> PathBuf {
    self.root.join("gbReleaseData")
  }

  fn table_name(&self) -> String {
    format!("geoBoundaries-{}.csv", self.version)
  }

  pub fn release_table(&self) -> PathBuf {
    self.release_dir().join(self.table_name())
  }

  pub fn product_dir(&self, product: ProductType) -> PathBuf {
    self.release_dir().join(product.code())
  }

  pub fn product_table(&self, product: ProductType) -> PathBuf {
    self.product_dir(product).join(self.table_name())
  }

  pub fn output_dir(&self, product: ProductType, iso: &str, adm: &str) -> PathBuf {
    self.product_dir(product).join(iso).join(adm)
  }

  /// `geoBoundaries-<version>-<ISO>-<ADM>`
  pub fn artifact_stem(&self, iso: &str, adm: &str) -> String {
    format!("geoBoundaries-{}-{}-{}", self.version, iso, adm)
  }

  /// Log directory for a version tag (release or nightly)
  pub fn log_dir(&self, version: &str) -> PathBuf {
    self.root.join("buildLogs").join(version)
  }

  pub fn tmp_dir(&self) -> PathBuf {
    self.root.join("tmp")
  }

  /// Scratch directory holding one boundary's shapefile before zipping
  pub fn staging_dir(&self, iso: &str, adm: &str) -> PathBuf {
    self.tmp_dir().join(format!("{}{}", iso, adm))
  }

  pub fn staged_bundle(&self, iso: &str, adm: &str) -> PathBuf {
    self.tmp_dir().join(format!("{}-all.zip", self.artifact_stem(iso, adm)))
  }

  pub fn citation_name(&self) -> String {
    format!("CITATION-AND-USE-geoBoundaries-{}.txt", self.version)
  }

  pub fn citation_path(&self) -> PathBuf {
    self.tmp_dir().join(self.citation_name())
  }
}
