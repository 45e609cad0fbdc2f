//! Batch driver: snapshot selection, the critical-log gate and the parallel fan-out

use super::boundary::{BoundaryBuilder, BoundaryReport, BuildOutcome};
use super::buildlog::{BuildLog, LogLevel};
use super::citation;
use super::layout::ReleaseLayout;
use super::metadata::{MetadataTable, latest_snapshot, snapshot_version};
use super::product::ProductType;
use crate::core::error::{BuildError, GbError, GbResult, ResultExt};
use crate::ui::progress::MultiProgress;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Inputs resolved before any output is written
#[derive(Debug)]
pub struct PreparedBatch {
  pub snapshot: PathBuf,
  pub nightly: String,
  pub table_path: PathBuf,
  pub table: MetadataTable,
}

/// Resolve the newest snapshot, refuse to build over unresolved critical errors, load the table
pub fn prepare(layout: &ReleaseLayout) -> GbResult<PreparedBatch> {
  let snapshot = latest_snapshot(&layout.snapshot_dir())?;
  let nightly = snapshot_version(&snapshot)?;
  tracing::info!(snapshot = %snapshot.display(), %nightly, "selected metadata snapshot");

  let gate = BuildLog::new(layout.log_dir(&nightly));
  if gate.has_critical() {
    return Err(GbError::Build(BuildError::UnresolvedCritical {
      version: nightly,
      log: gate.path(LogLevel::Critical),
    }));
  }

  let table_path = layout.raw_table(&nightly);
  let table = MetadataTable::load(&table_path)?;

  Ok(PreparedBatch {
    snapshot,
    nightly,
    table_path,
    table,
  })
}

/// Worker count: explicit, else all cores but one (never below one)
pub fn worker_count(jobs: Option<usize>) -> usize {
  jobs.unwrap_or_else(|| {
    std::thread::available_parallelism()
      .map(|n| n.get().saturating_sub(1))
      .unwrap_or(1)
  })
  .max(1)
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
  pub nightly: String,
  pub version: String,
  pub boundaries: Vec<BoundaryReport>,
}

impl ReleaseReport {
  fn count(&self, pred: impl Fn(&BuildOutcome) -> bool + Copy) -> usize {
    self.boundaries.iter().map(|b| b.count(pred)).sum()
  }

  pub fn built(&self) -> usize {
    self.count(|o| matches!(o, BuildOutcome::Success { .. }))
  }

  pub fn skipped(&self) -> usize {
    self.count(|o| matches!(o, BuildOutcome::Skipped(_)))
  }

  pub fn failed(&self) -> usize {
    self.count(BuildOutcome::is_failure)
  }

  pub fn failed_boundaries(&self) -> impl Iterator<Item = &BoundaryReport> {
    self.boundaries.iter().filter(|b| b.failed())
  }

  /// Error in strict mode when any boundary failed
  pub fn strict_verdict(&self) -> GbResult<()> {
    let failed = self.failed_boundaries().count();
    if failed > 0 {
      return Err(GbError::Build(BuildError::BoundariesFailed {
        failed,
        total: self.boundaries.len(),
      }));
    }
    Ok(())
  }
}

/// Stamp IDs, persist the release table, then build every row in parallel
pub fn run(
  layout: &ReleaseLayout,
  prepared: PreparedBatch,
  products: &[ProductType],
  jobs: usize,
  progress: Option<&MultiProgress>,
) -> GbResult<ReleaseReport> {
  let PreparedBatch { nightly, mut table, .. } = prepared;

  table.assign_boundary_ids(layout.version())?;
  let release_table = layout.release_table();
  table.save(&release_table)?;

  for &product in products {
    fs::create_dir_all(layout.product_dir(product))?;
    let copy = layout.product_table(product);
    fs::copy(&release_table, &copy)
      .with_context(|| format!("Failed to copy release table to {}", copy.display()))?;
  }

  fs::create_dir_all(layout.tmp_dir())?;
  citation::write(&layout.citation_path(), layout.version())?;

  let rows = table.rows();
  let bar = progress.map(|p| p.add_bar(rows.len(), format!("Building {} boundaries", rows.len())));
  let builder = BoundaryBuilder::new(layout, products);

  let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
  tracing::info!(rows = rows.len(), jobs, "dispatching boundary builds");

  let boundaries: Vec<BoundaryReport> = pool.install(|| {
    rows
      .par_iter()
      .map(|row| {
        let report = builder.build_isolated(row);
        if let (Some(p), Some(bar)) = (progress, bar.as_ref()) {
          p.inc(bar);
        }
        report
      })
      .collect()
  });

  Ok(ReleaseReport {
    nightly,
    version: layout.version().to_string(),
    boundaries,
  })
}
