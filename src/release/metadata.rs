//! Boundary metadata table
//!
//! The nightly pipeline publishes one CSV row per boundary. The builder loads
//! the table named by the newest snapshot, stamps release boundary IDs onto
//! it and hands one row to each build task.

use crate::core::error::{BuildError, GbError, GbResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

pub const ISO_COLUMN: &str = "boundaryISO";
pub const LEVEL_COLUMN: &str = "boundaryType";
pub const ID_COLUMN: &str = "boundaryID";

/// Headers plus string rows, in file order
#[derive(Debug, Clone)]
pub struct MetadataTable {
  headers: Arc<[String]>,
  rows: Vec<Vec<String>>,
}

/// One row with column lookup by name
#[derive(Debug, Clone)]
pub struct BoundaryRow {
  headers: Arc<[String]>,
  values: Vec<String>,
}

impl BoundaryRow {
  pub fn get(&self, column: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .position(|h| h == column)
      .and_then(|idx| self.values.get(idx))
      .map(String::as_str)
  }

  /// Country code, if present and non-blank
  pub fn iso(&self) -> Option<&str> {
    self.get(ISO_COLUMN).map(str::trim).filter(|v| !v.is_empty())
  }

  /// Boundary level (ADM0..ADM5), if present and non-blank
  pub fn level(&self) -> Option<&str> {
    self.get(LEVEL_COLUMN).map(str::trim).filter(|v| !v.is_empty())
  }

  /// (column, value) pairs in table order
  pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
    self.headers.iter().map(String::as_str).zip(self.values.iter().map(String::as_str))
  }

  /// `ISO|ADM` tag used in logs
  pub fn tag(&self) -> String {
    format!("{}|{}", self.iso().unwrap_or("?"), self.level().unwrap_or("?"))
  }
}

impl MetadataTable {
  pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
    let width = headers.len();
    let rows = rows
      .into_iter()
      .map(|mut row| {
        row.resize(width, String::new());
        row
      })
      .collect();
    Self {
      headers: headers.into(),
      rows,
    }
  }

  pub fn load(path: &Path) -> GbResult<Self> {
    let mut reader = csv::ReaderBuilder::new()
      .flexible(true)
      .from_path(path)
      .with_context(|| format!("Failed to open metadata table {}", path.display()))?;

    let headers: Vec<String> = reader
      .headers()
      .with_context(|| format!("Failed to read headers of {}", path.display()))?
      .iter()
      .map(str::to_string)
      .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
      let record = record.with_context(|| format!("Failed to read {}", path.display()))?;
      rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Self::new(headers, rows))
  }

  pub fn save(&self, path: &Path) -> GbResult<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(self.headers.iter())?;
    for row in &self.rows {
      writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
  }

  pub fn headers(&self) -> &[String] {
    &self.headers
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == name)
  }

  /// Stamp `<ISO>-<ADM>-<version>-G<n>` into boundaryID, 1-based in row order
  ///
  /// Adds the column when the nightly table does not have one.
  pub fn assign_boundary_ids(&mut self, version: &str) -> GbResult<()> {
    let iso_idx = self.column(ISO_COLUMN).ok_or_else(|| missing_column(ISO_COLUMN))?;
    let level_idx = self.column(LEVEL_COLUMN).ok_or_else(|| missing_column(LEVEL_COLUMN))?;

    let id_idx = match self.column(ID_COLUMN) {
      Some(idx) => idx,
      None => {
        let mut headers = self.headers.to_vec();
        headers.push(ID_COLUMN.to_string());
        self.headers = headers.into();
        for row in &mut self.rows {
          row.push(String::new());
        }
        self.headers.len() - 1
      }
    };

    for (n, row) in self.rows.iter_mut().enumerate() {
      row[id_idx] = format!("{}-{}-{}-G{}", row[iso_idx], row[level_idx], version, n + 1);
    }
    Ok(())
  }

  /// Rows sharing this table's headers
  pub fn rows(&self) -> Vec<BoundaryRow> {
    self
      .rows
      .iter()
      .map(|values| BoundaryRow {
        headers: Arc::clone(&self.headers),
        values: values.clone(),
      })
      .collect()
  }
}

fn missing_column(name: &str) -> GbError {
  GbError::with_help(
    format!("Metadata table has no `{}` column", name),
    "The nightly metadata CSV must carry boundaryISO and boundaryType.",
  )
}

/// Most recently created file in the snapshot directory
///
/// Falls back to modification time on filesystems without birth times.
pub fn latest_snapshot(dir: &Path) -> GbResult<PathBuf> {
  let entries = fs::read_dir(dir).map_err(|_| GbError::Build(BuildError::NoSnapshot { dir: dir.to_path_buf() }))?;

  let mut newest: Option<(SystemTime, PathBuf)> = None;
  for entry in entries {
    let entry = entry?;
    let meta = entry.metadata()?;
    if !meta.is_file() {
      continue;
    }
    let stamp = meta.created().or_else(|_| meta.modified())?;
    if newest.as_ref().is_none_or(|(best, _)| stamp > *best) {
      newest = Some((stamp, entry.path()));
    }
  }

  newest
    .map(|(_, path)| path)
    .ok_or_else(|| GbError::Build(BuildError::NoSnapshot { dir: dir.to_path_buf() }))
}

/// Nightly version tag: the snapshot's file name up to the first '.'
pub fn snapshot_version(snapshot: &Path) -> GbResult<String> {
  snapshot
    .file_name()
    .and_then(|n| n.to_str())
    .and_then(|n| n.split('.').next())
    .filter(|v| !v.is_empty())
    .map(str::to_string)
    .ok_or_else(|| GbError::message(format!("Cannot derive a version from {}", snapshot.display())))
}
