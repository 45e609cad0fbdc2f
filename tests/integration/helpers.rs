//! Test helpers for integration tests

use anyhow::{Context, Result};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const OPEN_LICENSE: &str = "Open Data Commons Open Database License 1.0";
pub const OPEN_ONLY_LICENSE: &str = "Creative Commons Attribution 4.0";

/// A workspace with the reference tables a metadata check needs
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    let dta = path.join("actions/dta");
    std::fs::create_dir_all(&dta)?;
    std::fs::write(
      dta.join("iso_3166_1_alpha_3.csv"),
      "Qatar,QA,QAT\nUnited Arab Emirates,AE,ARE\nUnited States,US,USA\n",
    )?;
    std::fs::write(
      dta.join("gbLicenses.csv"),
      format!(
        "license_name,notes,open,authoritative\n\"{}\",,Yes,Yes\n\"{}\",,Yes,No\n",
        OPEN_LICENSE, OPEN_ONLY_LICENSE
      ),
    )?;

    Ok(Self { _root: root, path })
  }

  /// Write a submission zip at `rel` containing `meta.txt` (if given) and optional extras
  pub fn add_archive(&self, rel: &str, meta: Option<&str>, extras: &[&str]) -> Result<PathBuf> {
    let full = self.path.join(rel);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let mut zip = ZipWriter::new(std::fs::File::create(&full)?);
    if let Some(meta) = meta {
      zip.start_file("meta.txt", SimpleFileOptions::default())?;
      zip.write_all(meta.as_bytes())?;
    }
    for name in extras {
      zip.start_file(*name, SimpleFileOptions::default())?;
      zip.write_all(b"data")?;
    }
    zip.finish()?;
    Ok(full)
  }

  pub fn write_file(&self, rel: &str, content: &str) -> Result<PathBuf> {
    let full = self.path.join(rel);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&full, content).with_context(|| format!("writing {}", full.display()))?;
    Ok(full)
  }
}

/// A complete, valid meta.txt with selective overrides
pub fn meta_txt(overrides: &[(&str, &str)]) -> String {
  let mut fields = vec![
    ("Boundary Representative of Year", "2019"),
    ("ISO-3166-1 (Alpha-3)", "QAT"),
    ("Boundary Type", "ADM1"),
    ("Canonical Boundary Type Name", "Municipality"),
    ("Source 1", "Planning and Statistics Authority"),
    ("Release Type", "gbOpen"),
    ("License", OPEN_LICENSE),
    ("License Notes", "Attribution required"),
    ("License Source", "https://example.org/license"),
    ("Link to Source Data", "https://example.org/data"),
    ("Other Notes", "none"),
  ];
  for &(key, value) in overrides {
    match fields.iter_mut().find(|(k, _)| *k == key) {
      Some(slot) => slot.1 = value,
      None => fields.push((key, value)),
    }
  }
  fields.iter().map(|(k, v)| format!("{}: {}\n", k, v)).collect()
}

/// Write a polygon shapefile with one square per name
pub fn write_squares(shp_path: &Path, names: &[&str]) -> Result<()> {
  if let Some(parent) = shp_path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  let name_field = FieldName::try_from("shapeName").map_err(|e| anyhow::anyhow!("{:?}", e))?;
  let table = TableWriterBuilder::new().add_character_field(name_field, 32);
  let mut writer = shapefile::Writer::from_path(shp_path, table)?;

  for (i, name) in names.iter().enumerate() {
    let x = i as f64;
    let polygon = Polygon::with_rings(vec![PolygonRing::Outer(vec![
      Point::new(x, 0.0),
      Point::new(x, 1.0),
      Point::new(x + 1.0, 1.0),
      Point::new(x + 1.0, 0.0),
      Point::new(x, 0.0),
    ])]);
    let mut record = Record::default();
    record.insert("shapeName".to_string(), FieldValue::Character(Some((*name).to_string())));
    writer.write_shape_and_record(&polygon, &record)?;
  }
  Ok(())
}

/// Run gb-release with CI-provided environment cleared
pub fn run_gb_release(dir: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new(env!("CARGO_BIN_EXE_gb-release"))
    .current_dir(dir)
    .env_remove("changes")
    .env_remove("GITHUB_WORKSPACE")
    .args(args)
    .output()
    .context("Failed to run gb-release")?;
  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
