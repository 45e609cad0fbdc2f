//! Tests for `gb-release build` and `gb-release citation`

use crate::helpers::*;
use anyhow::Result;
use std::fs;
use std::path::Path;

const NIGHTLY: &str = "nightly-20240801";

/// Snapshot, nightly table and one source shapefile for QAT/ADM1; ARE/ADM1 has none
fn seed_release(ws: &TestWorkspace) -> Result<()> {
  ws.write_file(&format!("gbRawData/metadata/{}.csv", NIGHTLY), "")?;
  ws.write_file(
    &format!("gbRawData/current/geoBoundaries-{}.csv", NIGHTLY),
    "boundaryISO,boundaryType,boundaryName,boundaryLicense\n\
     QAT,ADM1,Qatar,ODbL\n\
     ARE,ADM1,United Arab Emirates,\"CC BY 4.0\"\n",
  )?;
  write_squares(
    &ws.path.join("gbRawData/current/QAT/ADM1/shapeFixes/QAT_ADM1_fixedInternalTopology.shp"),
    &["Doha", "Al Rayyan", "Al Wakrah"],
  )?;
  Ok(())
}

fn shape_ids(path: &Path) -> Result<Vec<String>> {
  let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
  Ok(
    doc["features"]
      .as_array()
      .unwrap()
      .iter()
      .map(|f| f["properties"]["shapeID"].as_str().unwrap().to_string())
      .collect(),
  )
}

#[test]
fn test_build_isolates_failed_boundary() -> Result<()> {
  let ws = TestWorkspace::new()?;
  seed_release(&ws)?;

  let output = run_gb_release(&ws.path, &["build", "--jobs", "2", "--products", "HPSCU,SSCU"])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(stdout(&output).contains("1 built"));

  let out = ws.path.join("gbReleaseData/HPSCU/QAT/ADM1");
  assert!(out.join("geoBoundaries-3_0_0-QAT-ADM1-all.zip").is_file());
  assert!(out.join("geoBoundaries-3_0_0-QAT-ADM1-shp.zip").is_file());
  assert!(ws.path.join("gbReleaseData/SSCU/ARE/ADM1").is_dir());

  let critical = fs::read_to_string(ws.path.join("buildLogs/3_0_0/CRITICAL.txt"))?;
  assert!(critical.contains("ARE|ADM1"));
  assert!(!critical.contains("QAT|ADM1"));

  let table = fs::read_to_string(ws.path.join("gbReleaseData/geoBoundaries-3_0_0.csv"))?;
  assert!(table.contains("QAT-ADM1-3_0_0-G1"));
  assert!(table.contains("ARE-ADM1-3_0_0-G2"));
  assert!(ws.path.join("gbReleaseData/SSCU/geoBoundaries-3_0_0.csv").is_file());
  Ok(())
}

#[test]
fn test_shape_ids_stable_across_rebuilds() -> Result<()> {
  let ws = TestWorkspace::new()?;
  seed_release(&ws)?;
  let geojson = ws
    .path
    .join("gbReleaseData/HPSCU/QAT/ADM1/geoBoundaries-3_0_0-QAT-ADM1.geojson");

  run_gb_release(&ws.path, &["build", "--products", "HPSCU"])?;
  let first = shape_ids(&geojson)?;
  run_gb_release(&ws.path, &["build", "--products", "HPSCU"])?;
  let second = shape_ids(&geojson)?;

  assert_eq!(first, vec!["QAT-ADM1-3_0_0-B1", "QAT-ADM1-3_0_0-B2", "QAT-ADM1-3_0_0-B3"]);
  assert_eq!(first, second);
  Ok(())
}

#[test]
fn test_strict_mode_reports_failures() -> Result<()> {
  let ws = TestWorkspace::new()?;
  seed_release(&ws)?;

  let output = run_gb_release(&ws.path, &["build", "--products", "HPSCU", "--strict"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("1 of 2 boundaries failed"));
  Ok(())
}

#[test]
fn test_unresolved_critical_blocks_build() -> Result<()> {
  let ws = TestWorkspace::new()?;
  seed_release(&ws)?;
  ws.write_file(&format!("buildLogs/{}/CRITICAL.txt", NIGHTLY), "unresolved\n")?;

  let output = run_gb_release(&ws.path, &["build"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("still has critical errors"));
  assert!(!ws.path.join("gbReleaseData").exists());
  Ok(())
}

#[test]
fn test_dry_run_writes_nothing() -> Result<()> {
  let ws = TestWorkspace::new()?;
  seed_release(&ws)?;

  let output = run_gb_release(&ws.path, &["build", "--dry-run", "--json", "--products", "HPSCU"])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let plan: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(plan["nightly"], NIGHTLY);
  assert_eq!(plan["builds"].as_array().unwrap().len(), 2);
  assert_eq!(plan["builds"][0]["source_exists"], true);
  assert_eq!(plan["builds"][1]["source_exists"], false);
  assert!(!ws.path.join("gbReleaseData").exists());
  Ok(())
}

#[test]
fn test_version_override_and_config_root() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let data = TestWorkspace::new()?;
  seed_release(&data)?;
  ws.write_file(
    "gbrelease.toml",
    &format!("[release]\nroot = \"{}\"\nproducts = [\"HPSCU\"]\n", data.path.display()),
  )?;

  let output = run_gb_release(&ws.path, &["build", "--release-version", "4_0_0"])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(
    data
      .path
      .join("gbReleaseData/HPSCU/QAT/ADM1/geoBoundaries-4_0_0-QAT-ADM1-all.zip")
      .is_file()
  );
  Ok(())
}

#[test]
fn test_citation_command() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_gb_release(&ws.path, &["citation", "--release-version", "5_1_0"])?;
  assert!(output.status.success());
  assert!(stdout(&output).contains("geoBoundaries Version 5.1.0"));

  let output = run_gb_release(&ws.path, &["citation", "--output", "out/CITATION.txt"])?;
  assert!(output.status.success());
  assert!(fs::read_to_string(ws.path.join("out/CITATION.txt"))?.contains("Version 3.0.0"));
  Ok(())
}
