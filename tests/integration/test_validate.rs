//! Tests for `gb-release validate`

use crate::helpers::*;
use anyhow::Result;

const OPEN: &str = "sourceData/gbOpen/QAT_ADM1.zip";

fn validate(ws: &TestWorkspace, changes: &str, extra: &[&str]) -> Result<std::process::Output> {
  let workspace = ws.path.to_string_lossy().to_string();
  let mut args = vec!["validate", "--fetch", "local", "--workspace", workspace.as_str(), "--changes", changes];
  args.extend_from_slice(extra);
  run_gb_release(&ws.path, &args)
}

#[test]
fn test_valid_archive_passes() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_archive(OPEN, Some(&meta_txt(&[])), &["license.png"])?;

  let output = validate(&ws, &format!("[{}]", OPEN), &[])?;
  let out = stdout(&output);

  assert!(output.status.success(), "stdout: {}\nstderr: {}", out, stderr(&output));
  assert!(out.contains("Metadata Check (1 of 1)"));
  assert!(out.contains("REQUIRED TESTS"));
  assert!(out.contains("1 passed, 0 failed"));
  Ok(())
}

#[test]
fn test_empty_change_set_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let output = validate(&ws, "[README.md,docs/guide.md]", &[])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("No zip files"));
  Ok(())
}

#[test]
fn test_wrong_folder_fails_the_batch() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let misplaced = "sourceData/gbAuthoritative/QAT_ADM1.zip";
  ws.add_archive(misplaced, Some(&meta_txt(&[])), &[])?;

  let output = validate(&ws, misplaced, &[])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stdout(&output).contains("0 passed, 1 failed"));
  Ok(())
}

#[test]
fn test_one_bad_archive_among_good_ones() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let good = OPEN;
  let bad_year = "sourceData/gbOpen/ARE_ADM1.zip";
  let no_meta = "sourceData/gbOpen/USA_ADM2.zip";
  ws.add_archive(good, Some(&meta_txt(&[])), &[])?;
  ws.add_archive(
    bad_year,
    Some(&meta_txt(&[("Boundary Representative of Year", "1990"), ("ISO-3166-1 (Alpha-3)", "ARE")])),
    &[],
  )?;
  ws.add_archive(no_meta, None, &["data.shp"])?;

  let output = validate(&ws, &format!("[{},{},{}]", good, bad_year, no_meta), &["--json"])?;
  assert_eq!(output.status.code(), Some(3));

  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  let archives = report["archives"].as_array().unwrap();
  assert_eq!(archives.len(), 3);
  assert_eq!(archives[0]["passed"], true);
  assert_eq!(archives[1]["passed"], false);
  assert_eq!(archives[2]["passed"], false);
  assert_eq!(archives[2]["meta_found"], false);
  Ok(())
}

#[test]
fn test_license_not_eligible_for_product() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let path = "sourceData/gbAuthoritative/QAT_ADM1.zip";
  ws.add_archive(
    path,
    Some(&meta_txt(&[("Release Type", "gbAuthoritative"), ("License", OPEN_ONLY_LICENSE)])),
    &[],
  )?;

  let output = validate(&ws, path, &["--json"])?;
  assert_eq!(output.status.code(), Some(3));
  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(report["archives"][0]["passed"], false);
  Ok(())
}

#[test]
fn test_missing_reference_table_is_config_error() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::remove_file(ws.path.join("actions/dta/gbLicenses.csv"))?;
  ws.add_archive(OPEN, Some(&meta_txt(&[])), &[])?;

  let output = validate(&ws, OPEN, &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("gbLicenses.csv"));
  Ok(())
}

#[test]
fn test_reference_paths_from_config() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::rename(ws.path.join("actions/dta"), ws.path.join("tables"))?;
  ws.write_file(
    "gbrelease.toml",
    "[reference]\niso_csv = \"tables/iso_3166_1_alpha_3.csv\"\nlicense_csv = \"tables/gbLicenses.csv\"\n",
  )?;
  ws.add_archive(OPEN, Some(&meta_txt(&[])), &[])?;

  let output = validate(&ws, OPEN, &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  Ok(())
}
