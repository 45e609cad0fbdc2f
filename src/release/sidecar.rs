//! Metadata sidecars written next to each boundary's artifacts

use super::metadata::BoundaryRow;
use crate::core::error::{GbResult, ResultExt};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `{ column: value, ... }` for one metadata row
pub fn row_json(row: &BoundaryRow) -> Value {
  let map: Map<String, Value> = row
    .pairs()
    .map(|(column, value)| (column.to_string(), Value::String(value.to_string())))
    .collect();
  Value::Object(map)
}

pub fn write_json(path: &Path, row: &BoundaryRow) -> GbResult<()> {
  let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
  let mut writer = BufWriter::new(file);
  serde_json::to_writer(&mut writer, &row_json(row))?;
  writer.flush()?;
  Ok(())
}

/// One `column value` line per column, space-delimited and quoted where needed
pub fn write_text(path: &Path, row: &BoundaryRow) -> GbResult<()> {
  let mut writer = csv::WriterBuilder::new()
    .delimiter(b' ')
    .has_headers(false)
    .from_path(path)
    .with_context(|| format!("Failed to create {}", path.display()))?;
  for (column, value) in row.pairs() {
    writer.write_record([column, value])?;
  }
  writer.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::release::metadata::MetadataTable;
  use std::fs;
  use tempfile::TempDir;

  fn row() -> BoundaryRow {
    let table = MetadataTable::new(
      vec!["boundaryISO".into(), "boundaryType".into(), "boundarySource-1".into()],
      vec![vec!["QAT".into(), "ADM1".into(), "Ministry of Planning".into()]],
    );
    table.rows().remove(0)
  }

  #[test]
  fn test_json_sidecar() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meta.json");
    write_json(&path, &row()).unwrap();
    let parsed: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed["boundaryISO"], "QAT");
    assert_eq!(parsed["boundarySource-1"], "Ministry of Planning");
  }

  #[test]
  fn test_text_sidecar_quotes_values_with_spaces() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meta.txt");
    write_text(&path, &row()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "boundaryISO QAT");
    assert_eq!(lines[2], "boundarySource-1 \"Ministry of Planning\"");
  }
}
