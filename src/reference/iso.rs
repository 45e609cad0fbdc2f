use crate::core::error::{ConfigError, GbError, GbResult, ResultExt};
use std::collections::BTreeSet;
use std::path::Path;

/// Accepted ISO 3166-1 alpha-3 codes
#[derive(Debug, Clone, Default)]
pub struct IsoTable {
  codes: BTreeSet<String>,
}

impl IsoTable {
  /// Load codes from `column` of a headerless CSV
  pub fn load(path: &Path, column: usize) -> GbResult<Self> {
    if !path.exists() {
      return Err(GbError::Config(ConfigError::ReferenceMissing {
        table: "iso_csv",
        path: path.to_path_buf(),
      }));
    }

    let mut reader = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .from_path(path)
      .with_context(|| format!("Failed to open ISO table {}", path.display()))?;

    let mut codes = BTreeSet::new();
    for record in reader.records() {
      let record = record.with_context(|| format!("Failed to read ISO table {}", path.display()))?;
      if let Some(code) = record.get(column).map(str::trim).filter(|c| !c.is_empty()) {
        codes.insert(code.to_string());
      }
    }

    tracing::debug!(count = codes.len(), path = %path.display(), "loaded ISO table");
    Ok(Self { codes })
  }

  /// Build a table from literal codes
  #[cfg(test)]
  pub fn from_codes<I, S>(codes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      codes: codes.into_iter().map(Into::into).collect(),
    }
  }

  /// Exact, case-sensitive membership
  pub fn contains(&self, code: &str) -> bool {
    self.codes.contains(code)
  }

  pub fn len(&self) -> usize {
    self.codes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.codes.is_empty()
  }
}
