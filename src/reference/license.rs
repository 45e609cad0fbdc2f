use super::ReleaseType;
use crate::core::config::ReferenceConfig;
use crate::core::error::{ConfigError, GbError, GbResult, ResultExt};
use std::collections::BTreeMap;
use std::path::Path;

/// Which products a license may be released under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LicenseEligibility {
  pub open: bool,
  pub authoritative: bool,
  pub humanitarian: bool,
}

impl LicenseEligibility {
  pub fn allows(&self, release: ReleaseType) -> bool {
    match release {
      ReleaseType::GbOpen => self.open,
      ReleaseType::GbAuthoritative => self.authoritative,
      ReleaseType::GbHumanitarian => self.humanitarian,
    }
  }
}

/// Accepted licenses keyed by lowercased, trimmed name
#[derive(Debug, Clone, Default)]
pub struct LicenseTable {
  licenses: BTreeMap<String, LicenseEligibility>,
}

impl LicenseTable {
  /// Load license definitions using the column layout from `reference`
  pub fn load(path: &Path, reference: &ReferenceConfig) -> GbResult<Self> {
    if !path.exists() {
      return Err(GbError::Config(ConfigError::ReferenceMissing {
        table: "license_csv",
        path: path.to_path_buf(),
      }));
    }

    let mut reader = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .from_path(path)
      .with_context(|| format!("Failed to open license table {}", path.display()))?;

    let flag = |record: &csv::StringRecord, column: usize| record.get(column).map(str::trim) == Some("Yes");

    let mut licenses = BTreeMap::new();
    for record in reader.records() {
      let record = record.with_context(|| format!("Failed to read license table {}", path.display()))?;
      let Some(name) = record.get(0).map(normalize_name).filter(|n| !n.is_empty()) else {
        continue;
      };
      licenses.insert(
        name,
        LicenseEligibility {
          open: flag(&record, reference.open_flag_column),
          authoritative: flag(&record, reference.authoritative_flag_column),
          humanitarian: flag(&record, reference.humanitarian_flag_column),
        },
      );
    }

    tracing::debug!(count = licenses.len(), path = %path.display(), "loaded license table");
    Ok(Self { licenses })
  }

  /// Build a table from literal entries
  #[cfg(test)]
  pub fn from_entries<I, S>(entries: I) -> Self
  where
    I: IntoIterator<Item = (S, LicenseEligibility)>,
    S: AsRef<str>,
  {
    Self {
      licenses: entries
        .into_iter()
        .map(|(name, elig)| (normalize_name(name.as_ref()), elig))
        .collect(),
    }
  }

  /// Look up a license by name (case-insensitive, whitespace-trimmed)
  pub fn get(&self, name: &str) -> Option<&LicenseEligibility> {
    self.licenses.get(&normalize_name(name))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.get(name).is_some()
  }

  /// Whether `name` is known and eligible for `release`
  pub fn eligible_for(&self, name: &str, release: ReleaseType) -> bool {
    self.get(name).is_some_and(|e| e.allows(release))
  }

  pub fn len(&self) -> usize {
    self.licenses.len()
  }

  pub fn is_empty(&self) -> bool {
    self.licenses.is_empty()
  }
}

fn normalize_name(name: &str) -> String {
  name.trim().to_lowercase()
}
