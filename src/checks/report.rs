//! Per-archive and batch reports
//!
//! Findings are recorded in the order they happen so the printed report reads
//! like a trace of the scan.

use super::meta_file::MetaEntry;
use super::schema::Field;
use super::status::FieldStatus;
use crate::core::error::{GbError, GbResult, ValidationError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Severity level for a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  /// Informational message (not an issue)
  Info,
  /// Warning (non-blocking)
  Warning,
  /// Critical (fails the archive)
  Critical,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Info => write!(f, "INFO"),
      Severity::Warning => write!(f, "WARN"),
      Severity::Critical => write!(f, "CRITICAL ERROR"),
    }
  }
}

/// One observation made while checking an archive
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
  pub severity: Severity,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<Field>,
  pub message: String,
}

impl Finding {
  pub fn info(field: Option<Field>, message: impl Into<String>) -> Self {
    Self {
      severity: Severity::Info,
      field,
      message: message.into(),
    }
  }

  pub fn warning(field: Option<Field>, message: impl Into<String>) -> Self {
    Self {
      severity: Severity::Warning,
      field,
      message: message.into(),
    }
  }

  pub fn critical(field: Option<Field>, message: impl Into<String>) -> Self {
    Self {
      severity: Severity::Critical,
      field,
      message: message.into(),
    }
  }
}

/// Verdict and detail for one archive
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
  pub archive: String,
  pub meta_found: bool,
  pub passed: bool,
  pub entries: Vec<MetaEntry>,
  pub findings: Vec<Finding>,
  pub required: BTreeMap<Field, FieldStatus>,
  pub optional: BTreeMap<Field, FieldStatus>,
}

impl ArchiveReport {
  /// Report for an archive that could not be read at all
  pub fn unreadable(archive: impl Into<String>, finding: Finding) -> Self {
    Self {
      archive: archive.into(),
      meta_found: false,
      passed: false,
      entries: Vec::new(),
      findings: vec![finding],
      required: BTreeMap::new(),
      optional: BTreeMap::new(),
    }
  }

  pub fn criticals(&self) -> impl Iterator<Item = &Finding> {
    self.findings.iter().filter(|f| f.severity == Severity::Critical)
  }

  pub fn status(&self, field: Field) -> Option<&FieldStatus> {
    self.required.get(&field).or_else(|| self.optional.get(&field))
  }
}

/// All archives checked in one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
  pub archives: Vec<ArchiveReport>,
}

impl BatchReport {
  pub fn passed(&self) -> usize {
    self.archives.iter().filter(|a| a.passed).count()
  }

  pub fn failed(&self) -> usize {
    self.archives.len() - self.passed()
  }

  /// Process-level verdict: no archives, or any failure, is an error
  pub fn verdict(&self) -> GbResult<()> {
    if self.archives.is_empty() {
      return Err(GbError::Validation(ValidationError::NoArchives));
    }
    if self.failed() > 0 {
      return Err(GbError::Validation(ValidationError::ArchivesFailed {
        passed: self.passed(),
        failed: self.failed(),
      }));
    }
    Ok(())
  }
}

/// Render one field group as a fixed-width PASSED/FAILED table
pub fn format_field_table(title: &str, group: &BTreeMap<Field, FieldStatus>) -> String {
  let mut out = String::new();
  out.push_str("----------------------------\n");
  out.push_str(&format!("{:^28}\n", title));
  out.push_str("----------------------------\n");
  for (field, status) in group {
    let verdict = if status.is_satisfied() { "PASSED" } else { "FAILED" };
    out.push_str(&format!("{:<20}{:<12}\n", field.label(), verdict));
  }
  out
}
