//! Field schema for meta.txt
//!
//! Keys are matched loosely: lowercase the key, then test substrings. Every
//! field whose matcher accepts a key fires for that line, in declaration order,
//! so one line can feed several fields (`ISO Boundary Type` is both an ISO and
//! a boundary type line).

use serde::Serialize;
use std::fmt;

/// Values treated as "not provided"
pub const NULL_SENTINELS: [&str; 3] = ["na", "nan", "null"];

/// Accepted boundary types
pub const VALID_BOUNDARY_TYPES: [&str; 6] = ["ADM0", "ADM1", "ADM2", "ADM3", "ADM4", "ADM5"];

/// Every field tracked for an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
  Year,
  Iso,
  BoundaryType,
  Source,
  ReleaseType,
  License,
  LicenseSource,
  DataSource,
  /// Derived: archive sits under the directory named by its release type
  ReleaseTypeFolder,
  Canonical,
  /// Derived: license.png / license.jpg present
  LicenseImage,
  LicenseNotes,
  OtherNotes,
}

/// Whether a missing field fails the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
  Required,
  Optional,
}

impl Field {
  /// Fields matched against meta.txt keys, in the order they fire
  pub const KEYED: [Field; 11] = [
    Field::Year,
    Field::BoundaryType,
    Field::Iso,
    Field::Canonical,
    Field::Source,
    Field::ReleaseType,
    Field::License,
    Field::LicenseNotes,
    Field::LicenseSource,
    Field::DataSource,
    Field::OtherNotes,
  ];

  pub const REQUIRED: [Field; 9] = [
    Field::Year,
    Field::Iso,
    Field::BoundaryType,
    Field::Source,
    Field::ReleaseType,
    Field::License,
    Field::LicenseSource,
    Field::DataSource,
    Field::ReleaseTypeFolder,
  ];

  pub const OPTIONAL: [Field; 4] = [
    Field::Canonical,
    Field::LicenseImage,
    Field::LicenseNotes,
    Field::OtherNotes,
  ];

  pub fn requirement(self) -> Requirement {
    if Self::OPTIONAL.contains(&self) {
      Requirement::Optional
    } else {
      Requirement::Required
    }
  }

  /// Whether this field's rule applies to `key`
  ///
  /// Derived fields never match a key.
  pub fn matches(self, key: &str) -> bool {
    let key = key.to_lowercase();
    match self {
      Field::Year => key.contains("year"),
      Field::BoundaryType => key.contains("boundary type") && !key.contains("name"),
      Field::Iso => key.contains("iso"),
      Field::Canonical => key.contains("canonical"),
      Field::Source => key.contains("source") && !key.contains("license") && !key.contains("data"),
      Field::ReleaseType => key.contains("release type"),
      Field::License => key == "license",
      Field::LicenseNotes => key.contains("license notes"),
      Field::LicenseSource => key.contains("license source"),
      Field::DataSource => key.contains("link to source data"),
      Field::OtherNotes => key.contains("other notes"),
      Field::ReleaseTypeFolder | Field::LicenseImage => false,
    }
  }

  /// All keyed fields that fire for `key`, in firing order
  pub fn matching(key: &str) -> impl Iterator<Item = Field> + '_ {
    Self::KEYED.into_iter().filter(move |f| f.matches(key))
  }

  /// Short label used in reports
  pub fn label(self) -> &'static str {
    match self {
      Field::Year => "year",
      Field::Iso => "iso",
      Field::BoundaryType => "bType",
      Field::Source => "source",
      Field::ReleaseType => "releaseType",
      Field::License => "license",
      Field::LicenseSource => "licenseSource",
      Field::DataSource => "dataSource",
      Field::ReleaseTypeFolder => "releaseTypeFolder",
      Field::Canonical => "canonical",
      Field::LicenseImage => "licenseImage",
      Field::LicenseNotes => "licenseNotes",
      Field::OtherNotes => "otherNotes",
    }
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.label())
  }
}

/// Value is present: non-blank once spaces are removed, and not a null sentinel
pub fn is_provided(value: &str) -> bool {
  !value.replace(' ', "").is_empty() && !is_null_sentinel(value)
}

pub fn is_null_sentinel(value: &str) -> bool {
  let lower = value.trim().to_lowercase();
  NULL_SENTINELS.contains(&lower.as_str())
}
