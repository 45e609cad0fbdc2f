//! Immutable lookup tables for metadata validation
//!
//! Both tables are loaded once per run and passed by reference into the
//! validator. Nothing here is global.

mod iso;
mod license;

pub use iso::IsoTable;
pub use license::{LicenseEligibility, LicenseTable};

use serde::Serialize;
use std::fmt;

/// Product licensing track a submission is released under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ReleaseType {
  GbOpen,
  GbAuthoritative,
  GbHumanitarian,
}

impl ReleaseType {
  pub const ALL: [ReleaseType; 3] = [
    ReleaseType::GbOpen,
    ReleaseType::GbAuthoritative,
    ReleaseType::GbHumanitarian,
  ];

  /// Parse a declared release type, ignoring case and surrounding whitespace
  pub fn parse(value: &str) -> Option<Self> {
    let lower = value.trim().to_lowercase();
    Self::ALL.into_iter().find(|t| t.identifier() == lower)
  }

  /// Lowercase identifier, which is also the directory name submissions live under
  pub fn identifier(self) -> &'static str {
    match self {
      ReleaseType::GbOpen => "gbopen",
      ReleaseType::GbAuthoritative => "gbauthoritative",
      ReleaseType::GbHumanitarian => "gbhumanitarian",
    }
  }

  /// Display name used in reports
  pub fn display_name(self) -> &'static str {
    match self {
      ReleaseType::GbOpen => "gbOpen",
      ReleaseType::GbAuthoritative => "gbAuthoritative",
      ReleaseType::GbHumanitarian => "gbHumanitarian",
    }
  }
}

impl fmt::Display for ReleaseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.display_name())
  }
}
