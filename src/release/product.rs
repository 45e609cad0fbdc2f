use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Release product flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductType {
  /// High Precision Single Country Unstandardized
  #[serde(rename = "HPSCU")]
  Hpscu,
  /// High Precision Single Country Globally Standardized
  #[serde(rename = "HPSCGS")]
  Hpscgs,
  /// Simplified Single Country Unstandardized
  #[serde(rename = "SSCU")]
  Sscu,
  /// Simplified Single Country Globally Standardized
  #[serde(rename = "SSCGS")]
  Sscgs,
  /// Contiguous Global Administrative Zones
  #[serde(rename = "CGAZ")]
  Cgaz,
}

impl ProductType {
  pub const ALL: [ProductType; 5] = [
    ProductType::Hpscu,
    ProductType::Hpscgs,
    ProductType::Sscu,
    ProductType::Sscgs,
    ProductType::Cgaz,
  ];

  /// Products built when none are configured
  pub fn default_set() -> &'static [ProductType] {
    &[
      ProductType::Hpscu,
      ProductType::Hpscgs,
      ProductType::Sscu,
      ProductType::Sscgs,
    ]
  }

  /// Directory name and identifier
  pub fn code(self) -> &'static str {
    match self {
      ProductType::Hpscu => "HPSCU",
      ProductType::Hpscgs => "HPSCGS",
      ProductType::Sscu => "SSCU",
      ProductType::Sscgs => "SSCGS",
      ProductType::Cgaz => "CGAZ",
    }
  }

  /// Whether the builder produces artifacts for this product (others only get directories)
  pub fn has_build_step(self) -> bool {
    matches!(self, ProductType::Hpscu)
  }
}

impl fmt::Display for ProductType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.code())
  }
}

impl FromStr for ProductType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let upper = s.trim().to_uppercase();
    Self::ALL.into_iter().find(|p| p.code() == upper).ok_or_else(|| {
      format!(
        "unknown product type '{}' (expected one of: {})",
        s,
        Self::ALL.map(|p| p.code()).join(", ")
      )
    })
  }
}
