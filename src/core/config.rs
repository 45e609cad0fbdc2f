use crate::core::error::{ConfigError, GbError, GbResult, ResultExt};
use crate::release::product::ProductType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for gb-release
/// Searched in order: gbrelease.toml, .gbrelease.toml, .config/gbrelease.toml
///
/// Every section is optional; a workspace without a config file runs on defaults
/// that match the gbRelease repository layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GbConfig {
  #[serde(default)]
  pub reference: ReferenceConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
}

/// Where the validator's lookup tables live and which columns to read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
  /// ISO 3166-1 alpha-3 table, relative to the workspace
  #[serde(default = "default_iso_csv")]
  pub iso_csv: PathBuf,

  /// License definitions table, relative to the workspace
  #[serde(default = "default_license_csv")]
  pub license_csv: PathBuf,

  /// Column holding the alpha-3 code
  #[serde(default = "default_iso_column")]
  pub iso_column: usize,

  /// Column holding the gbOpen "Yes" flag
  #[serde(default = "default_open_column")]
  pub open_flag_column: usize,

  /// Column holding the gbAuthoritative "Yes" flag
  #[serde(default = "default_authoritative_column")]
  pub authoritative_flag_column: usize,

  /// Column holding the gbHumanitarian "Yes" flag.
  /// Defaults to the authoritative column, which is what the published table is read with.
  #[serde(default = "default_humanitarian_column")]
  pub humanitarian_flag_column: usize,
}

fn default_iso_csv() -> PathBuf {
  PathBuf::from("actions/dta/iso_3166_1_alpha_3.csv")
}

fn default_license_csv() -> PathBuf {
  PathBuf::from("actions/dta/gbLicenses.csv")
}

fn default_iso_column() -> usize {
  2
}

fn default_open_column() -> usize {
  2
}

fn default_authoritative_column() -> usize {
  3
}

fn default_humanitarian_column() -> usize {
  3
}

impl Default for ReferenceConfig {
  fn default() -> Self {
    Self {
      iso_csv: default_iso_csv(),
      license_csv: default_license_csv(),
      iso_column: default_iso_column(),
      open_flag_column: default_open_column(),
      authoritative_flag_column: default_authoritative_column(),
      humanitarian_flag_column: default_humanitarian_column(),
    }
  }
}

impl ReferenceConfig {
  /// Validate column layout
  pub fn validate(&self) -> GbResult<()> {
    if self.open_flag_column == 0 || self.authoritative_flag_column == 0 || self.humanitarian_flag_column == 0 {
      return Err(GbError::Config(ConfigError::InvalidField {
        field: "reference.*_flag_column".to_string(),
        reason: "column 0 holds the license name".to_string(),
      }));
    }
    if self.open_flag_column == self.authoritative_flag_column {
      return Err(GbError::Config(ConfigError::InvalidField {
        field: "reference.open_flag_column".to_string(),
        reason: format!(
          "open and authoritative eligibility cannot share column {}",
          self.open_flag_column
        ),
      }));
    }
    Ok(())
  }

  /// Whether humanitarian eligibility is read from the authoritative column
  pub fn humanitarian_shares_column(&self) -> bool {
    self.humanitarian_flag_column == self.authoritative_flag_column
  }
}

/// Release build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Release version tag stamped on every identifier and artifact (e.g. "3_0_0")
  #[serde(default = "default_version")]
  pub version: String,

  /// Root holding gbRawData/, gbReleaseData/, buildLogs/ and tmp/ (default: workspace root)
  #[serde(default)]
  pub root: Option<PathBuf>,

  /// Product types to build
  #[serde(default = "default_products")]
  pub products: Vec<ProductType>,

  /// Worker count (default: available cores minus one)
  #[serde(default)]
  pub jobs: Option<usize>,
}

fn default_version() -> String {
  "3_0_0".to_string()
}

fn default_products() -> Vec<ProductType> {
  ProductType::default_set().to_vec()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      version: default_version(),
      root: None,
      products: default_products(),
      jobs: None,
    }
  }
}

impl ReleaseConfig {
  /// Validate release settings
  pub fn validate(&self) -> GbResult<()> {
    validate_version(&self.version)?;

    if self.products.is_empty() {
      return Err(GbError::Config(ConfigError::InvalidField {
        field: "release.products".to_string(),
        reason: "at least one product type is required".to_string(),
      }));
    }

    if self.jobs == Some(0) {
      return Err(GbError::Config(ConfigError::InvalidField {
        field: "release.jobs".to_string(),
        reason: "must be at least 1".to_string(),
      }));
    }

    Ok(())
  }
}

/// Version tags end up in file names, so they must be plain path segments
pub fn validate_version(version: &str) -> GbResult<()> {
  if version.trim().is_empty() {
    return Err(GbError::Config(ConfigError::InvalidField {
      field: "release.version".to_string(),
      reason: "must not be empty".to_string(),
    }));
  }
  if version.contains('/') || version.contains('\\') || version == "." || version == ".." {
    return Err(GbError::Config(ConfigError::InvalidField {
      field: "release.version".to_string(),
      reason: format!("'{}' is not a valid path segment", version),
    }));
  }
  Ok(())
}

impl GbConfig {
  /// Find config file in search order
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("gbrelease.toml"),
      path.join(".gbrelease.toml"),
      path.join(".config").join("gbrelease.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the workspace, falling back to defaults when no file exists
  pub fn load(path: &Path) -> GbResult<Self> {
    let config = match Self::find_config_path(path) {
      Some(config_path) => {
        let content = fs::read_to_string(&config_path)
          .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
        let config: GbConfig = toml_edit::de::from_str(&content)
          .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;
        config
          .validate()
          .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
        config
      }
      None => GbConfig::default(),
    };

    Ok(config)
  }

  /// Validate every section
  pub fn validate(&self) -> GbResult<()> {
    self.reference.validate()?;
    self.release.validate()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let config = GbConfig::load(dir.path()).unwrap();
    assert_eq!(config.release.version, "3_0_0");
    assert_eq!(config.reference.iso_column, 2);
    assert!(config.reference.humanitarian_shares_column());
    assert_eq!(config.release.products, ProductType::default_set().to_vec());
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
      dir.path().join("gbrelease.toml"),
      r#"
[release]
version = "4_0_0"
products = ["HPSCU"]

[reference]
humanitarian_flag_column = 4
"#,
    )
    .unwrap();

    let config = GbConfig::load(dir.path()).unwrap();
    assert_eq!(config.release.version, "4_0_0");
    assert_eq!(config.release.products, vec![ProductType::Hpscu]);
    assert_eq!(config.reference.humanitarian_flag_column, 4);
    assert!(!config.reference.humanitarian_shares_column());
    assert_eq!(config.reference.license_csv, default_license_csv());
  }

  #[test]
  fn test_search_order_prefers_root_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".config")).unwrap();
    fs::write(dir.path().join(".config/gbrelease.toml"), "").unwrap();
    fs::write(dir.path().join("gbrelease.toml"), "").unwrap();
    assert_eq!(
      GbConfig::find_config_path(dir.path()),
      Some(dir.path().join("gbrelease.toml"))
    );
  }

  #[test]
  fn test_rejects_bad_version_and_empty_products() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gbrelease.toml"), "[release]\nversion = \"../x\"\n").unwrap();
    assert!(GbConfig::load(dir.path()).is_err());

    fs::write(dir.path().join("gbrelease.toml"), "[release]\nproducts = []\n").unwrap();
    assert!(GbConfig::load(dir.path()).is_err());
  }

  #[test]
  fn test_rejects_name_column_as_flag() {
    let reference = ReferenceConfig {
      open_flag_column: 0,
      ..ReferenceConfig::default()
    };
    assert!(reference.validate().is_err());
  }

  #[test]
  fn test_rejects_shared_open_and_authoritative_column() {
    let dir = TempDir::new().unwrap();
    fs::write(
      dir.path().join("gbrelease.toml"),
      "[reference]\nopen_flag_column = 3\nauthoritative_flag_column = 3\n",
    )
    .unwrap();
    let err = GbConfig::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("share column 3"));
  }
}
