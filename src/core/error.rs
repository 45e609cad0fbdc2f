//! Error types for gb-release with contextual messages and exit codes
//!
//! One error type covers both pipelines. Every variant maps to an exit code and
//! most carry a help message pointing the user at the fix.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for gb-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files, blocked build)
  User = 1,
  /// System error (I/O, archives, external tools)
  System = 2,
  /// Validation failure (metadata checks failed, strict build failures)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for gb-release
#[derive(Debug)]
pub enum GbError {
  /// Configuration errors
  Config(ConfigError),

  /// Metadata validation batch failures
  Validation(ValidationError),

  /// Release build failures
  Build(BuildError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl GbError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    GbError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    GbError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// I/O errors are folded into a message so the context is not lost.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      GbError::Message { message, context, help } => GbError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      GbError::Io(err) => GbError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      GbError::Config(_) => ExitCode::User,
      GbError::Validation(_) => ExitCode::Validation,
      GbError::Build(BuildError::UnresolvedCritical { .. }) => ExitCode::User,
      GbError::Build(BuildError::NoSnapshot { .. }) => ExitCode::User,
      GbError::Build(BuildError::BoundariesFailed { .. }) => ExitCode::Validation,
      GbError::Io(_) => ExitCode::System,
      GbError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      GbError::Config(e) => e.help_message(),
      GbError::Validation(e) => e.help_message(),
      GbError::Build(e) => e.help_message(),
      GbError::Message { help, .. } => help.clone(),
      GbError::Io(_) => None,
    }
  }
}

impl fmt::Display for GbError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GbError::Config(e) => write!(f, "{}", e),
      GbError::Validation(e) => write!(f, "{}", e),
      GbError::Build(e) => write!(f, "{}", e),
      GbError::Io(e) => write!(f, "I/O error: {}", e),
      GbError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for GbError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      GbError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for GbError {
  fn from(err: io::Error) -> Self {
    GbError::Io(err)
  }
}

impl From<String> for GbError {
  fn from(msg: String) -> Self {
    GbError::message(msg)
  }
}

impl From<&str> for GbError {
  fn from(msg: &str) -> Self {
    GbError::message(msg)
  }
}

impl From<toml_edit::de::Error> for GbError {
  fn from(err: toml_edit::de::Error) -> Self {
    GbError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for GbError {
  fn from(err: serde_json::Error) -> Self {
    GbError::message(format!("JSON error: {}", err))
  }
}

impl From<csv::Error> for GbError {
  fn from(err: csv::Error) -> Self {
    GbError::message(format!("CSV error: {}", err))
  }
}

impl From<zip::result::ZipError> for GbError {
  fn from(err: zip::result::ZipError) -> Self {
    GbError::message(format!("Zip error: {}", err))
  }
}

impl From<shapefile::Error> for GbError {
  fn from(err: shapefile::Error) -> Self {
    GbError::message(format!("Shapefile error: {}", err))
  }
}

impl From<walkdir::Error> for GbError {
  fn from(err: walkdir::Error) -> Self {
    GbError::message(format!("Directory walk error: {}", err))
  }
}

impl From<rayon::ThreadPoolBuildError> for GbError {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    GbError::message(format!("Failed to start worker pool: {}", err))
  }
}

impl From<std::path::StripPrefixError> for GbError {
  fn from(err: std::path::StripPrefixError) -> Self {
    GbError::message(format!("Path error: {}", err))
  }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
  /// A reference table could not be found
  ReferenceMissing { table: &'static str, path: PathBuf },

  /// A field holds a value we cannot use
  InvalidField { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::ReferenceMissing { table, .. } => Some(format!(
        "Point [reference].{} in gbrelease.toml at the table, or pass --workspace for the repository root.",
        table
      )),
      ConfigError::InvalidField { field, .. } => Some(format!("Fix `{}` in gbrelease.toml.", field)),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::ReferenceMissing { table, path } => {
        write!(f, "Reference table `{}` not found at {}", table, path.display())
      }
      ConfigError::InvalidField { field, reason } => {
        write!(f, "Invalid configuration value for `{}`: {}", field, reason)
      }
    }
  }
}

/// Metadata validation batch errors
#[derive(Debug)]
pub enum ValidationError {
  /// The change list held no archives
  NoArchives,

  /// At least one archive failed its metadata checks
  ArchivesFailed { passed: usize, failed: usize },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::NoArchives => {
        Some("Submissions must include at least one .zip archive containing meta.txt.".to_string())
      }
      ValidationError::ArchivesFailed { .. } => {
        Some("Check the report above to see which fields failed in each archive.".to_string())
      }
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::NoArchives => write!(f, "No zip files found in the change set"),
      ValidationError::ArchivesFailed { passed, failed } => write!(
        f,
        "At least one metadata check failed ({} passed, {} failed)",
        passed, failed
      ),
    }
  }
}

/// Release build errors that stop a batch (per-boundary failures never do)
#[derive(Debug)]
pub enum BuildError {
  /// The nightly snapshot still has a critical log
  UnresolvedCritical { version: String, log: PathBuf },

  /// No metadata snapshot to build from
  NoSnapshot { dir: PathBuf },

  /// Some boundaries failed and strict mode was requested
  BoundariesFailed { failed: usize, total: usize },
}

impl BuildError {
  fn help_message(&self) -> Option<String> {
    match self {
      BuildError::UnresolvedCritical { log, .. } => Some(format!(
        "Resolve the errors listed in {} and remove the file before building.",
        log.display()
      )),
      BuildError::NoSnapshot { .. } => Some("Fetch the nightly metadata snapshot before building.".to_string()),
      BuildError::BoundariesFailed { .. } => Some("See CRITICAL.txt in the build log directory.".to_string()),
    }
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::UnresolvedCritical { version, .. } => {
        write!(f, "You cannot create this build, as {} still has critical errors", version)
      }
      BuildError::NoSnapshot { dir } => write!(f, "No metadata snapshot found in {}", dir.display()),
      BuildError::BoundariesFailed { failed, total } => {
        write!(f, "{} of {} boundaries failed to build", failed, total)
      }
    }
  }
}

/// Result type alias for gb-release
pub type GbResult<T> = Result<T, GbError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> GbResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> GbResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<GbError>,
{
  fn context(self, ctx: impl Into<String>) -> GbResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> GbResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &GbError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for GbError {
  fn from(err: anyhow::Error) -> Self {
    GbError::message(err.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes_by_category() {
    assert_eq!(GbError::Validation(ValidationError::NoArchives).exit_code(), ExitCode::Validation);
    assert_eq!(
      GbError::Build(BuildError::UnresolvedCritical {
        version: "nightly".into(),
        log: PathBuf::from("CRITICAL.txt"),
      })
      .exit_code(),
      ExitCode::User
    );
    assert_eq!(GbError::Io(io::Error::other("boom")).exit_code(), ExitCode::System);
    assert_eq!(ExitCode::Validation.as_i32(), 3);
  }

  #[test]
  fn test_context_chains_onto_messages() {
    let err = GbError::message("inner").context("outer");
    assert_eq!(err.to_string(), "inner\nouter");
  }

  #[test]
  fn test_context_keeps_io_detail() {
    let res: Result<(), io::Error> = Err(io::Error::other("disk full"));
    let err = res.context("writing sidecar").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("disk full"));
    assert!(text.contains("writing sidecar"));
  }

  #[test]
  fn test_failed_tally_in_message() {
    let err = GbError::Validation(ValidationError::ArchivesFailed { passed: 2, failed: 1 });
    assert!(err.to_string().contains("2 passed, 1 failed"));
    assert!(err.help_message().is_some());
  }
}
