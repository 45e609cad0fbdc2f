//! Helpers for CI-provided inputs

use std::path::Path;

/// Check whether a changed path is a submission archive (`.zip`, any case)
pub fn is_archive_path(path: &str) -> bool {
  Path::new(path.trim())
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// Parse a change list as CI hands it over
///
/// Accepts the bracketed form `[a.zip,b/c.zip]` as well as a bare
/// comma-separated list. Items are trimmed and empty items dropped; quotes
/// around items are removed.
pub fn parse_change_list(raw: &str) -> Vec<String> {
  let inner = raw.trim();
  let inner = inner.strip_prefix('[').unwrap_or(inner);
  let inner = inner.strip_suffix(']').unwrap_or(inner);

  inner
    .split(',')
    .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\'').trim())
    .filter(|item| !item.is_empty())
    .map(str::to_string)
    .collect()
}

/// Render a path with forward slashes, for messages and zip entry names
pub fn display_path(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
