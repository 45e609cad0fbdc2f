//! Append-only build logs (`WARN.txt`, `CRITICAL.txt`)
//!
//! Workers append concurrently. Each entry is formatted up front and written
//! with a single `write_all` on an `O_APPEND` handle so lines never interleave.

use crate::core::error::{GbResult, ResultExt};
use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  Warn,
  Critical,
}

impl LogLevel {
  fn file_name(self) -> &'static str {
    match self {
      LogLevel::Warn => "WARN.txt",
      LogLevel::Critical => "CRITICAL.txt",
    }
  }
}

#[derive(Debug, Clone)]
pub struct BuildLog {
  dir: PathBuf,
}

impl BuildLog {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn path(&self, level: LogLevel) -> PathBuf {
    self.dir.join(level.file_name())
  }

  /// `<timestamp> <tag> <message>`, with a multi-line message joined by `; `
  pub fn append(&self, level: LogLevel, tag: &str, message: &str) -> GbResult<()> {
    fs::create_dir_all(&self.dir)?;
    let path = self.path(level);
    let line = format!(
      "{} {} {}\n",
      Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
      tag,
      message.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join("; ")
    );
    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(())
  }

  pub fn warn(&self, tag: &str, message: &str) {
    tracing::warn!(tag, "{}", message);
    if let Err(e) = self.append(LogLevel::Warn, tag, message) {
      tracing::error!(tag, error = %e, "failed to write WARN log");
    }
  }

  pub fn critical(&self, tag: &str, message: &str) {
    tracing::error!(tag, "{}", message);
    if let Err(e) = self.append(LogLevel::Critical, tag, message) {
      tracing::error!(tag, error = %e, "failed to write CRITICAL log");
    }
  }

  pub fn has_critical(&self) -> bool {
    self.path(LogLevel::Critical).is_file()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use tempfile::TempDir;

  #[test]
  fn test_lines_are_appended() {
    let dir = TempDir::new().unwrap();
    let log = BuildLog::new(dir.path().join("buildLogs/3_0_0"));
    assert!(!log.has_critical());

    log.warn("QAT|ADM1", "stale artifact");
    log.critical("QAT|ADM1", "shapefile missing");
    log.critical("ARE|ADM2", "shapefile missing");

    assert!(log.has_critical());
    let critical = fs::read_to_string(log.path(LogLevel::Critical)).unwrap();
    let lines: Vec<&str> = critical.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" QAT|ADM1 shapefile missing"));
    assert!(lines[1].contains("ARE|ADM2"));
  }

  #[test]
  fn test_multiline_message_stays_on_one_line() {
    let dir = TempDir::new().unwrap();
    let log = BuildLog::new(dir.path());
    log.critical("ARE|ADM1", "HPSCU build failed: empty Polygon\nfeature 1 of ARE_ADM1\n");

    let text = fs::read_to_string(log.path(LogLevel::Critical)).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.trim_end().ends_with("empty Polygon; feature 1 of ARE_ADM1"));
  }

  #[test]
  fn test_concurrent_appends_do_not_interleave() {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(BuildLog::new(dir.path()));
    let handles: Vec<_> = (0..8)
      .map(|i| {
        let log = Arc::clone(&log);
        std::thread::spawn(move || {
          for j in 0..25 {
            log.warn(&format!("T{}|ADM{}", i, j), "message");
          }
        })
      })
      .collect();
    for h in handles {
      h.join().unwrap();
    }

    let text = fs::read_to_string(log.path(LogLevel::Warn)).unwrap();
    assert_eq!(text.lines().count(), 200);
    assert!(text.lines().all(|l| l.ends_with(" message")));
  }
}
