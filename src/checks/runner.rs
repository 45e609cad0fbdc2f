//! Sequential runner over the archives in a change set

use super::archive::{ArchiveFetcher, SubmissionArchive};
use super::meta_file::parse_meta;
use super::report::{ArchiveReport, Finding};
use super::rules::MetaValidator;
use crate::utils::is_archive_path;
use std::path::Path;

/// Checks archives one at a time against a shared validator
pub struct ValidationRunner<'a> {
  workspace: &'a Path,
  validator: MetaValidator<'a>,
  fetcher: &'a dyn ArchiveFetcher,
}

impl<'a> ValidationRunner<'a> {
  pub fn new(workspace: &'a Path, validator: MetaValidator<'a>, fetcher: &'a dyn ArchiveFetcher) -> Self {
    Self {
      workspace,
      validator,
      fetcher,
    }
  }

  /// Archive paths from a change list, order preserved
  pub fn candidates(changed: &[String]) -> Vec<String> {
    changed.iter().filter(|p| is_archive_path(p)).cloned().collect()
  }

  /// Fetch, open and validate one archive
  ///
  /// Never fails: anything that prevents a full check becomes a critical
  /// finding in the report.
  pub fn check_archive(&self, rel_path: &str) -> ArchiveReport {
    if let Err(err) = self.fetcher.fetch(self.workspace, rel_path) {
      tracing::warn!(archive = rel_path, fetcher = self.fetcher.name(), "fetch failed: {}", err);
    }

    let full_path = self.workspace.join(rel_path);
    let mut archive = match SubmissionArchive::open(&full_path) {
      Ok(archive) => archive,
      Err(err) => {
        return ArchiveReport::unreadable(rel_path, Finding::critical(None, format!("Could not open archive: {}", err)));
      }
    };

    let bytes = match archive.read_meta() {
      Ok(Some(bytes)) => bytes,
      Ok(None) => {
        return ArchiveReport::unreadable(
          rel_path,
          Finding::critical(None, format!("Metadata file does not exist in {}", rel_path)),
        );
      }
      Err(err) => {
        return ArchiveReport::unreadable(rel_path, Finding::critical(None, format!("Could not read meta.txt: {}", err)));
      }
    };

    let meta = parse_meta(&bytes);
    tracing::debug!(archive = rel_path, entries = meta.entries.len(), "parsed meta.txt");
    let has_image = archive.has_license_image();
    self.validator.validate(rel_path, &meta, has_image)
  }
}
