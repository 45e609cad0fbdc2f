//! Submission archive access
//!
//! Archives are stored in git LFS, so a CI checkout only has pointer files until
//! they are pulled. Fetching sits behind `ArchiveFetcher` so local runs and
//! tests can skip it.

use crate::core::error::{GbError, GbResult, ResultExt};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::Command;
use zip::ZipArchive;
use zip::result::ZipError;

pub const META_FILE: &str = "meta.txt";
pub const LICENSE_IMAGES: [&str; 2] = ["license.png", "license.jpg"];

/// Makes an archive's real content available in the workspace
pub trait ArchiveFetcher: Send + Sync {
  fn name(&self) -> &str;

  /// Fetch `rel_path` (relative to `workspace`)
  fn fetch(&self, workspace: &Path, rel_path: &str) -> GbResult<()>;
}

/// Pulls archive content with `git lfs pull --include=<path>`
pub struct GitLfsFetcher;

impl ArchiveFetcher for GitLfsFetcher {
  fn name(&self) -> &str {
    "lfs"
  }

  fn fetch(&self, workspace: &Path, rel_path: &str) -> GbResult<()> {
    // Drop the pointer file so lfs writes the real blob
    let _ = std::fs::remove_file(workspace.join(rel_path));

    let output = Command::new("git")
      .current_dir(workspace)
      .args(["lfs", "pull", &format!("--include={}", rel_path)])
      .output()
      .context("Failed to run git lfs")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(GbError::with_help(
        format!("git lfs pull failed for {}: {}", rel_path, stderr.trim()),
        "Make sure git-lfs is installed and the workspace is a git checkout.",
      ));
    }
    Ok(())
  }
}

/// Archives are already on disk
pub struct LocalFetcher;

impl ArchiveFetcher for LocalFetcher {
  fn name(&self) -> &str {
    "local"
  }

  fn fetch(&self, _workspace: &Path, _rel_path: &str) -> GbResult<()> {
    Ok(())
  }
}

/// An opened submission zip
pub struct SubmissionArchive {
  archive: ZipArchive<File>,
}

impl SubmissionArchive {
  pub fn open(path: &Path) -> GbResult<Self> {
    let file = File::open(path).with_context(|| format!("Failed to open archive {}", path.display()))?;
    let archive = ZipArchive::new(file).with_context(|| format!("Failed to read zip archive {}", path.display()))?;
    Ok(Self { archive })
  }

  /// Raw meta.txt bytes, or None when the archive has no meta.txt
  pub fn read_meta(&mut self) -> GbResult<Option<Vec<u8>>> {
    match self.archive.by_name(META_FILE) {
      Ok(mut entry) => {
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).context("Failed to read meta.txt")?;
        Ok(Some(bytes))
      }
      Err(ZipError::FileNotFound) => Ok(None),
      Err(err) => Err(err.into()),
    }
  }

  /// Whether license.png or license.jpg sits at the archive root
  pub fn has_license_image(&mut self) -> bool {
    LICENSE_IMAGES
      .iter()
      .any(|name| self.archive.by_name(name).is_ok())
  }
}
