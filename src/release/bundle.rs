//! Zip bundling for release artifacts

use crate::core::error::{GbResult, ResultExt};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn options() -> SimpleFileOptions {
  SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
}

/// Zip every file under `dir` into `target`, skipping paths rejected by `include`
///
/// Entry names are relative to `dir` with `/` separators, in sorted order.
pub fn zip_dir(dir: &Path, target: &Path, include: impl Fn(&Path) -> bool) -> GbResult<usize> {
  let file = File::create(target).with_context(|| format!("Failed to create {}", target.display()))?;
  let mut zip = ZipWriter::new(file);
  let mut count = 0;

  for entry in WalkDir::new(dir).sort_by_file_name() {
    let entry = entry?;
    let path = entry.path();
    if !entry.file_type().is_file() || path == target || !include(path) {
      continue;
    }

    let rel = path.strip_prefix(dir)?;
    let name = rel
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    zip.start_file(name, options())?;
    let mut src = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    io::copy(&mut src, &mut zip)?;
    count += 1;
  }

  zip.finish()?;
  Ok(count)
}

/// Append `file` to an existing archive under `name`
pub fn append_file(archive: &Path, file: &Path, name: &str) -> GbResult<()> {
  let handle = OpenOptions::new()
    .read(true)
    .write(true)
    .open(archive)
    .with_context(|| format!("Failed to open {}", archive.display()))?;
  let mut zip = ZipWriter::new_append(handle)?;
  zip.start_file(name, options())?;
  let mut src = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
  io::copy(&mut src, &mut zip)?;
  zip.finish()?;
  Ok(())
}

/// Move a file, copying across filesystems when rename is not possible
pub fn move_file(from: &Path, to: &Path) -> GbResult<()> {
  if fs::rename(from, to).is_ok() {
    return Ok(());
  }
  fs::copy(from, to).with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
  fs::remove_file(from)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Read;
  use tempfile::TempDir;
  use zip::ZipArchive;

  fn names(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect::<Vec<_>>()
  }

  #[test]
  fn test_zip_dir_filters_and_nests() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("sub")).unwrap();
    fs::write(src.join("b.txt"), "b").unwrap();
    fs::write(src.join("sub/a.txt"), "a").unwrap();
    fs::write(src.join("old-all.zip"), "stale").unwrap();

    let target = dir.path().join("out.zip");
    let count = zip_dir(&src, &target, |p| !p.to_string_lossy().ends_with("-all.zip")).unwrap();
    assert_eq!(count, 2);

    let mut entries = names(&target);
    entries.sort();
    assert_eq!(entries, vec!["b.txt", "sub/a.txt"]);
  }

  #[test]
  fn test_append_keeps_existing_entries() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("data.geojson"), "{}").unwrap();
    let target = dir.path().join("bundle.zip");
    zip_dir(&src, &target, |_| true).unwrap();

    let cite = dir.path().join("CITATION.txt");
    fs::write(&cite, "cite us").unwrap();
    append_file(&target, &cite, "CITATION.txt").unwrap();

    let mut archive = ZipArchive::new(File::open(&target).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);
    let mut content = String::new();
    archive.by_name("CITATION.txt").unwrap().read_to_string(&mut content).unwrap();
    assert_eq!(content, "cite us");
  }

  #[test]
  fn test_move_file() {
    let dir = TempDir::new().unwrap();
    let from = dir.path().join("a.zip");
    let to = dir.path().join("nested/b.zip");
    fs::create_dir_all(to.parent().unwrap()).unwrap();
    fs::write(&from, "x").unwrap();
    move_file(&from, &to).unwrap();
    assert!(!from.exists());
    assert_eq!(fs::read_to_string(&to).unwrap(), "x");
  }
}
