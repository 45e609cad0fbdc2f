//! Run context - build once, pass everywhere
//!
//! `main.rs` resolves the workspace and loads `gbrelease.toml` once, then hands
//! `&RunContext` to every command.

use crate::core::config::GbConfig;
use crate::core::error::GbResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared, read-only state for one invocation
#[derive(Debug, Clone)]
pub struct RunContext {
  /// Workspace root (repository checkout or CI workspace)
  pub root: PathBuf,

  /// Loaded configuration (defaults when no file exists)
  pub config: Arc<GbConfig>,
}

impl RunContext {
  /// Build context from a workspace root.
  pub fn build(workspace_root: &Path) -> GbResult<Self> {
    let root = workspace_root.to_path_buf();
    let config = Arc::new(GbConfig::load(&root)?);
    Ok(Self { root, config })
  }

  /// Workspace root directory
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }

  /// Resolve a possibly-relative path against the workspace
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  /// Root of the release data tree: `[release].root` or the workspace itself
  pub fn release_root(&self) -> PathBuf {
    match &self.config.release.root {
      Some(root) => self.resolve(root),
      None => self.root.clone(),
    }
  }
}
