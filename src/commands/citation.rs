use crate::core::config::validate_version;
use crate::core::context::RunContext;
use crate::core::error::GbResult;
use crate::release::citation;
use crate::utils::display_path;
use std::path::PathBuf;

/// Print the citation document, or write it to `output`
pub fn run_citation(ctx: &RunContext, version: Option<String>, output: Option<PathBuf>) -> GbResult<()> {
  let version = version.unwrap_or_else(|| ctx.config.release.version.clone());
  validate_version(&version)?;

  match output {
    Some(path) => {
      let path = ctx.resolve(&path);
      citation::write(&path, &version)?;
      println!("✅ Wrote {}", display_path(&path));
    }
    None => print!("{}", citation::render(&version)),
  }
  Ok(())
}
