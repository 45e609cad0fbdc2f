//! `gb-release build`: assemble the release tree from the newest nightly snapshot

use crate::core::config::validate_version;
use crate::core::context::RunContext;
use crate::core::error::GbResult;
use crate::release::{self, BuildPlan, ProductType, ReleaseLayout, ReleaseReport};
use crate::ui::progress::MultiProgress;
use crate::utils::display_path;
use std::path::PathBuf;

/// Command-line overrides for `[release]`
#[derive(Debug, Default)]
pub struct BuildOptions {
  pub root: Option<PathBuf>,
  pub version: Option<String>,
  pub products: Option<Vec<ProductType>>,
  pub jobs: Option<usize>,
  pub dry_run: bool,
  pub json: bool,
  pub strict: bool,
}

/// Run the build command
pub fn run_build(ctx: &RunContext, opts: BuildOptions) -> GbResult<()> {
  let config = &ctx.config.release;

  let root = opts.root.as_deref().map(|r| ctx.resolve(r)).unwrap_or_else(|| ctx.release_root());
  let version = opts.version.unwrap_or_else(|| config.version.clone());
  validate_version(&version)?;

  let mut products = opts.products.unwrap_or_else(|| config.products.clone());
  products.sort();
  products.dedup();

  let jobs = release::worker_count(opts.jobs.or(config.jobs));
  let layout = ReleaseLayout::new(root, version);

  let prepared = release::prepare(&layout)?;

  if opts.dry_run {
    let plan = BuildPlan::new(&layout, &prepared, &products, jobs);
    if opts.json {
      println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
      print_plan(&plan);
    }
    return Ok(());
  }

  if !opts.json {
    println!(
      "🚀 Building geoBoundaries {} from {} ({} rows, {} workers)",
      layout.version(),
      prepared.nightly,
      prepared.table.len(),
      jobs
    );
  }

  let progress = (!opts.json).then(MultiProgress::new);
  let report = release::run(&layout, prepared, &products, jobs, progress.as_ref())?;

  if opts.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(&report, &layout);
  }

  if opts.strict {
    report.strict_verdict()?;
  }
  Ok(())
}

fn print_plan(plan: &BuildPlan) {
  println!("📋 Build plan for geoBoundaries {} (nightly {})", plan.version, plan.nightly);
  println!("   snapshot: {}", display_path(&plan.snapshot));
  println!("   input:    {}", display_path(&plan.input_table));
  println!("   output:   {}", display_path(&plan.release_table));
  println!("   workers:  {}", plan.jobs);
  println!();

  for build in &plan.builds {
    let marker = match (&build.source, build.source_exists) {
      (Some(_), true) => "✅",
      (Some(_), false) => "❌",
      (None, _) => "➖",
    };
    let target = build
      .output_dir
      .as_deref()
      .map(display_path)
      .unwrap_or_else(|| "(no ISO/ADM)".to_string());
    println!("  {} {:<12} {:<7} {}", marker, build.boundary, build.product.code(), target);
  }

  let missing = plan.missing_sources().count();
  if missing > 0 {
    println!("\n⚠️  {} build(s) have no source shapefile and will fail", missing);
  }
  println!("\n💡 Run without --dry-run to build");
}

fn print_report(report: &ReleaseReport, layout: &ReleaseLayout) {
  println!(
    "\n📊 Build complete: {} built, {} skipped, {} failed",
    report.built(),
    report.skipped(),
    report.failed()
  );

  let failed: Vec<_> = report.failed_boundaries().collect();
  if !failed.is_empty() {
    println!("\n❌ Failed boundaries:");
    for boundary in failed {
      println!("   {}", boundary.boundary);
    }
    println!(
      "\n💡 Details in {}",
      display_path(&layout.log_dir(layout.version()).join("CRITICAL.txt"))
    );
  }
}
