//! `gb-release validate`: check the metadata of every changed submission archive

use crate::checks::{
  ArchiveFetcher, ArchiveReport, BatchReport, GitLfsFetcher, LocalFetcher, MetaValidator, Severity, ValidationRunner,
  format_field_table,
};
use crate::core::context::RunContext;
use crate::core::error::GbResult;
use crate::reference::{IsoTable, LicenseTable};
use crate::utils::parse_change_list;
use chrono::Datelike;

/// How archive content is made available before it is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FetchMode {
  /// `git lfs pull` each archive (CI checkouts)
  Lfs,
  /// Archives are already on disk
  Local,
}

/// Run the validate command
pub fn run_validate(ctx: &RunContext, changes: &str, fetch: FetchMode, json: bool) -> GbResult<()> {
  let reference = &ctx.config.reference;
  if reference.humanitarian_shares_column() {
    tracing::warn!(
      column = reference.humanitarian_flag_column,
      "humanitarian eligibility is read from the authoritative column"
    );
    if !json {
      println!(
        "⚠️  gbHumanitarian eligibility is read from column {} (same as gbAuthoritative)",
        reference.humanitarian_flag_column
      );
    }
  }

  let iso = IsoTable::load(&ctx.resolve(&reference.iso_csv), reference.iso_column)?;
  let licenses = LicenseTable::load(&ctx.resolve(&reference.license_csv), reference)?;
  let current_year = i64::from(chrono::Local::now().year());

  let changed = parse_change_list(changes);
  let candidates = ValidationRunner::candidates(&changed);
  tracing::debug!(changed = changed.len(), archives = candidates.len(), "resolved change list");

  let fetcher: &dyn ArchiveFetcher = match fetch {
    FetchMode::Lfs => &GitLfsFetcher,
    FetchMode::Local => &LocalFetcher,
  };
  let validator = MetaValidator::new(&iso, &licenses, current_year);
  let runner = ValidationRunner::new(ctx.workspace_root(), validator, fetcher);

  let total = candidates.len();
  let mut batch = BatchReport::default();
  for (idx, path) in candidates.iter().enumerate() {
    if !json {
      println!("\n🔍 Metadata Check ({} of {}): {}", idx + 1, total, path);
    }
    let report = runner.check_archive(path);
    if !json {
      print_archive_report(&report);
    }
    batch.archives.push(report);
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&batch)?);
  } else if total == 0 {
    println!("\n❌ No archives found in the change list");
  } else {
    println!(
      "\n📊 Checks complete: {} passed, {} failed ({} total)",
      batch.passed(),
      batch.failed(),
      total
    );
  }

  batch.verdict()
}

fn print_archive_report(report: &ArchiveReport) {
  for finding in &report.findings {
    let icon = match finding.severity {
      Severity::Info => "ℹ️ ",
      Severity::Warning => "⚠️ ",
      Severity::Critical => "❌",
    };
    println!("  {} {}: {}", icon, finding.severity, finding.message);
  }

  if report.meta_found {
    println!();
    print!("{}", format_field_table("OPTIONAL TESTS", &report.optional));
    print!("{}", format_field_table("REQUIRED TESTS", &report.required));
  }

  if report.passed {
    println!("✅ {} passed", report.archive);
  } else {
    println!("❌ {} failed ({} critical)", report.archive, report.criticals().count());
  }
}
