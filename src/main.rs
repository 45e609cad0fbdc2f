mod checks;
mod commands;
mod core;
mod reference;
mod release;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use commands::{BuildOptions, FetchMode};
use core::error::{GbError, print_error};
use release::ProductType;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Validate geoBoundaries submissions and assemble release packages
#[derive(Parser)]
#[command(name = "gb-release")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Increase diagnostic verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Check meta.txt of every changed submission archive
  Validate {
    /// Changed files, as `[a.zip,b.zip]` or a comma-separated list
    #[arg(long, env = "changes", default_value = "")]
    changes: String,
    /// Workspace the changed paths are relative to
    #[arg(long, env = "GITHUB_WORKSPACE")]
    workspace: Option<PathBuf>,
    /// How archive content is fetched before opening
    #[arg(long, value_enum, default_value_t = FetchMode::Lfs)]
    fetch: FetchMode,
    /// Output the batch report as JSON
    #[arg(long)]
    json: bool,
  },

  /// Build release artifacts from the newest nightly snapshot
  Build {
    /// Release root (gbRawData/, gbReleaseData/, buildLogs/, tmp/)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Release version tag, e.g. 3_0_0
    #[arg(id = "release_version", long = "release-version")]
    version: Option<String>,
    /// Product types to build
    #[arg(long, value_delimiter = ',')]
    products: Option<Vec<ProductType>>,
    /// Worker count (default: cores minus one)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Show what would be built without writing anything
    #[arg(long)]
    dry_run: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
    /// Exit non-zero when any boundary failed
    #[arg(long)]
    strict: bool,
  },

  /// Print or write the citation and usage document
  Citation {
    /// Release version tag, e.g. 3_0_0
    #[arg(id = "release_version", long = "release-version")]
    version: Option<String>,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
}

fn get_styles() -> clap::builder::Styles {
  let title = anstyle::Style::new()
    .bold()
    .underline()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan)));
  let bad = anstyle::Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red)));

  clap::builder::Styles::styled()
    .usage(title)
    .header(title)
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(bad)
    .error(bad)
    .valid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    2 => LevelFilter::DEBUG,
    _ => LevelFilter::TRACE,
  };
  tracing_subscriber::fmt()
    .with_max_level(level)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let workspace_root = match &cli.command {
    Commands::Validate {
      workspace: Some(dir), ..
    } => dir.clone(),
    _ => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(GbError::from(e).context("Failed to get current directory")),
    },
  };

  let ctx = match core::context::RunContext::build(&workspace_root) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Validate {
      changes, fetch, json, ..
    } => commands::run_validate(&ctx, &changes, fetch, json),
    Commands::Build {
      root,
      version,
      products,
      jobs,
      dry_run,
      json,
      strict,
    } => commands::run_build(
      &ctx,
      BuildOptions {
        root,
        version,
        products,
        jobs,
        dry_run,
        json,
        strict,
      },
    ),
    Commands::Citation { version, output } => commands::run_citation(&ctx, version, output),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: GbError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
