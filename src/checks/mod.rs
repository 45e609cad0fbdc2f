//! Metadata checks for submitted boundary archives
//!
//! Every archive in a change set must carry a `meta.txt` whose fields pass the
//! schema in [`schema`]. The pieces:
//!
//! - **meta_file**: latin-1 decoding and `key: value` parsing
//! - **schema**: the enumerated field set and key matchers
//! - **status**: tagged per-field state and the per-archive accumulator
//! - **rules**: field rules, the license/product cross-check and the source post-check
//! - **archive**: LFS fetching and zip access
//! - **runner**: the sequential loop over a change set
//! - **report**: findings, per-archive reports and the batch verdict
//!
//! # Example
//!
//! ```rust,ignore
//! let validator = MetaValidator::new(&iso, &licenses, 2024);
//! let runner = ValidationRunner::new(&workspace, validator, &GitLfsFetcher);
//! for path in ValidationRunner::candidates(&changed) {
//!   let report = runner.check_archive(&path);
//!   println!("{}: {}", report.archive, report.passed);
//! }
//! ```

mod archive;
mod meta_file;
mod report;
mod rules;
mod runner;
mod schema;
mod status;

pub use archive::{ArchiveFetcher, GitLfsFetcher, LocalFetcher};
pub use report::{ArchiveReport, BatchReport, Severity, format_field_table};
pub use rules::MetaValidator;
pub use runner::ValidationRunner;
