//! CLI commands for gb-release
//!
//! - **validate**: metadata checks for changed submission archives
//! - **build**: release assembly from the newest nightly snapshot
//! - **citation**: render the citation and usage document
//!
//! All commands accept `&RunContext` so configuration is loaded once.

pub mod build;
pub mod citation;
pub mod validate;

pub use build::{BuildOptions, run_build};
pub use citation::run_citation;
pub use validate::{FetchMode, run_validate};
