//! Core building blocks shared by both pipelines
//!
//! - **config**: gbrelease.toml parsing and validation
//! - **context**: run context built once in main and shared by all commands
//! - **error**: error types with exit codes and contextual help

pub mod config;
pub mod context;
pub mod error;
