//! linkage-pipeline library crate
//!
//! Exposes `run` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use pipeline::run;
pub use report::{BundleIssue, BundleReport, BundleStatus, RunReport};
