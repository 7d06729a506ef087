//! Replayer CLI Library
//!
//! Command-line surface for replaying Selenium IDE suites into NUnit XML.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;

pub use commands::{Cli, Commands, DryRunArgs};
pub use config::{init_logging, CliConfig, Verbosity};
pub use error::{CliError, CliResult};
