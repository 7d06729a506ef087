//! CLI configuration

use crate::error::{CliError, CliResult};
use replayer::RunConfig;
use std::path::{Path, PathBuf};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Map `-q` and the `-v` count to a level; quiet wins
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// `tracing` filter directive for this level
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Debug => "trace",
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the level.
pub fn init_logging(verbosity: Verbosity) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.filter_directive()));
    // Already installed when called twice (tests); keep the first.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// YAML run configuration file
    pub config_file: Option<PathBuf>,
    /// Base URL override
    pub base_url: Option<String>,
    /// Combinations from the command line; replace the file's when non-empty
    pub combinations: Vec<String>,
    /// Report name override
    pub run_name: Option<String>,
    /// Report destination; stdout when unset
    pub output: Option<PathBuf>,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the run configuration file
    #[must_use]
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Set the base URL override
    #[must_use]
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the combinations
    #[must_use]
    pub fn with_combinations(mut self, combinations: Vec<String>) -> Self {
        self.combinations = combinations;
        self
    }

    /// Set the report name override
    #[must_use]
    pub fn with_run_name(mut self, name: Option<String>) -> Self {
        self.run_name = name;
        self
    }

    /// Set the report destination
    #[must_use]
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Run configuration: file values (or defaults), then flag overrides
    pub fn run_config(&self) -> CliResult<RunConfig> {
        let mut config = match &self.config_file {
            Some(path) => load_run_config(path)?,
            None => RunConfig::default(),
        };

        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        if !self.combinations.is_empty() {
            config = config.with_combinations(self.combinations.iter().cloned());
        }
        if let Some(name) = &self.run_name {
            config = config.with_run_name(name.clone());
        }

        config
            .validate()
            .map_err(|e| CliError::invalid_argument(e.to_string()))?;
        Ok(config)
    }
}

fn load_run_config(path: &Path) -> CliResult<RunConfig> {
    RunConfig::load(path).map_err(|e| CliError::config(format!("{}: {e}", path.display())))
}
