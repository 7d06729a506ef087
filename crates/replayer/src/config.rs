//! Run configuration loaded from YAML.

use crate::interpreter::InterpreterOptions;
use crate::result::{ReplayError, ReplayResult};
use crate::wait::{WaitOptions, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default report name
pub const DEFAULT_RUN_NAME: &str = "Selenium Script Test";

/// Default fixture name when no combinations are configured
pub const DEFAULT_COMBINATION: &str = "default";

/// Settings for a suite run; every field has a default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Replaces every script's base URL when set
    pub base_url: Option<String>,
    /// Milliseconds between `waitFor*` probes
    pub poll_interval_ms: u64,
    /// Probes before a wait times out
    pub max_poll_attempts: u32,
    /// Milliseconds to pause after a click
    pub settle_ms: u64,
    /// Locator polled after page-changing commands
    pub page_container: String,
    /// Report name
    pub run_name: String,
    /// Fixture names; each script runs once per entry
    pub combinations: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_ATTEMPTS,
            settle_ms: 1_000,
            page_container: crate::interpreter::DEFAULT_PAGE_CONTAINER.to_string(),
            run_name: DEFAULT_RUN_NAME.to_string(),
            combinations: vec![DEFAULT_COMBINATION.to_string()],
        }
    }
}

impl RunConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML, validating the result
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML or unusable values
    pub fn from_yaml(yaml: &str) -> ReplayResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> ReplayResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Check that the configuration can drive a run
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Config`] describing the first problem
    pub fn validate(&self) -> ReplayResult<()> {
        if self.max_poll_attempts == 0 {
            return Err(ReplayError::config("max_poll_attempts must be at least 1"));
        }
        if self.combinations.is_empty() {
            return Err(ReplayError::config("combinations must not be empty"));
        }
        if let Some(blank) = self.combinations.iter().find(|c| c.trim().is_empty()) {
            return Err(ReplayError::config(format!(
                "combination names must not be blank: {blank:?}"
            )));
        }
        if self.page_container.trim().is_empty() {
            return Err(ReplayError::config("page_container must not be empty"));
        }
        Ok(())
    }

    /// Set the base URL override
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the poll ceiling
    #[must_use]
    pub const fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    /// Set the post-click pause
    #[must_use]
    pub const fn with_settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Set the report name
    #[must_use]
    pub fn with_run_name(mut self, name: impl Into<String>) -> Self {
        self.run_name = name.into();
        self
    }

    /// Replace the combinations
    #[must_use]
    pub fn with_combinations<I, T>(mut self, combinations: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.combinations = combinations.into_iter().map(Into::into).collect();
        self
    }

    /// Interpreter options derived from this configuration
    #[must_use]
    pub fn interpreter_options(&self) -> InterpreterOptions {
        InterpreterOptions::default()
            .with_wait(
                WaitOptions::new()
                    .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
                    .with_max_attempts(self.max_poll_attempts),
            )
            .with_settle_pause(Duration::from_millis(self.settle_ms))
            .with_page_container(self.page_container.clone())
    }
}
