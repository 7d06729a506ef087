//! Result and error types for replayer.

use crate::session::SessionError;
use thiserror::Error;

/// Result type for replayer operations
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Errors that can abort a script run or a supporting operation
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The command name has no entry in the command table
    #[error("Selenium command '{command}' is not supported by this script runner")]
    UnsupportedCommand {
        /// Raw command string from the script line
        command: String,
    },

    /// An `assert*` command's check failed
    #[error("Assertion failed at [{location}]: {message}")]
    AssertionFailed {
        /// Failure message
        message: String,
        /// Command, expanded target and expanded value joined by ", "
        location: String,
    },

    /// A `waitFor*` poll exhausted its attempts while guarding an `assert*` command
    #[error("Timed out after {attempts} polling attempts at [{location}]")]
    Timeout {
        /// Number of probes made before giving up
        attempts: u32,
        /// Command, expanded target and expanded value joined by ", "
        location: String,
    },

    /// Unclassified automation backend error
    #[error("Automation session error: {0}")]
    Session(#[from] SessionError),

    /// A script line carried an argument the command cannot use
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Script or suite file could not be parsed
    #[error("Parse error: {message}")]
    Parse {
        /// Error message
        message: String,
    },

    /// Run configuration is unusable
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ReplayError {
    /// Create a parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error was caused by a failed check rather than a broken run
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. } | Self::Timeout { .. })
    }
}
