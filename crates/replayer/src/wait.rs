//! Bounded polling for `waitFor*` commands.
//!
//! A poll probes once per interval up to a fixed number of attempts. Probe
//! errors count as "not yet" so transient lookup failures never end a wait
//! early.

use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default pause between probes (1 second)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Default number of probes before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Cadence and ceiling for polling waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Pause between probes
    pub poll_interval: Duration,
    /// Probes made before timing out
    pub max_attempts: u32,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl WaitOptions {
    /// Create wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pause between probes
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the number of probes
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Upper bound on wall time spent in a single wait
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.poll_interval.saturating_mul(self.max_attempts)
    }

    /// Probe until `probe` reports `true` or attempts run out.
    ///
    /// The probe is invoked at most `max_attempts` times. There is no pause
    /// after the final attempt.
    pub fn poll<F, E>(&self, mut probe: F) -> Result<u32, WaitTimeout>
    where
        F: FnMut() -> Result<bool, E>,
        E: Display,
    {
        for attempt in 1..=self.max_attempts {
            match probe() {
                Ok(true) => return Ok(attempt),
                Ok(false) => {}
                Err(e) => tracing::debug!(attempt, error = %e, "probe failed, retrying"),
            }
            if attempt < self.max_attempts && !self.poll_interval.is_zero() {
                std::thread::sleep(self.poll_interval);
            }
        }
        Err(WaitTimeout {
            attempts: self.max_attempts,
        })
    }
}

/// A poll ran out of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timeout after {attempts} attempts")]
pub struct WaitTimeout {
    /// Probes made
    pub attempts: u32,
}

// =============================================================================
// TESTS
// =============================================================================
