//! Text matching with Selenium IDE pattern prefixes.
//!
//! | prefix   | comparison                                                  |
//! |----------|-------------------------------------------------------------|
//! | `exact:` | byte-for-byte equality with the remainder                   |
//! | `glob:`  | anchored, case-insensitive glob (`*` and `?` wildcards)     |
//! | `regex:` | unanchored, case-sensitive regular expression               |
//! | (none)   | equality with the whole expected string                     |

use regex::{Regex, RegexBuilder};
use std::fmt;
use thiserror::Error;

/// How an expected value is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// `exact:` prefix
    Exact,
    /// `glob:` prefix
    Glob,
    /// `regex:` prefix
    Regex,
    /// No recognized prefix
    Literal,
}

impl MatchMode {
    /// Split a prefixed expected value into its mode and pattern
    #[must_use]
    pub fn split(expected: &str) -> (Self, &str) {
        if let Some(rest) = expected.strip_prefix("exact:") {
            (Self::Exact, rest)
        } else if let Some(rest) = expected.strip_prefix("glob:") {
            (Self::Glob, rest)
        } else if let Some(rest) = expected.strip_prefix("regex:") {
            (Self::Regex, rest)
        } else {
            (Self::Literal, expected)
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "exact",
            Self::Glob => "glob",
            Self::Regex => "regex",
            Self::Literal => "literal",
        };
        f.write_str(name)
    }
}

/// Reasons a text match did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchFailure {
    /// The actual text did not satisfy the expected pattern
    #[error("expected {mode} match of '{expected}' but was '{actual}'")]
    Mismatch {
        /// Comparison used
        mode: MatchMode,
        /// Expected pattern with the prefix removed
        expected: String,
        /// Text read from the page
        actual: String,
    },

    /// The pattern could not be compiled
    #[error("invalid {mode} pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Comparison used
        mode: MatchMode,
        /// Pattern with the prefix removed
        pattern: String,
        /// Compiler message
        message: String,
    },
}

/// Compare `actual` against a possibly-prefixed expected value.
///
/// An empty expected value expects empty actual text.
pub fn match_text(actual: &str, expected_with_mode: &str) -> Result<(), MatchFailure> {
    let (mode, pattern) = MatchMode::split(expected_with_mode);
    let matched = match mode {
        MatchMode::Exact | MatchMode::Literal => actual == pattern,
        MatchMode::Glob => glob_to_regex(pattern)
            .map_err(|e| invalid(mode, pattern, &e))?
            .is_match(actual),
        MatchMode::Regex => Regex::new(pattern)
            .map_err(|e| invalid(mode, pattern, &e))?
            .is_match(actual),
    };

    if matched {
        Ok(())
    } else {
        Err(MatchFailure::Mismatch {
            mode,
            expected: pattern.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Boolean form of [`match_text`]; invalid patterns never match
#[must_use]
pub fn matches(actual: &str, expected_with_mode: &str) -> bool {
    match_text(actual, expected_with_mode).is_ok()
}

/// Compile a glob into an anchored, case-insensitive, single-line regex
pub fn glob_to_regex(glob: &str) -> Result<Regex, regex::Error> {
    let body = regex::escape(glob)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

fn invalid(mode: MatchMode, pattern: &str, err: &regex::Error) -> MatchFailure {
    MatchFailure::InvalidPattern {
        mode,
        pattern: pattern.to_string(),
        message: err.to_string(),
    }
}
