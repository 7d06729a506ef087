//! Script data model: recorded command lines and run addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title given to scripts that carry none
pub const UNTITLED_SCRIPT: &str = "Untitled Script";

/// One recorded `(command, target, value)` triple
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    /// Command name, e.g. `clickAndWait`
    pub command: String,
    /// Command target, usually a locator
    pub target: String,
    /// Command value, usually text to type or compare
    pub value: String,
}

impl ScriptLine {
    /// Create a new script line
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        target: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            target: target.into(),
            value: value.into(),
        }
    }

    /// Whether the command is an `assert*` command, whose failures are fatal
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        starts_with_ignore_case(&self.command, "assert")
    }
}

impl fmt::Display for ScriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.command, self.target, self.value)
    }
}

/// A recorded interaction scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Script title
    pub title: String,
    /// Base URL prepended to every `open` target
    pub base_url: String,
    /// Ordered command lines
    pub lines: Vec<ScriptLine>,
}

impl Default for Script {
    fn default() -> Self {
        Self::new(UNTITLED_SCRIPT, "")
    }
}

impl Script {
    /// Create an empty script
    #[must_use]
    pub fn new(title: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            base_url: base_url.into(),
            lines: Vec::new(),
        }
    }

    /// Append a line
    #[must_use]
    pub fn with_line(mut self, line: ScriptLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Replace the base URL with a caller-supplied override
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the script has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Identifies one logical test execution inside the result tree.
///
/// `suite` may itself be a dotted namespace path such as `"A.B.C"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunDescriptor {
    /// Namespace path
    pub suite: String,
    /// Fixture name
    pub fixture: String,
    /// Test name
    pub test: String,
}

impl RunDescriptor {
    /// Create a new descriptor
    #[must_use]
    pub fn new(
        suite: impl Into<String>,
        fixture: impl Into<String>,
        test: impl Into<String>,
    ) -> Self {
        Self {
            suite: suite.into(),
            fixture: fixture.into(),
            test: test.into(),
        }
    }

    /// Namespace segments of the suite path
    pub fn namespace_segments(&self) -> impl Iterator<Item = &str> {
        self.suite.split('.')
    }

    /// `suite.fixture`
    #[must_use]
    pub fn fixture_path(&self) -> String {
        format!("{}.{}", self.suite, self.fixture)
    }

    /// Canonical key `suite.fixture.test`
    #[must_use]
    pub fn full_path(&self) -> String {
        format!("{}.{}.{}", self.suite, self.fixture, self.test)
    }
}

impl fmt::Display for RunDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

pub(crate) fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
