//! Result tree nodes: namespaces, fixtures and test cases.

use std::fmt;
use std::time::Duration;

/// Kind of a suite node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// One segment of a dotted suite path
    Namespace,
    /// A browser combination inside a namespace
    TestFixture,
}

impl ScopeKind {
    /// Name used in the report `type` attribute
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "Namespace",
            Self::TestFixture => "TestFixture",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded in a node's `result` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    /// All assertions passed
    Success,
    /// An assertion failed or an error was raised
    Failed,
    /// Skipped or undecided
    Inconclusive,
    /// Deliberately not run
    Ignored,
    /// Could not be run as written
    Invalid,
}

impl ResultState {
    /// Name used in the report `result` attribute
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::Inconclusive => "Inconclusive",
            Self::Ignored => "Ignored",
            Self::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for ResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state `executed` / `result` / `success` flags; `None` means never set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    /// Whether the test ran
    pub executed: Option<bool>,
    /// Outcome
    pub result: Option<ResultState>,
    /// Whether the outcome counts as a pass
    pub success: Option<bool>,
}

impl StatusFlags {
    /// Build an update; `None` fields leave the target flag unchanged
    #[must_use]
    pub const fn new(
        executed: Option<bool>,
        result: Option<ResultState>,
        success: Option<bool>,
    ) -> Self {
        Self {
            executed,
            result,
            success,
        }
    }

    /// Overwrite every flag that `update` sets
    pub fn merge(&mut self, update: Self) {
        if let Some(executed) = update.executed {
            self.executed = Some(executed);
        }
        if let Some(result) = update.result {
            self.result = Some(result);
        }
        if let Some(success) = update.success {
            self.success = Some(success);
        }
    }
}

/// Message and detail attached to a failed test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    /// Failure message
    pub message: String,
    /// Location or error chain
    pub stack_trace: String,
}

/// A leaf test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseNode {
    /// Full dotted path `suite.fixture.test`
    pub name: String,
    /// Status flags
    pub status: StatusFlags,
    /// Time since the test began, as of the last update
    pub time: Option<Duration>,
    /// Passed assertions
    pub asserts: u32,
    /// Failure detail from the last failed assertion or error
    pub failure: Option<FailureDetail>,
    /// Reason given when ignored
    pub reason: Option<String>,
    /// Name/value properties in insertion order
    pub properties: Vec<(String, String)>,
}

impl TestCaseNode {
    /// Create an unexecuted test case
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StatusFlags::default(),
            time: None,
            asserts: 0,
            failure: None,
            reason: None,
            properties: Vec::new(),
        }
    }

    /// Apply a status update and a timing snapshot
    pub fn touch(&mut self, update: StatusFlags, elapsed: Duration) {
        self.status.merge(update);
        self.time = Some(elapsed);
    }

    /// First property value named `name`
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A namespace or fixture node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode {
    /// Node kind
    pub kind: ScopeKind,
    /// Segment or fixture name
    pub name: String,
    /// Status flags, last write wins
    pub status: StatusFlags,
    /// Time since this scope's first timing update
    pub time: Option<Duration>,
    /// Child namespaces and fixtures
    pub suites: Vec<ScopeNode>,
    /// Child test cases
    pub cases: Vec<TestCaseNode>,
}

impl ScopeNode {
    /// Create an empty scope
    #[must_use]
    pub fn new(kind: ScopeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            status: StatusFlags::default(),
            time: None,
            suites: Vec::new(),
            cases: Vec::new(),
        }
    }

    /// Child scope of `kind` named `name`, ignoring case
    #[must_use]
    pub fn find_child(&self, kind: ScopeKind, name: &str) -> Option<&Self> {
        self.suites
            .iter()
            .find(|s| s.kind == kind && s.name.eq_ignore_ascii_case(name))
    }

    /// Child test case named `name`, ignoring case
    #[must_use]
    pub fn find_case(&self, name: &str) -> Option<&TestCaseNode> {
        self.cases.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get or create a child scope
    pub fn child_mut(&mut self, kind: ScopeKind, name: &str) -> &mut Self {
        let found = self
            .suites
            .iter()
            .position(|s| s.kind == kind && s.name.eq_ignore_ascii_case(name));
        let idx = match found {
            Some(idx) => idx,
            None => {
                self.suites.push(Self::new(kind, name));
                self.suites.len() - 1
            }
        };
        &mut self.suites[idx]
    }

    /// Get or create a test case; the flag reports creation
    pub fn case_mut(&mut self, name: &str) -> (&mut TestCaseNode, bool) {
        let found = self
            .cases
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name));
        match found {
            Some(idx) => (&mut self.cases[idx], false),
            None => {
                self.cases.push(TestCaseNode::new(name));
                let last = self.cases.len() - 1;
                (&mut self.cases[last], true)
            }
        }
    }

    /// Apply a status update and a timing snapshot
    pub fn touch(&mut self, update: StatusFlags, elapsed: Duration) {
        self.status.merge(update);
        self.time = Some(elapsed);
    }

    /// Test cases in this subtree, depth first
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.cases.len() + self.suites.iter().map(Self::case_count).sum::<usize>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod flag_tests {
        use super::*;

        #[test]
        fn test_merge_skips_unset_fields() {
            let mut flags = StatusFlags::new(Some(true), Some(ResultState::Success), Some(true));
            flags.merge(StatusFlags::new(Some(true), Some(ResultState::Failed), None));
            assert_eq!(
                flags,
                StatusFlags::new(Some(true), Some(ResultState::Failed), Some(true))
            );
        }
    }

    mod scope_tests {
        use super::*;

        #[test]
        fn test_child_get_or_create_ignores_case() {
            let mut root = ScopeNode::new(ScopeKind::Namespace, "Suite");
            root.child_mut(ScopeKind::TestFixture, "Firefox");
            root.child_mut(ScopeKind::TestFixture, "FIREFOX");
            assert_eq!(root.suites.len(), 1);
            assert!(root.find_child(ScopeKind::TestFixture, "firefox").is_some());
        }

        #[test]
        fn test_kind_distinguishes_children() {
            let mut root = ScopeNode::new(ScopeKind::Namespace, "Suite");
            root.child_mut(ScopeKind::TestFixture, "x");
            root.child_mut(ScopeKind::Namespace, "x");
            assert_eq!(root.suites.len(), 2);
        }

        #[test]
        fn test_case_creation_flag() {
            let mut fixture = ScopeNode::new(ScopeKind::TestFixture, "f");
            assert!(fixture.case_mut("S.f.Login").1);
            assert!(!fixture.case_mut("s.F.login").1);
            assert_eq!(fixture.case_count(), 1);
        }

        #[test]
        fn test_touch() {
            let mut scope = ScopeNode::new(ScopeKind::Namespace, "n");
            scope.touch(
                StatusFlags::new(Some(false), Some(ResultState::Ignored), None),
                Duration::from_millis(5),
            );
            assert_eq!(scope.status.result, Some(ResultState::Ignored));
            assert_eq!(scope.status.success, None);
            assert_eq!(scope.time, Some(Duration::from_millis(5)));
        }
    }
}
