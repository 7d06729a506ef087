//! Hierarchical result accumulator.
//!
//! Every status operation walks the path root → interior namespaces →
//! fixture → test case, creating nodes on first use, and writes the same
//! flags and a fresh timing snapshot to each level. Ancestors are not
//! aggregated across siblings; the last write wins.

use super::environment::Environment;
use super::tree::{FailureDetail, ResultState, ScopeKind, ScopeNode, StatusFlags, TestCaseNode};
use super::xml;
use crate::result::ReplayResult;
use crate::script::RunDescriptor;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::path::Path;
use std::time::{Duration, Instant};

/// Run-wide outcome counters; never decremented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Distinct test cases created
    pub total: u32,
    /// Unclassified errors
    pub errors: u32,
    /// Failed assertions
    pub failures: u32,
    /// Inconclusive or skipped marks
    pub inconclusive: u32,
    /// Ignore marks
    pub ignored: u32,
    /// Invalid marks
    pub invalid: u32,
}

impl Counters {
    /// Tests that did not run
    #[must_use]
    pub const fn not_run(&self) -> u32 {
        self.ignored + self.invalid
    }
}

#[derive(Debug, Default)]
struct Inner {
    root: Option<ScopeNode>,
    counters: Counters,
    timers: HashMap<String, Instant>,
}

/// Thread-safe result tree for one report
#[derive(Debug)]
pub struct ResultAccumulator {
    name: String,
    created: DateTime<Local>,
    environment: Environment,
    inner: Mutex<Inner>,
}

impl ResultAccumulator {
    /// Create an empty accumulator named `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_environment(name, Environment::capture())
    }

    /// Create an accumulator with explicit host metadata
    #[must_use]
    pub fn with_environment(name: impl Into<String>, environment: Environment) -> Self {
        Self {
            name: name.into(),
            created: Local::now(),
            environment,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Report name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construction time
    #[must_use]
    pub const fn created(&self) -> DateTime<Local> {
        self.created
    }

    /// Start (or restart) the timer for a test
    pub fn begin(&self, desc: &RunDescriptor) {
        self.inner.lock().timers.insert(desc.full_path(), Instant::now());
    }

    /// Record a passed assertion
    pub fn assertion_passed(&self, desc: &RunDescriptor) {
        let update = StatusFlags::new(Some(true), Some(ResultState::Success), Some(true));
        self.update(desc, update, |case, _| case.asserts += 1);
    }

    /// Record a failed assertion with its location
    pub fn assertion_failed(&self, desc: &RunDescriptor, message: &str, location: &str) {
        let update = StatusFlags::new(Some(true), Some(ResultState::Failed), Some(false));
        self.update(desc, update, |case, counters| {
            counters.failures += 1;
            case.failure = Some(FailureDetail {
                message: message.to_string(),
                stack_trace: location.to_string(),
            });
        });
    }

    /// Record an unclassified error
    pub fn exception(&self, desc: &RunDescriptor, error: &(dyn StdError + 'static)) {
        let update = StatusFlags::new(Some(true), Some(ResultState::Failed), None);
        let detail = FailureDetail {
            message: error.to_string(),
            stack_trace: error_chain(error),
        };
        self.update(desc, update, |case, counters| {
            counters.errors += 1;
            case.failure = Some(detail);
        });
    }

    /// Mark a test ignored
    pub fn ignore(&self, desc: &RunDescriptor, reason: &str) {
        let update = StatusFlags::new(Some(false), Some(ResultState::Ignored), None);
        self.update(desc, update, |case, counters| {
            counters.ignored += 1;
            case.reason = Some(reason.to_string());
        });
    }

    /// Mark a test inconclusive
    pub fn inconclusive(&self, desc: &RunDescriptor) {
        let update = StatusFlags::new(Some(false), Some(ResultState::Inconclusive), None);
        self.update(desc, update, |_, counters| counters.inconclusive += 1);
    }

    /// Mark a test skipped (recorded as inconclusive)
    pub fn skip(&self, desc: &RunDescriptor) {
        self.inconclusive(desc);
    }

    /// Mark a test invalid
    pub fn invalid(&self, desc: &RunDescriptor) {
        let update = StatusFlags::new(Some(false), Some(ResultState::Invalid), Some(false));
        self.update(desc, update, |_, counters| counters.invalid += 1);
    }

    /// Append a property to a test case
    pub fn add_property(&self, desc: &RunDescriptor, name: &str, value: &str) {
        let mut inner = self.inner.lock();
        let Inner { root, counters, .. } = &mut *inner;
        let (case, created) = locate_case(root, desc);
        if created {
            counters.total += 1;
        }
        case.properties.push((name.to_string(), value.to_string()));
    }

    /// Snapshot of the counters
    #[must_use]
    pub fn counters(&self) -> Counters {
        self.inner.lock().counters
    }

    /// Snapshot of the tree; `None` before the first test is addressed
    #[must_use]
    pub fn tree(&self) -> Option<ScopeNode> {
        self.inner.lock().root.clone()
    }

    /// Snapshot of one test case, looked up ignoring case
    #[must_use]
    pub fn find_test_case(&self, desc: &RunDescriptor) -> Option<TestCaseNode> {
        let inner = self.inner.lock();
        let mut node = inner.root.as_ref()?;
        for segment in desc.namespace_segments().skip(1) {
            node = node.find_child(ScopeKind::Namespace, segment)?;
        }
        node.find_child(ScopeKind::TestFixture, &desc.fixture)?
            .find_case(&desc.full_path())
            .cloned()
    }

    /// Serialize the report
    #[must_use]
    pub fn to_xml(&self) -> String {
        let inner = self.inner.lock();
        xml::render(&xml::ReportView {
            name: &self.name,
            created: self.created,
            environment: &self.environment,
            counters: inner.counters,
            root: inner.root.as_ref(),
        })
    }

    /// Serialize the report to `path`
    ///
    /// # Errors
    ///
    /// Returns error if file writing fails
    pub fn write_xml(&self, path: &Path) -> ReplayResult<()> {
        std::fs::write(path, self.to_xml())?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }

    fn update<F>(&self, desc: &RunDescriptor, update: StatusFlags, on_case: F)
    where
        F: FnOnce(&mut TestCaseNode, &mut Counters),
    {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let Inner {
            root,
            counters,
            timers,
        } = &mut *inner;

        let mut segments = desc.namespace_segments();
        let first = segments.next().unwrap_or_default();
        let mut node = get_root(root, first);
        let mut key = first.to_string();
        node.touch(update, elapsed(timers, &key, now));

        for segment in segments {
            key.push('.');
            key.push_str(segment);
            node = node.child_mut(ScopeKind::Namespace, segment);
            node.touch(update, elapsed(timers, &key, now));
        }

        let fixture = node.child_mut(ScopeKind::TestFixture, &desc.fixture);
        fixture.touch(update, elapsed(timers, &desc.fixture_path(), now));

        let full_path = desc.full_path();
        let (case, created) = fixture.case_mut(&full_path);
        if created {
            counters.total += 1;
        }
        on_case(case, counters);
        case.touch(update, elapsed(timers, &full_path, now));
    }
}

fn get_root<'r>(root: &'r mut Option<ScopeNode>, first: &str) -> &'r mut ScopeNode {
    let node = root.get_or_insert_with(|| ScopeNode::new(ScopeKind::Namespace, first));
    if !node.name.eq_ignore_ascii_case(first) {
        tracing::warn!(
            root = %node.name,
            requested = %first,
            "report has a single root, recording under existing root"
        );
    }
    node
}

fn locate_case<'r>(
    root: &'r mut Option<ScopeNode>,
    desc: &RunDescriptor,
) -> (&'r mut TestCaseNode, bool) {
    let mut segments = desc.namespace_segments();
    let mut node = get_root(root, segments.next().unwrap_or_default());
    for segment in segments {
        node = node.child_mut(ScopeKind::Namespace, segment);
    }
    node.child_mut(ScopeKind::TestFixture, &desc.fixture)
        .case_mut(&desc.full_path())
}

/// Time since `key` was first seen, starting its timer now if unseen
fn elapsed(timers: &mut HashMap<String, Instant>, key: &str, now: Instant) -> Duration {
    let start = *timers.entry(key.to_string()).or_insert(now);
    now.saturating_duration_since(start)
}

fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut lines = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}
