//! Script interpreter: runs lines, classifies outcomes, reports results.
//!
//! ```text
//! Idle ──run()──► Running ──all lines done──► Completed
//!                    │
//!                    └──first fatal outcome──► Completed (Err)
//! ```
//!
//! Classification per line:
//!
//! | outcome                          | `assert*`            | other commands        |
//! |----------------------------------|----------------------|-----------------------|
//! | success                          | assertion passed     | nothing recorded      |
//! | check failed / not found / timeout | failure, abort     | verification error    |
//! | anything else                    | error, abort         | error, abort          |

use crate::commands::{CommandContext, CommandTable, Failure};
use crate::report::ResultAccumulator;
use crate::result::{ReplayError, ReplayResult};
use crate::script::{RunDescriptor, Script, ScriptLine};
use crate::session::{AutomationSession, SessionError};
use crate::variables::VariableStore;
use crate::wait::WaitOptions;
use std::fmt;
use std::time::Duration;

/// Default pause after a click before waiting for the page
pub const DEFAULT_SETTLE_PAUSE: Duration = Duration::from_secs(1);

/// Default locator that signals a loaded page
pub const DEFAULT_PAGE_CONTAINER: &str = "css=body";

/// Tunables for one interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Polling cadence for `waitFor*` commands and post-click waits
    pub wait: WaitOptions,
    /// Pause after `click` before waiting for the page container
    pub settle_pause: Duration,
    /// Locator polled after `clickAndWait` and `selectAndWait`
    pub page_container: String,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            wait: WaitOptions::default(),
            settle_pause: DEFAULT_SETTLE_PAUSE,
            page_container: DEFAULT_PAGE_CONTAINER.to_string(),
        }
    }
}

impl InterpreterOptions {
    /// Set polling options
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set the post-click pause
    #[must_use]
    pub const fn with_settle_pause(mut self, pause: Duration) -> Self {
        self.settle_pause = pause;
        self
    }

    /// Set the page container locator
    #[must_use]
    pub fn with_page_container(mut self, locator: impl Into<String>) -> Self {
        self.page_container = locator.into();
        self
    }
}

/// Per-run mutable state
#[derive(Debug, Clone, Default)]
pub struct InterpreterState {
    /// Base URL for `open`
    pub base_url: String,
    /// Script variables
    pub variables: VariableStore,
    /// Soft failures from non-assert commands, in order
    pub verification_errors: Vec<String>,
    /// Message of the error that ended the run, if any
    pub last_error: Option<String>,
}

/// Interpreter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// Not started
    #[default]
    Idle,
    /// Executing lines
    Running,
    /// Finished or aborted
    Completed,
}

/// Classified result of one line
#[derive(Debug)]
pub enum LineOutcome {
    /// An `assert*` command succeeded
    Passed,
    /// Any other command succeeded
    Done,
    /// A non-assert check failed; the run continues
    SoftFail(String),
    /// An `assert*` check failed; the run aborts
    FatalFail {
        /// Failure message
        message: String,
        /// Command, expanded target and expanded value joined by ", "
        location: String,
        /// Set when the failure was a poll timeout
        attempts: Option<u32>,
    },
    /// Not a check failure; the run aborts
    Unclassified(ReplayError),
}

type BeforeLineHook<'a> = Box<dyn FnMut(&ScriptLine, &RunDescriptor) + 'a>;

/// Replays scripts against one automation session
pub struct ScriptInterpreter<'a, S: AutomationSession + ?Sized> {
    session: &'a mut S,
    descriptor: RunDescriptor,
    accumulator: Option<&'a ResultAccumulator>,
    options: InterpreterOptions,
    state: InterpreterState,
    phase: RunPhase,
    before_line: Option<BeforeLineHook<'a>>,
}

impl<S: AutomationSession + ?Sized> fmt::Debug for ScriptInterpreter<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptInterpreter")
            .field("descriptor", &self.descriptor)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("reporting", &self.accumulator.is_some())
            .field("before_line", &self.before_line.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, S: AutomationSession + ?Sized> ScriptInterpreter<'a, S> {
    /// Create an interpreter for one test run
    pub fn new(session: &'a mut S, descriptor: RunDescriptor) -> Self {
        Self {
            session,
            descriptor,
            accumulator: None,
            options: InterpreterOptions::default(),
            state: InterpreterState::default(),
            phase: RunPhase::Idle,
            before_line: None,
        }
    }

    /// Report outcomes to `accumulator`
    #[must_use]
    pub const fn with_accumulator(mut self, accumulator: &'a ResultAccumulator) -> Self {
        self.accumulator = Some(accumulator);
        self
    }

    /// Replace the default options
    #[must_use]
    pub fn with_options(mut self, options: InterpreterOptions) -> Self {
        self.options = options;
        self
    }

    /// Call `hook` before each line executes
    #[must_use]
    pub fn with_before_line<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&ScriptLine, &RunDescriptor) + 'a,
    {
        self.before_line = Some(Box::new(hook));
        self
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Run state, including variables
    #[must_use]
    pub const fn state(&self) -> &InterpreterState {
        &self.state
    }

    /// Soft failures collected so far
    #[must_use]
    pub fn verification_errors(&self) -> &[String] {
        &self.state.verification_errors
    }

    /// Descriptor results are reported under
    #[must_use]
    pub const fn descriptor(&self) -> &RunDescriptor {
        &self.descriptor
    }

    /// Replay every line of `script`.
    ///
    /// State from a previous run is discarded first. Verification errors
    /// remain readable after the run whether it completed or aborted.
    ///
    /// # Errors
    ///
    /// Returns the first fatal outcome: an unsupported command, a failed
    /// `assert*` check or timeout, or an unclassified error.
    pub fn run(&mut self, script: &Script) -> ReplayResult<()> {
        self.state = InterpreterState {
            base_url: script.base_url.clone(),
            ..InterpreterState::default()
        };
        self.phase = RunPhase::Running;
        tracing::info!(
            script = %script.title,
            run = %self.descriptor,
            lines = script.len(),
            "script started"
        );

        for line in &script.lines {
            if let Some(hook) = self.before_line.as_mut() {
                hook(line, &self.descriptor);
            }
            if let Err(err) = self.execute_line(line) {
                self.phase = RunPhase::Completed;
                self.state.last_error = Some(err.to_string());
                tracing::info!(script = %script.title, error = %err, "script aborted");
                return Err(err);
            }
        }

        self.phase = RunPhase::Completed;
        tracing::info!(
            script = %script.title,
            verification_errors = self.state.verification_errors.len(),
            "script completed"
        );
        Ok(())
    }

    /// Execute and classify a single line.
    ///
    /// # Errors
    ///
    /// Returns an error when the line's outcome is fatal.
    pub fn execute_line(&mut self, line: &ScriptLine) -> ReplayResult<()> {
        let Some(behavior) = CommandTable::lookup(&line.command) else {
            return Err(ReplayError::UnsupportedCommand {
                command: line.command.clone(),
            });
        };
        tracing::debug!(line = %line, "executing");

        let result = behavior.execute(
            line,
            &mut CommandContext {
                session: &mut *self.session,
                state: &mut self.state,
                options: &self.options,
            },
        );

        match self.classify(line, result) {
            LineOutcome::Passed => {
                if let Some(acc) = self.accumulator {
                    acc.assertion_passed(&self.descriptor);
                }
                Ok(())
            }
            LineOutcome::Done => Ok(()),
            LineOutcome::SoftFail(message) => {
                tracing::warn!(line = %line, %message, "verification failed");
                self.state.verification_errors.push(message);
                Ok(())
            }
            LineOutcome::FatalFail {
                message,
                location,
                attempts,
            } => {
                if let Some(acc) = self.accumulator {
                    acc.assertion_failed(&self.descriptor, &message, &location);
                }
                Err(match attempts {
                    Some(attempts) => ReplayError::Timeout { attempts, location },
                    None => ReplayError::AssertionFailed { message, location },
                })
            }
            LineOutcome::Unclassified(err) => {
                if let Some(acc) = self.accumulator {
                    acc.exception(&self.descriptor, &err);
                }
                Err(err)
            }
        }
    }

    fn classify(&self, line: &ScriptLine, result: Result<(), Failure>) -> LineOutcome {
        let (message, attempts) = match result {
            Ok(()) if line.is_assertion() => return LineOutcome::Passed,
            Ok(()) => return LineOutcome::Done,
            Err(Failure::Check { message }) => (message, None),
            Err(failure @ Failure::Timeout { attempts }) => (failure.to_string(), Some(attempts)),
            Err(Failure::Session(err)) if err.is_soft_classified() => (soft_message(err), None),
            Err(Failure::Session(err)) => return LineOutcome::Unclassified(err.into()),
            Err(Failure::Invalid { message }) => {
                return LineOutcome::Unclassified(ReplayError::InvalidArgument { message })
            }
        };

        if line.is_assertion() {
            LineOutcome::FatalFail {
                message,
                location: self.location(line),
                attempts,
            }
        } else {
            LineOutcome::SoftFail(message)
        }
    }

    fn location(&self, line: &ScriptLine) -> String {
        let vars = &self.state.variables;
        [
            line.command.clone(),
            vars.decode(&line.target),
            vars.decode(&line.value),
        ]
        .join(", ")
    }
}

/// Message of a soft error, looking through one level of wrapping
fn soft_message(err: SessionError) -> String {
    match err {
        SessionError::Wrapped { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fake::{FakeElement, FakeSession};
    use crate::locator::Locator;
    use crate::report::ResultState;

    fn fast() -> InterpreterOptions {
        InterpreterOptions::default()
            .with_wait(
                WaitOptions::new()
                    .with_poll_interval(Duration::ZERO)
                    .with_max_attempts(3),
            )
            .with_settle_pause(Duration::ZERO)
    }

    fn desc() -> RunDescriptor {
        RunDescriptor::new("Movers", "fake", "Home")
    }

    fn site() -> FakeSession {
        FakeSession::new()
            .with_page("http://example.com/", "Home")
            .with_element(Locator::css("body"), FakeElement::new("body"))
            .with_element(Locator::id("h"), FakeElement::new("h1").with_text("Welcome"))
    }

    fn script(lines: &[(&str, &str, &str)]) -> Script {
        lines.iter().fold(
            Script::new("Home", "http://example.com"),
            |s, &(c, t, v)| s.with_line(ScriptLine::new(c, t, v)),
        )
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_phases() {
            let mut session = site();
            let mut interp = ScriptInterpreter::new(&mut session, desc()).with_options(fast());
            assert_eq!(interp.phase(), RunPhase::Idle);
            interp.run(&script(&[("open", "/", "")])).unwrap();
            assert_eq!(interp.phase(), RunPhase::Completed);
            assert!(interp.state().last_error.is_none());
        }

        #[test]
        fn test_before_line_hook_sees_every_line() {
            let mut session = site();
            let mut seen = Vec::new();
            {
                let mut interp = ScriptInterpreter::new(&mut session, desc())
                    .with_options(fast())
                    .with_before_line(|line, d| seen.push(format!("{d}:{}", line.command)));
                interp
                    .run(&script(&[("open", "/", ""), ("verifyTitle", "Home", "")]))
                    .unwrap();
            }
            assert_eq!(seen, ["Movers.fake.Home:open", "Movers.fake.Home:verifyTitle"]);
        }

        #[test]
        fn test_rerun_resets_state() {
            let mut session = site();
            let mut interp = ScriptInterpreter::new(&mut session, desc()).with_options(fast());
            interp
                .run(&script(&[("verifyTitle", "Nope", ""), ("storeText", "id=h", "x")]))
                .unwrap();
            assert_eq!(interp.verification_errors().len(), 1);
            interp.run(&script(&[("open", "/", "")])).unwrap();
            assert!(interp.verification_errors().is_empty());
            assert!(interp.state().variables.is_empty());
        }
    }

    mod classification_tests {
        use super::*;

        #[test]
        fn test_verify_failures_are_soft() {
            let mut session = site();
            let acc = ResultAccumulator::new("run");
            let mut interp = ScriptInterpreter::new(&mut session, desc())
                .with_options(fast())
                .with_accumulator(&acc);
            interp
                .run(&script(&[
                    ("open", "/", ""),
                    ("verifyTitle", "Other", ""),
                    ("verifyElementPresent", "id=missing", ""),
                    ("verifyText", "id=h", "Welcome"),
                ]))
                .unwrap();
            assert_eq!(interp.verification_errors().len(), 2);
            assert!(interp.verification_errors()[1].contains("id=missing"));
            assert_eq!(acc.counters().failures, 0);
            assert!(acc.find_test_case(&desc()).is_none());
        }

        #[test]
        fn test_assert_pass_is_recorded() {
            let mut session = site();
            let acc = ResultAccumulator::new("run");
            let mut interp = ScriptInterpreter::new(&mut session, desc())
                .with_options(fast())
                .with_accumulator(&acc);
            interp
                .run(&script(&[
                    ("open", "/", ""),
                    ("assertTitle", "Home", ""),
                    ("assertText", "id=h", "glob:Wel*"),
                ]))
                .unwrap();
            let case = acc.find_test_case(&desc()).unwrap();
            assert_eq!(case.asserts, 2);
            assert_eq!(case.status.result, Some(ResultState::Success));
        }

        #[test]
        fn test_assert_failure_aborts_with_location() {
            let mut session = site();
            let acc = ResultAccumulator::new("run");
            let mut interp = ScriptInterpreter::new(&mut session, desc())
                .with_options(fast())
                .with_accumulator(&acc);
            let err = interp
                .run(&script(&[
                    ("storeText", "id=h", "greeting"),
                    ("assertText", "id=h", "${greeting} &amp; more"),
                    ("open", "/never", ""),
                ]))
                .unwrap_err();

            match err {
                ReplayError::AssertionFailed { location, .. } => {
                    assert_eq!(location, "assertText, id=h, Welcome & more");
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(acc.counters().failures, 1);
            assert_eq!(interp.phase(), RunPhase::Completed);
            assert!(interp.state().last_error.is_some());
            drop(interp);
            assert!(session.history().is_empty());
        }

        #[test]
        fn test_assert_not_found_is_failure() {
            let mut session = site();
            let acc = ResultAccumulator::new("run");
            let mut interp = ScriptInterpreter::new(&mut session, desc())
                .with_options(fast())
                .with_accumulator(&acc);
            let err = interp
                .run(&script(&[("assertElementPresent", "id=missing", "")]))
                .unwrap_err();
            assert!(err.is_assertion());
            let case = acc.find_test_case(&desc()).unwrap();
            assert!(case.failure.unwrap().message.contains("id=missing"));
        }

        #[test]
        fn test_wrapped_not_found_is_soft() {
            let mut session = site();
            session.fail_on(
                "find_element",
                SessionError::no_such_element(&Locator::id("h")).wrap("stale frame"),
            );
            let mut interp = ScriptInterpreter::new(&mut session, desc()).with_options(fast());
            interp.run(&script(&[("verifyElementPresent", "id=h", "")])).unwrap();
            assert_eq!(
                interp.verification_errors(),
                ["Unable to locate element: id=h"]
            );
        }

        #[test]
        fn test_wait_timeout_follows_prefix_rule() {
            let mut session = site();
            let mut interp = ScriptInterpreter::new(&mut session, desc()).with_options(fast());
            interp
                .run(&script(&[("waitForElementPresent", "id=never", "")]))
                .unwrap();
            assert_eq!(interp.verification_errors(), ["timeout after 3 attempts"]);
        }

        #[test]
        fn test_timeout_classification_under_assert() {
            let mut session = site();
            let interp = ScriptInterpreter::new(&mut session, desc()).with_options(fast());
            let line = ScriptLine::new("assertSomething", "id=x", "");
            let outcome = interp.classify(&line, Err(Failure::Timeout { attempts: 3 }));
            assert!(matches!(
                outcome,
                LineOutcome::FatalFail {
                    attempts: Some(3),
                    ..
                }
            ));
        }

        #[test]
        fn test_backend_error_is_unclassified() {
            let mut session = site();
            session.fail_on("navigate", SessionError::backend("connection refused"));
            let acc = ResultAccumulator::new("run");
            let mut interp = ScriptInterpreter::new(&mut session, desc())
                .with_options(fast())
                .with_accumulator(&acc);
            let err = interp
                .run(&script(&[("verifyTitle", "x", ""), ("open", "/", "")]))
                .unwrap_err();
            assert!(matches!(err, ReplayError::Session(_)));
            assert_eq!(acc.counters().errors, 1);
            assert_eq!(acc.counters().failures, 0);
            assert_eq!(interp.verification_errors().len(), 1);
        }

        #[test]
        fn test_unsupported_command_is_fatal_and_unreported() {
            let mut session = site();
            let acc = ResultAccumulator::new("run");
            let mut interp = ScriptInterpreter::new(&mut session, desc())
                .with_options(fast())
                .with_accumulator(&acc);
            let err = interp
                .run(&script(&[("dragAndDrop", "id=a", "id=b")]))
                .unwrap_err();
            assert!(matches!(
                err,
                ReplayError::UnsupportedCommand { ref command } if command == "dragAndDrop"
            ));
            assert!(err.to_string().contains("'dragAndDrop'"));
            assert_eq!(acc.counters().total, 0);
        }

        #[test]
        fn test_unsupported_command_keeps_recorded_case() {
            let mut session = site();
            let mut interp = ScriptInterpreter::new(&mut session, desc()).with_options(fast());
            let err = interp
                .execute_line(&ScriptLine::new("MouseOverAndWait", "id=h", ""))
                .unwrap_err();
            assert!(matches!(
                err,
                ReplayError::UnsupportedCommand { ref command } if command == "MouseOverAndWait"
            ));
        }

        #[test]
        fn test_bad_select_index_is_unclassified() {
            let mut session = site().with_element(
                Locator::id("s"),
                FakeElement::new("select").with_option("A", "a"),
            );
            let mut interp = ScriptInterpreter::new(&mut session, desc()).with_options(fast());
            let err = interp
                .run(&script(&[("select", "id=s", "index=first")]))
                .unwrap_err();
            assert!(matches!(err, ReplayError::InvalidArgument { .. }));
        }
    }
}
