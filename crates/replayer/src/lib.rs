//! Replayer: Selenium IDE Script Replay with NUnit Results
//!
//! Replays recorded Selenium IDE scripts (HTML tables of
//! `command | target | value` rows) against a browser-automation session
//! and accumulates the outcome as an NUnit 2.5 XML report.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │  parser  │──►│ runner     │──►│ interpreter │──►│ AutomationSession│
//! │ (HTML)   │   │ (suite ×   │   │ (commands,  │   │ (WebDriver, fake)│
//! └──────────┘   │  combos)   │   │  waits)     │   └──────────────────┘
//!                └────────────┘   └──────┬──────┘
//!                                        ▼
//!                               ┌──────────────────┐
//!                               │ ResultAccumulator│──► NUnit XML
//!                               └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use replayer::{FakeSession, RunDescriptor, Script, ScriptInterpreter, ScriptLine};
//!
//! let mut session = FakeSession::new().with_title("Home");
//! let script = Script::new("Home", "http://example.com")
//!     .with_line(ScriptLine::new("verifyTitle", "Home", ""));
//! let mut interp = ScriptInterpreter::new(&mut session, RunDescriptor::new("Site", "fake", "Home"));
//! interp.run(&script).unwrap();
//! assert!(interp.verification_errors().is_empty());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod commands;
mod config;
mod fake;
mod interpreter;
mod locator;
mod matcher;
mod parser;
mod result;
mod runner;
mod script;
mod session;
mod variables;
mod wait;

/// NUnit-compatible result accumulation and XML output
pub mod report;

pub use commands::{Behavior, CommandTable, Failure};
pub use config::{RunConfig, DEFAULT_COMBINATION, DEFAULT_RUN_NAME};
pub use fake::{FakeElement, FakeSession};
pub use interpreter::{
    InterpreterOptions, InterpreterState, LineOutcome, RunPhase, ScriptInterpreter,
    DEFAULT_PAGE_CONTAINER, DEFAULT_SETTLE_PAUSE,
};
pub use locator::{xpath_literal, Locator};
pub use matcher::{glob_to_regex, match_text, matches, MatchFailure, MatchMode};
pub use parser::{load_script, load_suite, parse_script, parse_suite, SuiteEntry};
pub use report::{Counters, ResultAccumulator};
pub use result::{ReplayError, ReplayResult};
pub use runner::{suite_name, LoadedScript, SuiteRunner, SuiteSummary, VERIFICATION_PROPERTY};
pub use script::{RunDescriptor, Script, ScriptLine, UNTITLED_SCRIPT};
pub use session::{
    AutomationSession, Cookie, ElementId, SelectBy, SessionError, SessionFactory, SessionResult,
};
pub use variables::{html_decode, VariableStore};
pub use wait::{WaitOptions, WaitTimeout, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
