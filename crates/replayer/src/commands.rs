//! Command table: Selenium IDE command names mapped to behaviors.
//!
//! Names are matched case-insensitively. Aliases share one [`Behavior`];
//! `verify*` and `assert*` variants differ only in how the interpreter
//! classifies a failure.

use crate::interpreter::{InterpreterOptions, InterpreterState};
use crate::locator::Locator;
use crate::matcher::{match_text, MatchFailure};
use crate::script::ScriptLine;
use crate::session::{AutomationSession, ElementId, SelectBy, SessionError, SessionResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

/// What a command does when executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Navigate to base URL + target
    Open,
    /// Compare the document title with the target
    CheckTitle,
    /// Compare an element's value (form controls) or text with the value
    CheckValueOrText,
    /// Require some element to contain the target text
    CheckTextPresent {
        /// Record presence into the variable named by the value instead
        store: bool,
    },
    /// Require no element to contain the target text
    CheckTextNotPresent,
    /// Require the element to be displayed
    CheckElementVisible,
    /// Require the element to exist
    CheckElementPresent,
    /// Require the element to be absent
    CheckElementNotPresent,
    /// Click, pause, then wait for the page container
    Click,
    /// Clear an editable element
    Clear,
    /// Send the value as keystrokes
    Type,
    /// Poll until the element's presence matches
    WaitForElement {
        /// Wait for presence (`true`) or absence
        present: bool,
    },
    /// Poll until the element has text, or is gone
    WaitForText {
        /// Wait for text (`true`) or absence
        present: bool,
    },
    /// Poll until the element's visibility matches
    WaitForVisibility {
        /// Wait for visible (`true`) or not visible
        visible: bool,
    },
    /// Pick an option on a selection control
    Select {
        /// Also wait for the page container afterwards
        wait: bool,
    },
    /// Store an element's text under the value's name
    StoreText,
    /// Evaluate the target as a script and store the result
    StoreEval,
    /// Delete a cookie by name, ignoring errors
    DeleteCookie,
}

static ENTRIES: &[(&str, Behavior)] = &[
    ("open", Behavior::Open),
    ("verifyTitle", Behavior::CheckTitle),
    ("assertTitle", Behavior::CheckTitle),
    ("verifyValue", Behavior::CheckValueOrText),
    ("assertValue", Behavior::CheckValueOrText),
    ("verifyText", Behavior::CheckValueOrText),
    ("assertText", Behavior::CheckValueOrText),
    ("verifyTextPresent", Behavior::CheckTextPresent { store: false }),
    ("assertTextPresent", Behavior::CheckTextPresent { store: false }),
    ("storeTextPresent", Behavior::CheckTextPresent { store: true }),
    ("verifyTextNotPresent", Behavior::CheckTextNotPresent),
    ("assertTextNotPresent", Behavior::CheckTextNotPresent),
    ("verifyElementVisible", Behavior::CheckElementVisible),
    ("assertElementVisible", Behavior::CheckElementVisible),
    ("verifyElementPresent", Behavior::CheckElementPresent),
    ("assertElementPresent", Behavior::CheckElementPresent),
    ("verifyElementNotPresent", Behavior::CheckElementNotPresent),
    ("assertElementNotPresent", Behavior::CheckElementNotPresent),
    ("click", Behavior::Click),
    ("clickAndWait", Behavior::Click),
    ("clear", Behavior::Clear),
    ("type", Behavior::Type),
    ("waitForElementPresent", Behavior::WaitForElement { present: true }),
    ("waitForElementNotPresent", Behavior::WaitForElement { present: false }),
    ("waitForText", Behavior::WaitForText { present: true }),
    ("waitForTextPresent", Behavior::WaitForText { present: true }),
    ("waitForTextNotPresent", Behavior::WaitForText { present: false }),
    ("waitForElementVisible", Behavior::WaitForVisibility { visible: true }),
    ("waitForElementNotVisible", Behavior::WaitForVisibility { visible: false }),
    ("select", Behavior::Select { wait: false }),
    ("selectAndWait", Behavior::Select { wait: true }),
    ("storeText", Behavior::StoreText),
    ("storeEval", Behavior::StoreEval),
    ("deleteCookie", Behavior::DeleteCookie),
];

static COMMANDS: Lazy<HashMap<String, Behavior>> = Lazy::new(|| {
    ENTRIES
        .iter()
        .map(|&(name, behavior)| (name.to_lowercase(), behavior))
        .collect()
});

/// Read-only lookup over the supported command set
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTable;

impl CommandTable {
    /// Behavior for `command`, ignoring case
    #[must_use]
    pub fn lookup(command: &str) -> Option<Behavior> {
        COMMANDS.get(&command.to_lowercase()).copied()
    }

    /// Whether `command` is supported
    #[must_use]
    pub fn contains(command: &str) -> bool {
        Self::lookup(command).is_some()
    }

    /// Supported command names in recorded spelling, sorted
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = ENTRIES.iter().map(|&(name, _)| name).collect();
        names.sort_unstable_by_key(|n| n.to_lowercase());
        names
    }

    /// Number of supported command names
    #[must_use]
    pub fn len() -> usize {
        ENTRIES.len()
    }
}

/// Why a behavior did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// A check did not hold
    #[error("{message}")]
    Check {
        /// Failure message
        message: String,
    },

    /// A poll ran out of attempts
    #[error("timeout after {attempts} attempts")]
    Timeout {
        /// Probes made
        attempts: u32,
    },

    /// The line carried an argument the behavior cannot use
    #[error("{message}")]
    Invalid {
        /// Error message
        message: String,
    },

    /// The session reported an error
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl Failure {
    fn check(message: impl Into<String>) -> Self {
        Self::Check {
            message: message.into(),
        }
    }
}

impl From<crate::wait::WaitTimeout> for Failure {
    fn from(timeout: crate::wait::WaitTimeout) -> Self {
        Self::Timeout {
            attempts: timeout.attempts,
        }
    }
}

/// Everything a behavior may touch while it runs
pub(crate) struct CommandContext<'c, S: AutomationSession + ?Sized> {
    pub(crate) session: &'c mut S,
    pub(crate) state: &'c mut InterpreterState,
    pub(crate) options: &'c InterpreterOptions,
}

impl<S: AutomationSession + ?Sized> CommandContext<'_, S> {
    fn decode(&self, raw: &str) -> String {
        self.state.variables.decode(raw)
    }

    fn locator(&self, line: &ScriptLine) -> Locator {
        Locator::resolve(&self.decode(&line.target))
    }

    fn find(&mut self, line: &ScriptLine) -> SessionResult<ElementId> {
        let locator = self.locator(line);
        self.session.find_element(&locator)
    }

    /// Find, then treat not-found as `None`
    fn probe(&mut self, locator: &Locator) -> SessionResult<Option<ElementId>> {
        match self.session.find_element(locator) {
            Ok(el) => Ok(Some(el)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn wait_for_page(&mut self) -> Result<(), Failure> {
        let container = Locator::resolve(&self.options.page_container);
        self.wait_for_element(&container, true)
    }

    fn wait_for_element(&mut self, locator: &Locator, present: bool) -> Result<(), Failure> {
        let wait = self.options.wait;
        wait.poll(|| -> SessionResult<bool> { Ok(self.probe(locator)?.is_some() == present) })?;
        Ok(())
    }
}

impl Behavior {
    /// Run this behavior for `line`
    pub(crate) fn execute<S: AutomationSession + ?Sized>(
        self,
        line: &ScriptLine,
        ctx: &mut CommandContext<'_, S>,
    ) -> Result<(), Failure> {
        match self {
            Self::Open => {
                let url = format!("{}{}", ctx.state.base_url, ctx.decode(&line.target));
                ctx.session.navigate(&url)?;
            }
            Self::CheckTitle => {
                let expected = ctx.decode(&line.target);
                let actual = ctx.session.title()?;
                if actual != expected {
                    return Err(Failure::check(format!(
                        "expected title '{expected}' but was '{actual}'"
                    )));
                }
            }
            Self::CheckValueOrText => {
                let el = ctx.find(line)?;
                let tag = ctx.session.tag_name(&el)?;
                let actual = if is_input_like(&tag) {
                    ctx.session.attribute(&el, "value")?.unwrap_or_default()
                } else {
                    ctx.session.text(&el)?
                };
                match_text(&actual, &ctx.decode(&line.value)).map_err(|e| match e {
                    MatchFailure::Mismatch { .. } => Failure::check(e.to_string()),
                    MatchFailure::InvalidPattern { .. } => Failure::Invalid {
                        message: e.to_string(),
                    },
                })?;
            }
            Self::CheckTextPresent { store } => {
                let locator = Locator::containing_text(&ctx.decode(&line.target));
                if store {
                    let found = ctx.probe(&locator)?.is_some();
                    ctx.state.variables.set(&line.value, found.to_string());
                } else {
                    ctx.session.find_element(&locator)?;
                }
            }
            Self::CheckTextNotPresent => {
                let locator = Locator::containing_text(&ctx.decode(&line.target));
                if ctx.probe(&locator)?.is_some() {
                    return Err(Failure::check(format!(
                        "Text {} was expected not present but was found in the document",
                        line.target
                    )));
                }
            }
            Self::CheckElementVisible => {
                let el = ctx.find(line)?;
                if !ctx.session.is_displayed(&el)? {
                    return Err(Failure::check(format!(
                        "Element {} is present but not visible",
                        line.target
                    )));
                }
            }
            Self::CheckElementPresent => {
                ctx.find(line)?;
            }
            Self::CheckElementNotPresent => {
                let locator = ctx.locator(line);
                if ctx.probe(&locator)?.is_some() {
                    return Err(Failure::check(format!(
                        "Element {} was expected not present but was found in the document",
                        line.target
                    )));
                }
            }
            Self::Click => {
                let el = ctx.find(line)?;
                ctx.session.click(&el)?;
                if !ctx.options.settle_pause.is_zero() {
                    std::thread::sleep(ctx.options.settle_pause);
                }
                ctx.wait_for_page()?;
            }
            Self::Clear => {
                let el = ctx.find(line)?;
                ctx.session.clear(&el)?;
            }
            Self::Type => {
                let keys = ctx.decode(&line.value);
                let el = ctx.find(line)?;
                ctx.session.send_keys(&el, &keys)?;
            }
            Self::WaitForElement { present } => {
                let locator = ctx.locator(line);
                ctx.wait_for_element(&locator, present)?;
            }
            Self::WaitForText { present } => {
                let locator = ctx.locator(line);
                let wait = ctx.options.wait;
                wait.poll(|| -> SessionResult<bool> {
                    match ctx.probe(&locator)? {
                        Some(el) => Ok(present && !ctx.session.text(&el)?.is_empty()),
                        None => Ok(!present),
                    }
                })?;
            }
            Self::WaitForVisibility { visible } => {
                let locator = ctx.locator(line);
                let wait = ctx.options.wait;
                wait.poll(|| -> SessionResult<bool> {
                    let displayed = match ctx.probe(&locator)? {
                        Some(el) => ctx.session.is_displayed(&el)?,
                        None => false,
                    };
                    Ok(displayed == visible)
                })?;
            }
            Self::Select { wait } => {
                let el = ctx.find(line)?;
                let raw = ctx.decode(&line.value);
                let by = SelectBy::parse(&raw).map_err(|e| Failure::Invalid {
                    message: format!("bad option index in '{raw}': {e}"),
                })?;
                ctx.session.select_option(&el, &by)?;
                if wait {
                    ctx.wait_for_page()?;
                }
            }
            Self::StoreText => {
                let el = ctx.find(line)?;
                let text = ctx.session.text(&el)?;
                ctx.state.variables.set(&line.value, text);
            }
            Self::StoreEval => {
                if !ctx.session.supports_scripts() {
                    return Err(SessionError::unsupported("script execution").into());
                }
                let code = ctx.state.variables.expand(&line.target);
                match ctx.session.execute_script(&code)? {
                    Some(result) => ctx.state.variables.set(&line.value, result),
                    None => ctx.state.variables.unset(&line.value),
                }
            }
            Self::DeleteCookie => {
                let name = ctx.decode(&line.target);
                let deleted = ctx
                    .session
                    .cookie_named(&name)
                    .and_then(|cookie| match cookie {
                        Some(c) => ctx.session.delete_cookie(&c),
                        None => Ok(()),
                    });
                if let Err(e) = deleted {
                    tracing::warn!(cookie = %name, error = %e, "cookie delete failed, continuing");
                }
            }
        }
        Ok(())
    }
}

fn is_input_like(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea")
}
