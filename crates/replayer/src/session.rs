//! Automation session capability consumed by the interpreter.
//!
//! The trait mirrors the small slice of a WebDriver-style backend the
//! command table needs. Implementations own their transport; the interpreter
//! only ever holds one session per run and issues one call at a time.

use crate::locator::Locator;
use std::fmt;
use thiserror::Error;

/// Result type for session calls
pub type SessionResult<T> = Result<T, SessionError>;

/// Opaque handle to an element found by a session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(pub String);

impl ElementId {
    /// Create a new handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw handle value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an option is picked from a selection control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBy {
    /// Visible option text
    Text(String),
    /// Option `value` attribute
    Value(String),
    /// Zero-based option index
    Index(usize),
}

impl SelectBy {
    /// Parse a recorded select value (`label=`, `value=`, `index=` or bare text)
    pub fn parse(raw: &str) -> Result<Self, std::num::ParseIntError> {
        if let Some(label) = raw.strip_prefix("label=") {
            Ok(Self::Text(label.to_string()))
        } else if let Some(value) = raw.strip_prefix("value=") {
            Ok(Self::Value(value.to_string()))
        } else if let Some(index) = raw.strip_prefix("index=") {
            Ok(Self::Index(index.trim().parse()?))
        } else {
            Ok(Self::Text(raw.to_string()))
        }
    }
}

/// Browser cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
}

impl Cookie {
    /// Create a new cookie
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Errors reported by an automation session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The locator matched nothing
    #[error("Unable to locate element: {locator}")]
    NoSuchElement {
        /// Locator that was searched
        locator: String,
    },

    /// The backend rejected a check
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// The backend lacks an optional capability
    #[error("Capability not supported: {capability}")]
    Unsupported {
        /// Capability name
        capability: String,
    },

    /// Transport or protocol failure
    #[error("Backend error: {message}")]
    Backend {
        /// Error message
        message: String,
    },

    /// Another session error with added context
    #[error("{context}: {source}")]
    Wrapped {
        /// What was being attempted
        context: String,
        /// Underlying error
        source: Box<SessionError>,
    },
}

impl SessionError {
    /// Create a not-found error for `locator`
    #[must_use]
    pub fn no_such_element(locator: &Locator) -> Self {
        Self::NoSuchElement {
            locator: locator.to_string(),
        }
    }

    /// Create a backend error
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create an unsupported-capability error
    #[must_use]
    pub fn unsupported(capability: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
        }
    }

    /// Wrap this error with context
    #[must_use]
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Self::Wrapped {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this is a not-found error
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. })
    }

    /// Whether this error counts as a check failure rather than a broken run.
    ///
    /// Not-found and assertion errors qualify, directly or wrapped one level deep.
    #[must_use]
    pub fn is_soft_classified(&self) -> bool {
        match self {
            Self::NoSuchElement { .. } | Self::AssertionFailed { .. } => true,
            Self::Wrapped { source, .. } => matches!(
                source.as_ref(),
                Self::NoSuchElement { .. } | Self::AssertionFailed { .. }
            ),
            Self::Unsupported { .. } | Self::Backend { .. } => false,
        }
    }
}

/// Minimal browser automation surface.
///
/// All calls are blocking. `find_element` must report a missing element as
/// [`SessionError::NoSuchElement`] so `*NotPresent` commands can tell absence
/// apart from transport failures.
pub trait AutomationSession {
    /// Load `url` in the current window
    fn navigate(&mut self, url: &str) -> SessionResult<()>;

    /// Title of the current document
    fn title(&mut self) -> SessionResult<String>;

    /// URL of the current document
    fn current_url(&mut self) -> SessionResult<String>;

    /// Find the first element matching `locator`
    fn find_element(&mut self, locator: &Locator) -> SessionResult<ElementId>;

    /// Lowercase tag name of an element
    fn tag_name(&mut self, element: &ElementId) -> SessionResult<String>;

    /// Rendered text of an element
    fn text(&mut self, element: &ElementId) -> SessionResult<String>;

    /// Attribute or property value; `None` when absent
    fn attribute(&mut self, element: &ElementId, name: &str) -> SessionResult<Option<String>>;

    /// Whether the element is displayed
    fn is_displayed(&mut self, element: &ElementId) -> SessionResult<bool>;

    /// Click an element
    fn click(&mut self, element: &ElementId) -> SessionResult<()>;

    /// Clear an editable element
    fn clear(&mut self, element: &ElementId) -> SessionResult<()>;

    /// Send keystrokes to an element
    fn send_keys(&mut self, element: &ElementId, keys: &str) -> SessionResult<()>;

    /// Pick an option on a selection control
    fn select_option(&mut self, element: &ElementId, by: &SelectBy) -> SessionResult<()>;

    /// Whether [`AutomationSession::execute_script`] is available
    fn supports_scripts(&self) -> bool {
        false
    }

    /// Run a script and return its stringified result
    fn execute_script(&mut self, code: &str) -> SessionResult<Option<String>> {
        let _ = code;
        Err(SessionError::unsupported("script execution"))
    }

    /// Look up a cookie by name
    fn cookie_named(&mut self, name: &str) -> SessionResult<Option<Cookie>>;

    /// Delete a cookie
    fn delete_cookie(&mut self, cookie: &Cookie) -> SessionResult<()>;
}

/// Opens sessions for live runs
pub trait SessionFactory {
    /// Open a session for one fixture (browser combination)
    fn open(&mut self, combination: &str) -> SessionResult<Box<dyn AutomationSession>>;
}
