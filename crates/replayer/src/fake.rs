//! In-memory automation session for tests and dry runs.
//!
//! Elements are registered against the exact [`Locator`] a script will use.
//! XPath probes of the form `//*[contains(text(),…)]` are answered by
//! scanning the text of every registered element.

use crate::locator::Locator;
use crate::session::{AutomationSession, Cookie, ElementId, SelectBy, SessionError, SessionResult};
use std::collections::HashMap;

const TEXT_PROBE_PREFIX: &str = "//*[contains(text(),";
const TEXT_PROBE_SUFFIX: &str = ")]";

/// A fake DOM element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    /// Lowercase tag name
    pub tag_name: String,
    /// Rendered text
    pub text: String,
    /// Attributes, including `value` for form controls
    pub attributes: HashMap<String, String>,
    /// Whether the element is displayed
    pub displayed: bool,
    /// `(text, value)` pairs for selection controls
    pub options: Vec<(String, String)>,
    /// Index of the selected option
    pub selected: Option<usize>,
    /// Number of clicks received
    pub clicks: u32,
}

impl FakeElement {
    /// Create a visible element with the given tag
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_lowercase(),
            text: String::new(),
            attributes: HashMap::new(),
            displayed: true,
            options: Vec::new(),
            selected: None,
            clicks: 0,
        }
    }

    /// Set the rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the `value` attribute
    #[must_use]
    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.with_attribute("value", value)
    }

    /// Append a selection option
    #[must_use]
    pub fn with_option(mut self, text: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((text.into(), value.into()));
        self
    }

    /// Mark the element as not displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Current `value` attribute
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.attributes.get("value").map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct Registered {
    locator: Locator,
    element: FakeElement,
    misses_left: u32,
}

/// Scriptable in-memory [`AutomationSession`]
#[derive(Debug, Default)]
pub struct FakeSession {
    title: String,
    url: String,
    pages: HashMap<String, String>,
    history: Vec<String>,
    elements: Vec<Registered>,
    cookies: Vec<Cookie>,
    scripts_enabled: bool,
    script_results: HashMap<String, Option<String>>,
    failures: HashMap<String, SessionError>,
    find_counts: HashMap<Locator, u32>,
    calls: Vec<String>,
}

impl FakeSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Title that becomes current when `url` is navigated to
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, title: impl Into<String>) -> Self {
        self.pages.insert(url.into(), title.into());
        self
    }

    /// Register an element
    #[must_use]
    pub fn with_element(mut self, locator: Locator, element: FakeElement) -> Self {
        self.add_element(locator, element);
        self
    }

    /// Register a cookie
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Result returned when `code` is executed
    #[must_use]
    pub fn with_script_result(mut self, code: impl Into<String>, result: Option<&str>) -> Self {
        self.scripts_enabled = true;
        self.script_results
            .insert(code.into(), result.map(str::to_string));
        self
    }

    /// Register an element, replacing any element under the same locator
    pub fn add_element(&mut self, locator: Locator, element: FakeElement) {
        self.add_element_after(locator, element, 0);
    }

    /// Register an element that is only found after `misses` failed lookups
    pub fn add_element_after(&mut self, locator: Locator, element: FakeElement, misses: u32) {
        self.elements.retain(|r| r.locator != locator);
        self.elements.push(Registered {
            locator,
            element,
            misses_left: misses,
        });
    }

    /// Remove an element
    pub fn remove_element(&mut self, locator: &Locator) {
        self.elements.retain(|r| &r.locator != locator);
    }

    /// Make every call to `operation` fail with `error`
    pub fn fail_on(&mut self, operation: &str, error: SessionError) {
        self.failures.insert(operation.to_string(), error);
    }

    /// Element registered under `locator`
    #[must_use]
    pub fn element(&self, locator: &Locator) -> Option<&FakeElement> {
        self.elements
            .iter()
            .find(|r| &r.locator == locator)
            .map(|r| &r.element)
    }

    /// Navigation history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Remaining cookies
    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Every call made, in order
    #[must_use]
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Check if an operation was called
    #[must_use]
    pub fn was_called(&self, operation: &str) -> bool {
        self.calls.iter().any(|c| c.starts_with(operation))
    }

    /// Number of `find_element` calls made for `locator`
    #[must_use]
    pub fn find_count(&self, locator: &Locator) -> u32 {
        self.find_counts.get(locator).copied().unwrap_or(0)
    }

    fn record(&mut self, operation: &str, detail: &str) -> SessionResult<()> {
        self.calls.push(format!("{operation}:{detail}"));
        match self.failures.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn index_of(&self, element: &ElementId) -> SessionResult<usize> {
        element
            .as_str()
            .strip_prefix("fake-")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n < self.elements.len())
            .ok_or_else(|| SessionError::backend(format!("stale element reference: {element}")))
    }

    fn get(&self, element: &ElementId) -> SessionResult<&FakeElement> {
        let idx = self.index_of(element)?;
        Ok(&self.elements[idx].element)
    }

    fn get_mut(&mut self, element: &ElementId) -> SessionResult<&mut FakeElement> {
        let idx = self.index_of(element)?;
        Ok(&mut self.elements[idx].element)
    }

    fn locate(&mut self, locator: &Locator) -> Option<usize> {
        if let Some(needle) = text_probe(locator) {
            return self
                .elements
                .iter()
                .position(|r| r.misses_left == 0 && r.element.text.contains(&needle));
        }

        let idx = self.elements.iter().position(|r| &r.locator == locator)?;
        let entry = &mut self.elements[idx];
        if entry.misses_left > 0 {
            entry.misses_left -= 1;
            return None;
        }
        Some(idx)
    }
}

impl AutomationSession for FakeSession {
    fn navigate(&mut self, url: &str) -> SessionResult<()> {
        self.record("navigate", url)?;
        self.url = url.to_string();
        self.history.push(url.to_string());
        if let Some(title) = self.pages.get(url) {
            self.title.clone_from(title);
        }
        Ok(())
    }

    fn title(&mut self) -> SessionResult<String> {
        self.record("title", "")?;
        Ok(self.title.clone())
    }

    fn current_url(&mut self) -> SessionResult<String> {
        self.record("current_url", "")?;
        Ok(self.url.clone())
    }

    fn find_element(&mut self, locator: &Locator) -> SessionResult<ElementId> {
        self.record("find_element", &locator.to_string())?;
        *self.find_counts.entry(locator.clone()).or_insert(0) += 1;
        self.locate(locator)
            .map(|idx| ElementId::new(format!("fake-{idx}")))
            .ok_or_else(|| SessionError::no_such_element(locator))
    }

    fn tag_name(&mut self, element: &ElementId) -> SessionResult<String> {
        self.record("tag_name", element.as_str())?;
        Ok(self.get(element)?.tag_name.clone())
    }

    fn text(&mut self, element: &ElementId) -> SessionResult<String> {
        self.record("text", element.as_str())?;
        Ok(self.get(element)?.text.clone())
    }

    fn attribute(&mut self, element: &ElementId, name: &str) -> SessionResult<Option<String>> {
        self.record("attribute", &format!("{element}@{name}"))?;
        Ok(self.get(element)?.attributes.get(name).cloned())
    }

    fn is_displayed(&mut self, element: &ElementId) -> SessionResult<bool> {
        self.record("is_displayed", element.as_str())?;
        Ok(self.get(element)?.displayed)
    }

    fn click(&mut self, element: &ElementId) -> SessionResult<()> {
        self.record("click", element.as_str())?;
        self.get_mut(element)?.clicks += 1;
        Ok(())
    }

    fn clear(&mut self, element: &ElementId) -> SessionResult<()> {
        self.record("clear", element.as_str())?;
        self.get_mut(element)?
            .attributes
            .insert("value".to_string(), String::new());
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementId, keys: &str) -> SessionResult<()> {
        self.record("send_keys", &format!("{element}:{keys}"))?;
        self.get_mut(element)?
            .attributes
            .entry("value".to_string())
            .or_default()
            .push_str(keys);
        Ok(())
    }

    fn select_option(&mut self, element: &ElementId, by: &SelectBy) -> SessionResult<()> {
        self.record("select_option", element.as_str())?;
        let el = self.get_mut(element)?;
        let idx = match by {
            SelectBy::Text(text) => el.options.iter().position(|(t, _)| t == text),
            SelectBy::Value(value) => el.options.iter().position(|(_, v)| v == value),
            SelectBy::Index(i) => (*i < el.options.len()).then_some(*i),
        }
        .ok_or_else(|| SessionError::NoSuchElement {
            locator: format!("option {by:?}"),
        })?;
        el.selected = Some(idx);
        let value = el.options[idx].1.clone();
        el.attributes.insert("value".to_string(), value);
        Ok(())
    }

    fn supports_scripts(&self) -> bool {
        self.scripts_enabled
    }

    fn execute_script(&mut self, code: &str) -> SessionResult<Option<String>> {
        self.record("execute_script", code)?;
        if !self.scripts_enabled {
            return Err(SessionError::unsupported("script execution"));
        }
        Ok(self.script_results.get(code).cloned().flatten())
    }

    fn cookie_named(&mut self, name: &str) -> SessionResult<Option<Cookie>> {
        self.record("cookie_named", name)?;
        Ok(self.cookies.iter().find(|c| c.name == name).cloned())
    }

    fn delete_cookie(&mut self, cookie: &Cookie) -> SessionResult<()> {
        self.record("delete_cookie", &cookie.name)?;
        self.cookies.retain(|c| c.name != cookie.name);
        Ok(())
    }
}

/// Search text of a `//*[contains(text(),…)]` probe
fn text_probe(locator: &Locator) -> Option<String> {
    let Locator::XPath(expr) = locator else {
        return None;
    };
    let literal = expr
        .strip_prefix(TEXT_PROBE_PREFIX)?
        .strip_suffix(TEXT_PROBE_SUFFIX)?;
    parse_xpath_literal(literal)
}

/// Parse a quoted XPath literal or a `concat()` of quoted literals
fn parse_xpath_literal(raw: &str) -> Option<String> {
    let body = match raw.strip_prefix("concat(") {
        Some(rest) => rest.strip_suffix(')')?,
        None => raw,
    };

    let mut out = String::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => loop {
                match chars.next()? {
                    q if q == c => break,
                    other => out.push(other),
                }
            },
            ',' | ' ' => {}
            _ => return None,
        }
    }
    Some(out)
}
