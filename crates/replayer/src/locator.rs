//! Locator resolution for recorded targets.
//!
//! Selenium IDE targets carry an optional strategy prefix (`css=`, `id=`,
//! `identifier=`, `name=`, `link=`, `xpath=`). A target without a recognized
//! prefix is an XPath expression.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element lookup request understood by an automation session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Element id attribute
    Id(String),
    /// Element name attribute
    Name(String),
    /// Exact anchor text
    LinkText(String),
    /// XPath expression
    XPath(String),
}

impl Locator {
    /// Resolve a raw target string.
    ///
    /// Prefix matching is case-sensitive; every string resolves to some locator.
    #[must_use]
    pub fn resolve(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix("css=") {
            Self::Css(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("id=") {
            Self::Id(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("identifier=") {
            Self::Id(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("name=") {
            Self::Name(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("link=") {
            Self::LinkText(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("xpath=") {
            Self::XPath(rest.to_string())
        } else {
            Self::XPath(raw.to_string())
        }
    }

    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// XPath locator matching any element whose own text contains `text`
    #[must_use]
    pub fn containing_text(text: &str) -> Self {
        Self::XPath(format!("//*[contains(text(),{})]", xpath_literal(text)))
    }

    /// Strategy name, as used by the W3C WebDriver protocol
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css selector",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::LinkText(_) => "link text",
            Self::XPath(_) => "xpath",
        }
    }

    /// Selector with the prefix stripped
    #[must_use]
    pub fn selector(&self) -> &str {
        match self {
            Self::Css(s) | Self::Id(s) | Self::Name(s) | Self::LinkText(s) | Self::XPath(s) => s,
        }
    }
}

impl FromStr for Locator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::resolve(s))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::Id(s) => write!(f, "id={s}"),
            Self::Name(s) => write!(f, "name={s}"),
            Self::LinkText(s) => write!(f, "link={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// Quote `text` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so text holding both quote kinds is
/// spliced together with `concat()`.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text
            .split('\'')
            .map(|part| format!("'{part}'"))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_prefixed_targets() {
            assert_eq!(Locator::resolve("css=.btn"), Locator::Css(".btn".into()));
            assert_eq!(Locator::resolve("id=go"), Locator::Id("go".into()));
            assert_eq!(Locator::resolve("identifier=go"), Locator::Id("go".into()));
            assert_eq!(Locator::resolve("name=q"), Locator::Name("q".into()));
            assert_eq!(
                Locator::resolve("link=Home"),
                Locator::LinkText("Home".into())
            );
            assert_eq!(Locator::resolve("xpath=//a"), Locator::XPath("//a".into()));
        }

        #[test]
        fn test_unprefixed_is_xpath() {
            assert_eq!(Locator::resolve("//a"), Locator::XPath("//a".into()));
            assert_eq!(
                Locator::resolve("//div[@id='x']"),
                Locator::XPath("//div[@id='x']".into())
            );
        }

        #[test]
        fn test_prefix_is_case_sensitive() {
            assert_eq!(Locator::resolve("CSS=.btn"), Locator::XPath("CSS=.btn".into()));
            assert_eq!(Locator::resolve("Id=go"), Locator::XPath("Id=go".into()));
        }

        #[test]
        fn test_only_leading_prefix_stripped() {
            assert_eq!(
                Locator::resolve("css=a[href='css=x']"),
                Locator::Css("a[href='css=x']".into())
            );
        }

        #[test]
        fn test_from_str() {
            let locator: Locator = "name=email".parse().unwrap();
            assert_eq!(locator.strategy(), "name");
            assert_eq!(locator.selector(), "email");
        }
    }

    mod literal_tests {
        use super::*;

        #[test]
        fn test_plain_text() {
            assert_eq!(xpath_literal("Day Laborers"), "'Day Laborers'");
        }

        #[test]
        fn test_single_quote() {
            assert_eq!(xpath_literal("Bob's"), "\"Bob's\"");
        }

        #[test]
        fn test_both_quotes() {
            assert_eq!(
                xpath_literal("Bob's \"B\""),
                "concat('Bob', \"'\", 's \"B\"')"
            );
        }

        #[test]
        fn test_containing_text() {
            assert_eq!(
                Locator::containing_text("Day Laborers"),
                Locator::XPath("//*[contains(text(),'Day Laborers')]".into())
            );
        }
    }

    proptest! {
        #[test]
        fn prop_display_round_trips(selector in "[a-z#.\\[\\]=' ]{0,20}") {
            for locator in [
                Locator::Css(selector.clone()),
                Locator::Id(selector.clone()),
                Locator::Name(selector.clone()),
                Locator::LinkText(selector.clone()),
                Locator::XPath(selector.clone()),
            ] {
                prop_assert_eq!(Locator::resolve(&locator.to_string()), locator);
            }
        }

        #[test]
        fn prop_resolve_never_grows(raw in ".{0,40}") {
            let locator = Locator::resolve(&raw);
            prop_assert!(locator.selector().len() <= raw.len());
            prop_assert!(raw.ends_with(locator.selector()));
        }
    }
}
