//! Script variables: `${name}` substitution and HTML entity decoding.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+?)\}").expect("placeholder pattern is valid"));

/// Named string slots with case-insensitive keys.
///
/// A slot may exist but be unset (`storeEval` of a script returning nothing).
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    slots: HashMap<String, Option<String>>,
}

impl VariableStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any previous value
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.slots.insert(name.to_lowercase(), Some(value.into()));
    }

    /// Mark `name` as present but without a value
    pub fn unset(&mut self, name: &str) {
        self.slots.insert(name.to_lowercase(), None);
    }

    /// Value stored under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.slots
            .get(&name.to_lowercase())
            .and_then(Option::as_deref)
    }

    /// Number of slots, set or unset
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Replace every `${name}` occurrence in `raw`.
    ///
    /// Matches are collected from the original string before any replacement,
    /// so substituted values are never rescanned. Unset names expand to "".
    #[must_use]
    pub fn expand(&self, raw: &str) -> String {
        PLACEHOLDER
            .replace_all(raw, |caps: &Captures<'_>| {
                self.get(&caps[1]).unwrap_or_default().to_string()
            })
            .into_owned()
    }

    /// Expand variables, then decode HTML entities in the result
    #[must_use]
    pub fn decode(&self, raw: &str) -> String {
        html_decode(&self.expand(raw))
    }
}

/// Decode HTML character references: the full HTML5 named set plus
/// decimal and hex numeric references.
///
/// Unknown references and bare ampersands are left untouched.
#[must_use]
pub fn html_decode(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_store() -> VariableStore {
        let mut vars = VariableStore::new();
        vars.set("a", "letter a");
        vars.set("movingvan", "Moving Van");
        vars.set("whoa-a-dash", "Dashes!");
        vars
    }

    mod store_tests {
        use super::*;

        #[test]
        fn test_keys_are_case_insensitive() {
            let mut vars = VariableStore::new();
            vars.set("UserName", "alice");
            assert_eq!(vars.get("username"), Some("alice"));
            vars.set("USERNAME", "bob");
            assert_eq!(vars.get("UserName"), Some("bob"));
            assert_eq!(vars.len(), 1);
        }

        #[test]
        fn test_unset_slot_has_no_value() {
            let mut vars = VariableStore::new();
            vars.set("x", "1");
            vars.unset("x");
            assert_eq!(vars.get("x"), None);
            assert_eq!(vars.len(), 1);
        }
    }

    mod expand_tests {
        use super::*;

        #[test]
        fn test_no_placeholders() {
            assert_eq!(sample_store().expand("b"), "b");
        }

        #[test]
        fn test_single_placeholder() {
            assert_eq!(sample_store().expand("${a}"), "letter a");
        }

        #[test]
        fn test_placeholder_with_trailing_text() {
            assert_eq!(sample_store().expand("${a} and b"), "letter a and b");
        }

        #[test]
        fn test_dashed_name() {
            assert_eq!(
                sample_store().expand("${whoa-a-dash} and b"),
                "Dashes! and b"
            );
        }

        #[test]
        fn test_unset_name_expands_empty() {
            assert_eq!(sample_store().expand("[${missing}]"), "[]");
        }

        #[test]
        fn test_multiple_placeholders() {
            assert_eq!(
                sample_store().expand("${a}/${movingvan}/${A}"),
                "letter a/Moving Van/letter a"
            );
        }

        #[test]
        fn test_substituted_values_are_not_rescanned() {
            let mut vars = VariableStore::new();
            vars.set("outer", "${inner}");
            vars.set("inner", "boom");
            assert_eq!(vars.expand("${outer} ${inner}"), "${inner} boom");
        }

        #[test]
        fn test_empty_braces_left_alone() {
            assert_eq!(sample_store().expand("${}"), "${}");
        }
    }

    mod decode_tests {
        use super::*;

        #[test]
        fn test_named_entities() {
            assert_eq!(
                html_decode("Local Movers &amp; Day Labor"),
                "Local Movers & Day Labor"
            );
            assert_eq!(
                html_decode("Johnny &quot;B&quot; Movers"),
                "Johnny \"B\" Movers"
            );
            assert_eq!(html_decode("&lt;b&gt;"), "<b>");
        }

        #[test]
        fn test_numeric_entities() {
            assert_eq!(html_decode("Bob&#39;s"), "Bob's");
            assert_eq!(html_decode("Bob&#x27;s"), "Bob's");
        }

        #[test]
        fn test_unknown_and_bare_ampersands_kept() {
            assert_eq!(html_decode("A & B"), "A & B");
            assert_eq!(html_decode("&bogus;"), "&bogus;");
        }

        #[test]
        fn test_accented_and_symbol_entities() {
            assert_eq!(html_decode("Caf&eacute;"), "Café");
            assert_eq!(html_decode("Espa&ntilde;a"), "España");
            assert_eq!(html_decode("M&uuml;ller &amp; S&ouml;hne"), "Müller & Söhne");
            assert_eq!(html_decode("Next &rarr;"), "Next →");
            assert_eq!(html_decode("&#233;t&#xE9;"), "été");
        }

        #[test]
        fn test_decode_resolves_accented_entities() {
            let mut vars = VariableStore::new();
            vars.set("city", "Montr&eacute;al");
            assert_eq!(VariableStore::new().decode("Caf&eacute;"), "Café");
            assert_eq!(vars.decode("Caf&eacute; ${city}"), "Café Montréal");
        }

        #[test]
        fn test_decode_applies_after_expansion() {
            let mut vars = VariableStore::new();
            vars.set("company", "Smith &amp; Sons");
            assert_eq!(vars.decode("${company} Ltd"), "Smith & Sons Ltd");
        }
    }

    proptest! {
        #[test]
        fn prop_expand_without_placeholders_is_identity(raw in "[^$]{0,40}") {
            prop_assert_eq!(sample_store().expand(&raw), raw);
        }

        #[test]
        fn prop_stored_value_expands(name in "[a-z][a-z0-9_-]{0,10}", value in "[^$]{0,20}") {
            let mut vars = VariableStore::new();
            vars.set(&name, value.clone());
            prop_assert_eq!(vars.expand(&format!("${{{name}}}")), value);
        }

        #[test]
        fn prop_decode_without_ampersand_is_identity(raw in "[^&]{0,40}") {
            prop_assert_eq!(html_decode(&raw), raw);
        }
    }
}
