//! Selenium IDE HTML-table script and suite parsing.

use crate::result::{ReplayError, ReplayResult};
use crate::script::{Script, ScriptLine, UNTITLED_SCRIPT};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

/// One script link from a suite file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteEntry {
    /// Link text
    pub title: String,
    /// Script path, relative to the suite file
    pub href: String,
}

fn selector(css: &str) -> ReplayResult<Selector> {
    Selector::parse(css).map_err(|e| ReplayError::parse(format!("bad selector '{css}': {e}")))
}

fn ensure_content(content: &str) -> ReplayResult<()> {
    if content.trim().is_empty() {
        return Err(ReplayError::parse("document is empty"));
    }
    Ok(())
}

/// Parse a script document.
///
/// Only `<tbody>` rows with exactly three cells become lines.
///
/// # Errors
///
/// Returns [`ReplayError::Parse`] for empty input.
pub fn parse_script(content: &str) -> ReplayResult<Script> {
    ensure_content(content)?;
    let doc = Html::parse_document(content);

    let title = doc
        .select(&selector("head title")?)
        .next()
        .map_or_else(|| UNTITLED_SCRIPT.to_string(), |t| t.text().collect());
    let base_url = doc
        .select(&selector(r#"link[rel="selenium.base"]"#)?)
        .next()
        .and_then(|l| l.value().attr("href"))
        .unwrap_or_default()
        .to_string();

    let mut script = Script::new(title, base_url);
    for row in doc.select(&selector("table tbody tr")?) {
        let cells: Vec<String> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .map(|td| td.text().collect())
            .collect();
        if let [command, target, value] = cells.as_slice() {
            script.lines.push(ScriptLine::new(command, target, value));
        }
    }
    Ok(script)
}

/// Parse a suite document into its script links, in order.
///
/// # Errors
///
/// Returns [`ReplayError::Parse`] for empty input.
pub fn parse_suite(content: &str) -> ReplayResult<Vec<SuiteEntry>> {
    ensure_content(content)?;
    let doc = Html::parse_document(content);
    let entries = doc
        .select(&selector("table.selenium a")?)
        .map(|a| SuiteEntry {
            title: a.text().collect(),
            href: a.value().attr("href").unwrap_or_default().to_string(),
        })
        .collect();
    Ok(entries)
}

/// Load and parse a script file
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed
pub fn load_script(path: &Path) -> ReplayResult<Script> {
    let content = std::fs::read_to_string(path)?;
    parse_script(&content).map_err(|e| ReplayError::parse(format!("{}: {e}", path.display())))
}

/// Load and parse a suite file
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed
pub fn load_suite(path: &Path) -> ReplayResult<Vec<SuiteEntry>> {
    let content = std::fs::read_to_string(path)?;
    parse_suite(&content).map_err(|e| ReplayError::parse(format!("{}: {e}", path.display())))
}
