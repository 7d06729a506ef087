//! NUnit 2.5 `test-results` serialization.

use super::accumulator::Counters;
use super::environment::Environment;
use super::tree::{ScopeNode, StatusFlags, TestCaseNode};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::time::Duration;

/// Borrowed view of everything written into a report
pub(crate) struct ReportView<'a> {
    pub(crate) name: &'a str,
    pub(crate) created: DateTime<Local>,
    pub(crate) environment: &'a Environment,
    pub(crate) counters: Counters,
    pub(crate) root: Option<&'a ScopeNode>,
}

/// Render the full report document
pub(crate) fn render(view: &ReportView<'_>) -> String {
    let mut xml = String::new();
    let c = view.counters;

    xml.push_str(r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>"#);
    xml.push('\n');
    let _ = writeln!(
        xml,
        r#"<test-results name="{}" total="{}" errors="{}" failures="{}" not-run="{}" inconclusive="{}" ignored="{}" skipped="0" invalid="{}" date="{}" time="{}">"#,
        escape_xml(view.name),
        c.total,
        c.errors,
        c.failures,
        c.not_run(),
        c.inconclusive,
        c.ignored,
        c.invalid,
        view.created.format("%Y-%m-%d"),
        view.created.format("%H:%M:%S"),
    );

    let env = view.environment;
    let _ = writeln!(
        xml,
        r#"  <environment nunit-version="{}" clr-version="{}" os-version="{}" platform="{}" cwd="{}" machine-name="{}" user="{}" user-domain="{}" />"#,
        escape_xml(&env.nunit_version),
        escape_xml(&env.clr_version),
        escape_xml(&env.os_version),
        escape_xml(&env.platform),
        escape_xml(&env.cwd),
        escape_xml(&env.machine_name),
        escape_xml(&env.user),
        escape_xml(&env.user_domain),
    );
    let culture = escape_xml(&env.culture);
    let _ = writeln!(
        xml,
        r#"  <culture-info current-culture="{culture}" current-uiculture="{culture}" />"#
    );

    if let Some(root) = view.root {
        write_suite(&mut xml, root, 1);
    }

    xml.push_str("</test-results>\n");
    xml
}

fn write_suite(xml: &mut String, suite: &ScopeNode, depth: usize) {
    let pad = indent(depth);
    let _ = writeln!(
        xml,
        r#"{pad}<test-suite type="{}" name="{}"{}{}>"#,
        suite.kind,
        escape_xml(&suite.name),
        status_attrs(&suite.status),
        time_attr(suite.time),
    );
    let _ = writeln!(xml, "{pad}  <results>");
    for child in &suite.suites {
        write_suite(xml, child, depth + 2);
    }
    for case in &suite.cases {
        write_case(xml, case, depth + 2);
    }
    let _ = writeln!(xml, "{pad}  </results>");
    let _ = writeln!(xml, "{pad}</test-suite>");
}

fn write_case(xml: &mut String, case: &TestCaseNode, depth: usize) {
    let pad = indent(depth);
    let _ = write!(
        xml,
        r#"{pad}<test-case name="{}"{}{} asserts="{}""#,
        escape_xml(&case.name),
        status_attrs(&case.status),
        time_attr(case.time),
        case.asserts,
    );

    if case.properties.is_empty() && case.failure.is_none() && case.reason.is_none() {
        xml.push_str(" />\n");
        return;
    }
    xml.push_str(">\n");

    if !case.properties.is_empty() {
        let _ = writeln!(xml, "{pad}  <properties>");
        for (name, value) in &case.properties {
            let _ = writeln!(
                xml,
                r#"{pad}    <property name="{}" value="{}" />"#,
                escape_xml(name),
                escape_xml(value),
            );
        }
        let _ = writeln!(xml, "{pad}  </properties>");
    }

    if let Some(failure) = &case.failure {
        let _ = writeln!(xml, "{pad}  <failure>");
        let _ = writeln!(xml, "{pad}    <message>{}</message>", cdata(&failure.message));
        let _ = writeln!(
            xml,
            "{pad}    <stack-trace>{}</stack-trace>",
            cdata(&failure.stack_trace)
        );
        let _ = writeln!(xml, "{pad}  </failure>");
    } else if let Some(reason) = &case.reason {
        let _ = writeln!(xml, "{pad}  <reason>");
        let _ = writeln!(xml, "{pad}    <message>{}</message>", cdata(reason));
        let _ = writeln!(xml, "{pad}  </reason>");
    }

    let _ = writeln!(xml, "{pad}</test-case>");
}

fn status_attrs(status: &StatusFlags) -> String {
    let mut attrs = String::new();
    if let Some(executed) = status.executed {
        let _ = write!(attrs, r#" executed="{}""#, bool_text(executed));
    }
    if let Some(result) = status.result {
        let _ = write!(attrs, r#" result="{result}""#);
    }
    if let Some(success) = status.success {
        let _ = write!(attrs, r#" success="{}""#, bool_text(success));
    }
    attrs
}

fn time_attr(time: Option<Duration>) -> String {
    time.map(|t| format!(r#" time="{:.3}""#, t.as_secs_f64()))
        .unwrap_or_default()
}

const fn bool_text(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Wrap text in a CDATA section, splitting any embedded terminator
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// Escape XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::report::{ResultAccumulator, ResultState};
    use crate::script::RunDescriptor;

    fn environment() -> Environment {
        Environment {
            nunit_version: "0.4.0".to_string(),
            clr_version: "rust".to_string(),
            os_version: "linux x86_64".to_string(),
            platform: "unix".to_string(),
            cwd: "/tmp".to_string(),
            machine_name: "cedar".to_string(),
            user: "ci".to_string(),
            user_domain: "cedar".to_string(),
            culture: "en-US".to_string(),
        }
    }

    mod escape_xml_tests {
        use super::*;

        #[test]
        fn test_escape_special_chars() {
            assert_eq!(escape_xml("a & b"), "a &amp; b");
            assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
            assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
            assert_eq!(escape_xml("it's"), "it&apos;s");
        }

        #[test]
        fn test_cdata_splits_terminator() {
            assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
            assert_eq!(cdata("plain"), "<![CDATA[plain]]>");
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_empty_report() {
            let acc = ResultAccumulator::with_environment("Empty Run", environment());
            let xml = acc.to_xml();
            assert!(xml.starts_with("<?xml"));
            assert!(xml.contains(r#"<test-results name="Empty Run" total="0""#));
            assert!(xml.contains(r#"machine-name="cedar""#));
            assert!(xml.contains(r#"current-culture="en-US""#));
            assert!(!xml.contains("<test-suite"));
            assert!(xml.trim_end().ends_with("</test-results>"));
        }

        #[test]
        fn test_header_date_and_time_formats() {
            let acc = ResultAccumulator::with_environment("run", environment());
            let xml = acc.to_xml();
            let date = acc.created().format("%Y-%m-%d").to_string();
            let time = acc.created().format("%H:%M:%S").to_string();
            assert!(xml.contains(&format!(r#"date="{date}" time="{time}""#)));
        }

        #[test]
        fn test_tree_and_counters() {
            let acc = ResultAccumulator::with_environment("run", environment());
            let pass = RunDescriptor::new("Movers.Smoke", "firefox", "Home");
            let fail = RunDescriptor::new("Movers.Smoke", "firefox", "Login <admin>");
            let skip = RunDescriptor::new("Movers.Smoke", "firefox", "Legacy");
            acc.assertion_passed(&pass);
            acc.assertion_passed(&pass);
            acc.assertion_failed(&fail, "expected 'x'", "assertText, id=a, x");
            acc.invalid(&skip);
            acc.add_property(&pass, "browser", "firefox & co");

            let xml = acc.to_xml();
            assert!(xml.contains(
                r#"total="3" errors="0" failures="1" not-run="1" inconclusive="0" ignored="0" skipped="0" invalid="1""#
            ));
            assert!(xml.contains(r#"<test-suite type="Namespace" name="Movers" executed="False" result="Invalid" success="False""#));
            assert!(xml.contains(r#"<test-suite type="Namespace" name="Smoke""#));
            assert!(xml.contains(r#"<test-suite type="TestFixture" name="firefox""#));
            assert!(xml.contains(r#"<test-case name="Movers.Smoke.firefox.Home" executed="True" result="Success" success="True" time=""#));
            assert!(xml.contains(r#"asserts="2""#));
            assert!(xml.contains(r#"name="Movers.Smoke.firefox.Login &lt;admin&gt;""#));
            assert!(xml.contains("<message><![CDATA[expected 'x']]></message>"));
            assert!(xml.contains("<stack-trace><![CDATA[assertText, id=a, x]]></stack-trace>"));
            assert!(xml.contains(r#"<property name="browser" value="firefox &amp; co" />"#));
        }

        #[test]
        fn test_unset_flags_are_omitted() {
            let acc = ResultAccumulator::with_environment("run", environment());
            let d = RunDescriptor::new("S", "f", "t");
            acc.inconclusive(&d);
            let xml = acc.to_xml();
            let case_line = xml
                .lines()
                .find(|l| l.contains("<test-case"))
                .unwrap()
                .to_string();
            assert!(case_line.contains(r#"executed="False" result="Inconclusive""#));
            assert!(!case_line.contains("success="));
            assert_eq!(
                acc.find_test_case(&d).unwrap().status.result,
                Some(ResultState::Inconclusive)
            );
        }

        #[test]
        fn test_reason_written_for_ignored() {
            let acc = ResultAccumulator::with_environment("run", environment());
            acc.ignore(&RunDescriptor::new("S", "f", "t"), "not on this grid");
            let xml = acc.to_xml();
            assert!(xml.contains("<reason>"));
            assert!(xml.contains("<![CDATA[not on this grid]]>"));
            assert!(xml.contains(r#"not-run="1""#));
        }

        #[test]
        fn test_time_has_three_decimals() {
            assert_eq!(time_attr(Some(Duration::from_millis(1500))), r#" time="1.500""#);
            assert_eq!(time_attr(None), "");
        }
    }
}
