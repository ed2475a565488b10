//! Report building
//!
//! Two pure stages: a [`Report`] tree is built from an executed suite or
//! test, then rendered as a self-contained HTML document. A command row's
//! displayed verdict is re-derived from the `OK` prefix of its stored
//! result text; the serialized result string is the ground truth here,
//! not the execution flags.

use std::fmt;
use std::path::Path;

use crate::common::RunConfig;
use crate::rc::wire::SUCCESS_PREFIX;
use crate::runner::{Suite, Test, TestState};

/// Literal verdict of a suite or test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    Errored,
}

impl Verdict {
    /// Row class in the rendered document
    fn css_class(self) -> &'static str {
        match self {
            Verdict::Passed => "passed",
            Verdict::Failed => "failed",
            Verdict::Errored => "error",
        }
    }

    fn from_test(test: &Test) -> Self {
        match test.state {
            TestState::Passed => Verdict::Passed,
            TestState::Failed => Verdict::Failed,
            TestState::Errored { .. } => Verdict::Errored,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Passed => "PASSED",
            Verdict::Failed => "FAILED",
            Verdict::Errored => "ERROR",
        })
    }
}

/// Structured report tree
#[derive(Debug)]
pub struct Report {
    pub title: String,
    pub timestamp: String,
    pub browser: String,
    pub verdict: Verdict,
    /// Document file name of the run's source
    pub source_name: String,
    /// Suite index rows; empty for single-test reports
    pub summary: Vec<SummaryRow>,
    pub tests: Vec<TestSection>,
}

/// One suite index row: a label linking to its test section
#[derive(Debug)]
pub struct SummaryRow {
    pub label: String,
    pub verdict: Verdict,
}

/// One test's rows in the report
#[derive(Debug)]
pub struct TestSection {
    pub anchor: String,
    pub file_name: String,
    pub name: String,
    pub verdict: Verdict,
    /// Diagnostic for tests that never got a session
    pub error_message: Option<String>,
    pub rows: Vec<CommandRow>,
}

/// One executed command row
#[derive(Debug)]
pub struct CommandRow {
    pub name: String,
    pub args: Option<Vec<String>>,
    pub result: String,
    /// Derived solely from the result text's success prefix
    pub passed: bool,
}

/// Build the report tree for a suite run
pub fn from_suite(suite: &Suite, config: &RunConfig) -> Report {
    Report {
        title: suite.name.clone(),
        timestamp: timestamp(),
        browser: config.browser.clone(),
        verdict: if suite.passed() {
            Verdict::Passed
        } else {
            Verdict::Failed
        },
        source_name: file_name(&suite.file),
        summary: suite
            .tests
            .iter()
            .map(|test| SummaryRow {
                label: test.anchor(),
                verdict: Verdict::from_test(test),
            })
            .collect(),
        tests: suite.tests.iter().map(test_section).collect(),
    }
}

/// Build the report tree for a single-test run
pub fn from_test(test: &Test, config: &RunConfig) -> Report {
    Report {
        title: test.name.clone(),
        timestamp: timestamp(),
        browser: config.browser.clone(),
        verdict: Verdict::from_test(test),
        source_name: file_name(&test.file),
        summary: Vec::new(),
        tests: vec![test_section(test)],
    }
}

fn test_section(test: &Test) -> TestSection {
    let mut rows = Vec::with_capacity(test.commands.len());
    for command in &test.commands {
        rows.push(CommandRow {
            name: command.name.clone(),
            args: command.args.clone(),
            result: command.result.clone(),
            passed: command.result.starts_with(SUCCESS_PREFIX),
        });
        // Mirrors the execution abort point
        if command.failure {
            break;
        }
    }
    TestSection {
        anchor: test.anchor(),
        file_name: file_name(&test.file),
        name: test.name.clone(),
        verdict: Verdict::from_test(test),
        error_message: match &test.state {
            TestState::Errored { message } => Some(message.clone()),
            _ => None,
        },
        rows,
    }
}

fn timestamp() -> String {
    chrono::Local::now().to_rfc2822()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render the report as a self-contained HTML document
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("<html><head>");
    out.push_str(&format!("<title>{}</title>", escape(&report.title)));
    out.push_str("<style>");
    out.push_str(".ran { background-color: #eeffee; }");
    out.push_str(".passed { background-color: #ccffcc; }");
    out.push_str(".failed { background-color: #ffcccc; }");
    out.push_str(".error { background-color: #ffeeee; }");
    out.push_str("</style>");
    out.push_str("</head><body>");

    out.push_str("<div>\n");
    if report.summary.is_empty() {
        out.push_str("<h1>Test Results</h1>\n");
    } else {
        out.push_str("<h1>Test Suite Results</h1>\n");
    }
    out.push_str(&format!("<h4>date:</h4> {}\n", escape(&report.timestamp)));
    out.push_str(&format!("<h4>browser:</h4> {}\n", escape(&report.browser)));
    out.push_str(&format!("<h4>result:</h4> {}\n", report.verdict));
    out.push_str("</div>\n");

    if !report.summary.is_empty() {
        out.push_str("<div>\n");
        out.push_str(&format!("<h2>{}</h2>\n", escape(&report.source_name)));
        out.push_str("<table border=\"1\">\n");
        out.push_str(&format!(
            "<tr class=\"{}\"><td colspan=\"2\">{}</td></tr>\n",
            report.verdict.css_class(),
            escape(&report.title)
        ));
        for row in &report.summary {
            out.push_str(&format!(
                "<tr class=\"{}\"><td><a href=\"#{}\">{}</a></td><td>{}</td></tr>\n",
                row.verdict.css_class(),
                escape(&row.label),
                escape(&row.label),
                row.verdict
            ));
        }
        out.push_str("</table>\n");
        out.push_str("</div>\n");
    }

    for test in &report.tests {
        out.push_str("<div>\n");
        out.push_str(&format!(
            "<h3><a name=\"{}\">{}</a></h3>\n",
            escape(&test.anchor),
            escape(&test.file_name)
        ));
        out.push_str("<table border=\"1\">\n");
        out.push_str(&format!(
            "<tr class=\"{}\"><td colspan=\"3\">{} {}</td></tr>\n",
            test.verdict.css_class(),
            escape(&test.name),
            test.verdict
        ));
        if let Some(message) = &test.error_message {
            out.push_str(&format!(
                "<tr class=\"error\"><td colspan=\"3\">{}</td></tr>\n",
                escape(message)
            ));
        }
        for row in &test.rows {
            let class = if row.passed { "passed" } else { "failed" };
            out.push_str(&format!("<tr class=\"{class}\"><td>"));
            out.push_str(&escape(&row.name));
            out.push_str("</td><td>");
            if let Some(args) = &row.args {
                out.push_str(&escape(&format!("[{}]", args.join(", "))));
            }
            out.push_str("</td><td>");
            out.push_str(&escape(&row.result));
            out.push_str("</td></tr>\n");
        }
        out.push_str("</table>\n");
        out.push_str("</div>\n");
    }

    out.push_str("</body></html>");
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
