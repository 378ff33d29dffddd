//! HTML summary of a suite run

use std::fmt::Write;

use crate::runner::{Outcome, TestSuiteResult};

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left;vertical-align:top}\
.passed{color:#1a7f37}.failed{color:#cf222e}.error{color:#9a6700}\
pre{margin:0;white-space:pre-wrap}";

/// Render a self-contained HTML page for `suite`
pub fn render_html(suite: &TestSuiteResult, target: &str) -> String {
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>BlazeDemo trip suite</title><style>{}</style></head><body>\n",
        STYLE
    );
    let _ = writeln!(html, "<h1>BlazeDemo trip suite</h1>");
    let _ = writeln!(
        html,
        "<p>Target: {} &middot; started {} &middot; {} ms</p>",
        escape(target),
        suite.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        suite.duration_ms
    );
    let _ = writeln!(
        html,
        "<p>{} total, <span class=\"passed\">{} passed</span>, \
         <span class=\"failed\">{} failed</span>, \
         <span class=\"error\">{} errors</span></p>",
        suite.total, suite.passed, suite.failed, suite.errored
    );

    html.push_str(
        "<table>\n<tr><th>Scenario</th><th>Result</th><th>Duration (ms)</th><th>Details</th></tr>\n",
    );
    for result in &suite.results {
        let details = match (&result.error, &result.screenshot) {
            (Some(err), Some(shot)) => format!(
                "<pre>{}</pre><a href=\"{}\">screenshot</a>",
                escape(err),
                escape(&relative_screenshot(shot))
            ),
            (Some(err), None) => format!("<pre>{}</pre>", escape(err)),
            (None, _) => escape(&result.description),
        };
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td></tr>",
            escape(&result.name),
            result.outcome.as_str(),
            label(result.outcome),
            result.duration_ms,
            details
        );
    }
    html.push_str("</table>\n</body></html>\n");

    html
}

fn label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Passed => "PASSED",
        Outcome::Failed => "FAILED",
        Outcome::Errored => "ERROR",
    }
}

/// Screenshots sit next to the report under `screenshots/`
fn relative_screenshot(path: &std::path::Path) -> String {
    match path.file_name() {
        Some(name) => format!("screenshots/{}", name.to_string_lossy()),
        None => path.display().to_string(),
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
