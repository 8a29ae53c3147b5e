//! Suite reporting - aggregate results and plain-text rendering.
//!
//! The structured [`SuiteReport`] is the interface exposed to callers and CI:
//! one entry per declared scenario plus an overall success flag. The text
//! renderer is deliberately small - one status line per scenario, the
//! missing/unexpected path listing per failure, and a summary line.

use serde::Serialize;

use crate::runner::{ScenarioOutcome, ScenarioReport};

// Color constants for terminal output
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Aggregate result of one suite run, in declared scenario order.
#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub module_id: String,
    pub module_name: String,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn passed_count(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Passed(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Failed(_)))
    }

    pub fn errored_count(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Errored(_)))
    }

    /// The suite exit condition: true iff no scenario failed or errored.
    pub fn success(&self) -> bool {
        self.scenarios.iter().all(|s| s.outcome.is_pass())
    }

    fn count(&self, pred: impl Fn(&ScenarioOutcome) -> bool) -> usize {
        self.scenarios.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Rendering settings for the text report.
pub struct ReportStyle {
    pub use_colors: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
        }
    }
}

impl ReportStyle {
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Apply color formatting to text if colors are enabled.
    pub fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Renders the suite report as human-readable text.
pub fn render(report: &SuiteReport, style: &ReportStyle) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Suite: {} ({})\n",
        report.module_name, report.module_id
    ));

    for scenario in &report.scenarios {
        match &scenario.outcome {
            ScenarioOutcome::Passed(_) => {
                out.push_str(&format!(
                    "{}: {}\n",
                    style.colorize("PASS", GREEN),
                    scenario.name
                ));
            }
            ScenarioOutcome::Failed(result) => {
                out.push_str(&format!(
                    "{}: {}\n",
                    style.colorize("FAIL", RED),
                    scenario.name
                ));
                for path in &result.missing {
                    out.push_str(&format!("  missing:    {}\n", path));
                }
                for path in &result.unexpected {
                    out.push_str(&format!("  unexpected: {}\n", path));
                }
            }
            ScenarioOutcome::Errored(error) => {
                out.push_str(&format!(
                    "{}: {}\n  {}\n",
                    style.colorize("ERROR", RED),
                    scenario.name,
                    error
                ));
            }
        }
        if let Some(warning) = &scenario.warning {
            out.push_str(&format!(
                "  {}: {}\n",
                style.colorize("warning", YELLOW),
                warning
            ));
        }
    }

    out.push_str(&format!(
        "\nSuite summary: total {}, {} {}, {} {}, {} {}\n",
        report.scenarios.len(),
        style.colorize("passed", GREEN),
        report.passed_count(),
        style.colorize("failed", RED),
        report.failed_count(),
        style.colorize("errored", RED),
        report.errored_count(),
    ));
    out
}
