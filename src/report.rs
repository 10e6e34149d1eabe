//! Terminal rendering of summaries and failures.

use crate::pipeline::Failure;
use crate::summary::SummaryResult;
use colored::Colorize;
use std::fmt::Write;

const LABEL_WIDTH: usize = 16;

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.bold().blue());
}

fn bullets(out: &mut String, items: &[String], none: &str) {
    if items.is_empty() {
        let _ = writeln!(out, "  {}", none.dimmed());
    }
    for item in items {
        let _ = writeln!(out, "  • {item}");
    }
}

/// Render a summary the way the report page lays it out
pub fn render_summary(result: &SummaryResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=== Summary Report ===".bold());

    heading(&mut out, "Overall Summary");
    let _ = writeln!(out, "  {}", result.summary);

    heading(&mut out, "Coverages");
    bullets(
        &mut out,
        &result.coverages,
        "No specific coverages found or identified.",
    );

    heading(&mut out, "Exclusions");
    bullets(
        &mut out,
        &result.exclusions,
        "No specific exclusions found or identified.",
    );

    heading(&mut out, "Policy Details");
    let details = &result.policy_details;
    if details.is_empty() {
        let _ = writeln!(
            out,
            "  {}",
            "No specific policy details found or identified.".dimmed()
        );
        return out;
    }
    for (label, value) in details.rows() {
        let label = format!("{label:<LABEL_WIDTH$}");
        let _ = writeln!(out, "  {} {value}", label.bold());
    }

    if !details.other_details.is_empty() {
        heading(&mut out, "Other Policy Details");
        bullets(&mut out, &details.other_details, "");
    }
    out
}

/// Render a failure with whatever raw reply was kept for diagnosis
pub fn render_failure(failure: &Failure) -> String {
    let mut out = format!("{} {failure}", "Error:".red().bold());
    if let Some(raw) = failure.diagnostic() {
        let _ = write!(out, "\n\n{}\n{raw}", "Raw response:".yellow());
    }
    if failure.is_local() {
        let _ = write!(out, "\n{}", "Please upload a .txt or .pdf file with readable text.".dimmed());
    } else {
        let _ = write!(out, "\n{}", "Failed to generate summary. Please try again.".dimmed());
    }
    out
}
