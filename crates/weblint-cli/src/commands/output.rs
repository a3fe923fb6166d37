//! Shared output formatting for lint results.

use anyhow::Result;
use serde::Serialize;
use weblint_core::{Diagnostic, LintRun, Severity, Summary};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(runs: &[LintRun], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(runs),
        OutputFormat::Json => return print_json(runs),
        OutputFormat::Compact => print_compact(runs),
    }
    Ok(())
}

/// 1-based position for display; `-` when the tool gave none.
fn position(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |n| (n + 1).to_string())
}

fn print_text(runs: &[LintRun]) {
    for run in runs {
        for (file, diagnostics) in run.by_file() {
            println!("{} ({})", file.display(), run.linter);
            for diagnostic in diagnostics {
                print_diagnostic(diagnostic);
            }
            println!();
        }
    }

    let summary = Summary::of(runs);
    let summary_color = if summary.errors > 0 {
        "\x1b[31m"
    } else if summary.warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s) in {} file(s) with {} linter(s)\x1b[0m",
        summary_color, summary.errors, summary.warnings, summary.files, summary.runs
    );
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let severity_indicator = match diagnostic.severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
    };

    let code = diagnostic
        .code
        .as_deref()
        .map(|c| format!(" [{c}]"))
        .unwrap_or_default();

    println!(
        "  {}:{}  {}{}: {}",
        position(diagnostic.line),
        position(diagnostic.column),
        severity_indicator,
        code,
        diagnostic.message,
    );
    if let Some(url) = diagnostic.help_url() {
        println!("    = help: {url}");
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    runs: &'a [LintRun],
    summary: Summary,
}

fn print_json(runs: &[LintRun]) -> Result<()> {
    let report = JsonReport {
        runs,
        summary: Summary::of(runs),
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(runs: &[LintRun]) {
    for diagnostic in runs.iter().flat_map(|r| &r.diagnostics) {
        println!("{diagnostic}");
    }
}
