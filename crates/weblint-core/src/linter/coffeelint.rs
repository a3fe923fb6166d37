//! CoffeeLint CSV reporter output: `path,lineNumber,lineNumberEnd,level,message`.

use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

use super::{zero_based, LinterKind};
use crate::types::{Diagnostic, Severity};

pub(super) const ARGS: &[&str] = &["--reporter", "csv"];

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)] // Literal pattern, exercised by tests
        Regex::new(
            r"(?i)^(?P<file>.+?),(?P<line>[0-9]+),(?P<line_end>[0-9]*),(?P<level>error|warn|warning),(?P<message>.+)$",
        )
        .expect("valid CoffeeLint pattern")
    })
}

pub(super) fn parse(output: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for line in output.lines() {
        let Some(caps) = pattern().captures(line.trim()) else {
            debug!("CoffeeLint: skipping line {line:?}");
            continue;
        };

        let severity = if caps["level"].eq_ignore_ascii_case("error") {
            Severity::Error
        } else {
            Severity::Warning
        };

        // The CSV reporter has no column.
        diagnostics.push(
            Diagnostic::new(
                LinterKind::CoffeeLint,
                PathBuf::from(&caps["file"]),
                severity,
                caps["message"].trim(),
            )
            .at(zero_based(&caps["line"]), None),
        );
    }

    diagnostics
}
