//! CSS Lint compact output: `<file>: line N, col M, <Level> - message`.
//!
//! The pattern does not capture the file. Each match is attributed to the
//! batch file whose path prefixes the line, or to the first batch file.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

use super::{zero_based, LinterKind};
use crate::types::{Diagnostic, Severity};

pub(super) const ARGS: &[&str] = &["--format=compact"];

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)] // Literal pattern, exercised by tests
        Regex::new(r"(?i): line (?P<line>[0-9]+), col (?P<column>[0-9]+), (?P<message>.+)$")
            .expect("valid CSS Lint pattern")
    })
}

pub(super) fn parse(output: &str, files: &[PathBuf]) -> Vec<Diagnostic> {
    let Some(first) = files.first() else {
        return Vec::new();
    };

    let mut diagnostics = Vec::new();

    for line in output.lines() {
        let Some(caps) = pattern().captures(line) else {
            debug!("CssLint: skipping line {line:?}");
            continue;
        };

        let prefix = caps.get(0).map_or("", |m| &line[..m.start()]).trim();
        let file = files
            .iter()
            .find(|f| f.as_path() == Path::new(prefix))
            .unwrap_or(first);

        let (severity, message) = split_level(caps["message"].trim());

        diagnostics.push(
            Diagnostic::new(LinterKind::CssLint, file.clone(), severity, message)
                .at(zero_based(&caps["line"]), zero_based(&caps["column"])),
        );
    }

    diagnostics
}

/// Splits a leading `Error - ` / `Warning - ` level off the message.
fn split_level(message: &str) -> (Severity, &str) {
    let Some((level, rest)) = message.split_once(" - ") else {
        return (Severity::Warning, message);
    };
    if level.eq_ignore_ascii_case("error") {
        (Severity::Error, rest)
    } else if level.eq_ignore_ascii_case("warning") {
        (Severity::Warning, rest)
    } else {
        (Severity::Warning, message)
    }
}
