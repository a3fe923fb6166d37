//! TSLint prose output: `[ERROR: ]file[line, column]: message`.

use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

use super::{zero_based, LinterKind};
use crate::types::{Diagnostic, Severity};

pub(super) const ARGS: &[&str] = &["--format", "prose"];

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)] // Literal pattern, exercised by tests
        Regex::new(
            r"(?i)^(?:(?P<severity>error|warning): )?(?P<file>.+?)\[(?P<line>[0-9]+), (?P<column>[0-9]+)\]: (?P<message>.+)$",
        )
        .expect("valid TSLint pattern")
    })
}

pub(super) fn parse(output: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for line in output.lines() {
        let Some(caps) = pattern().captures(line.trim()) else {
            debug!("TSLint: skipping line {line:?}");
            continue;
        };

        let severity = match caps.name("severity") {
            Some(s) if s.as_str().eq_ignore_ascii_case("error") => Severity::Error,
            _ => Severity::Warning,
        };

        diagnostics.push(
            Diagnostic::new(
                LinterKind::TsLint,
                PathBuf::from(caps["file"].trim()),
                severity,
                caps["message"].trim(),
            )
            .at(zero_based(&caps["line"]), zero_based(&caps["column"])),
        );
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prose_line() {
        let diagnostics = parse("myfile.ts[3, 10]: Missing semicolon");
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.file, PathBuf::from("myfile.ts"));
        assert_eq!(d.line, Some(2));
        assert_eq!(d.column, Some(9));
        assert_eq!(d.message, "Missing semicolon");
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.code, None);
    }

    #[test]
    fn reads_severity_prefix() {
        let output = "ERROR: /p/a.ts[1, 1]: comment must start with a space\n\
                      WARNING: /p/b.ts[7, 2]: trailing whitespace";
        let diagnostics = parse(output);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].file, PathBuf::from("/p/a.ts"));
        assert_eq!(diagnostics[1].severity, Severity::Warning);
        assert_eq!(diagnostics[1].line, Some(6));
        assert_eq!(diagnostics[1].column, Some(1));
    }

    #[test]
    fn keeps_paths_with_spaces_and_brackets_in_message() {
        let diagnostics = parse("/my proj/a.ts[2, 5]: expected [typedef]: call-signature");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].file, PathBuf::from("/my proj/a.ts"));
        assert_eq!(diagnostics[0].message, "expected [typedef]: call-signature");
    }

    #[test]
    fn location_is_the_first_one_after_the_path() {
        let diagnostics = parse("/p/a.ts[1, 2]: expected x[3, 4]: y");
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.file, PathBuf::from("/p/a.ts"));
        assert_eq!((d.line, d.column), (Some(0), Some(1)));
        assert_eq!(d.message, "expected x[3, 4]: y");
    }

    #[test]
    fn brackets_inside_the_path_are_kept() {
        let diagnostics = parse("/p/[id]/page.ts[7, 3]: Missing semicolon");
        assert_eq!(diagnostics[0].file, PathBuf::from("/p/[id]/page.ts"));
        assert_eq!(diagnostics[0].line, Some(6));
    }

    #[test]
    fn skips_unmatched_lines() {
        let output = "Linting 2 files\n\n/p/a.ts[4, 1]: missing whitespace\nDone.";
        let diagnostics = parse(output);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, Some(3));
    }
}
