//! ESLint JSON output.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

use super::LinterKind;
use crate::types::{Diagnostic, Severity};

pub(super) const ARGS: &[&str] = &["--format=json"];

/// ESLint severity value for errors; anything else is a warning.
const SEVERITY_ERROR: u8 = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResult {
    file_path: PathBuf,
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
    message: String,
    #[serde(default)]
    severity: u8,
    #[serde(default)]
    rule_id: Option<String>,
}

pub(super) fn parse(output: &str) -> Vec<Diagnostic> {
    let results: Vec<FileResult> = match serde_json::from_str(output) {
        Ok(results) => results,
        Err(e) => {
            warn!("Ignoring unparseable ESLint output: {e}");
            return Vec::new();
        }
    };

    results
        .into_iter()
        .flat_map(|result| {
            let file = result.file_path;
            result.messages.into_iter().map(move |m| {
                let severity = if m.severity == SEVERITY_ERROR {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                let diagnostic =
                    Diagnostic::new(LinterKind::EsLint, file.clone(), severity, m.message).at(
                        m.line.map(|n| n.saturating_sub(1)),
                        m.column.map(|n| n.saturating_sub(1)),
                    );
                match m.rule_id {
                    Some(code) => diagnostic.with_code(code),
                    None => diagnostic,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_zero_based_locations() {
        let output = r#"[{
            "filePath": "/proj/a.js",
            "messages": [
                {"line": 5, "column": 3, "severity": 2, "ruleId": "no-undef", "message": "x is not defined"}
            ],
            "errorCount": 1,
            "warningCount": 0
        }]"#;

        let diagnostics = parse(output);
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.file, PathBuf::from("/proj/a.js"));
        assert_eq!(d.line, Some(4));
        assert_eq!(d.column, Some(2));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.code.as_deref(), Some("no-undef"));
        assert_eq!(d.message, "x is not defined");
        assert_eq!(d.linter, LinterKind::EsLint);
    }

    #[test]
    fn keeps_emission_order_across_files() {
        let output = r#"[
            {"filePath": "/a.js", "messages": [
                {"line": 1, "column": 1, "severity": 1, "ruleId": "semi", "message": "Missing semicolon."},
                {"line": 2, "column": 4, "severity": 2, "ruleId": "no-undef", "message": "'y' is not defined."}
            ]},
            {"filePath": "/b.js", "messages": []},
            {"filePath": "/c.js", "messages": [
                {"fatal": true, "severity": 2, "ruleId": null, "message": "Parsing error: Unexpected token"}
            ]}
        ]"#;

        let diagnostics = parse(output);
        let summary: Vec<(&str, Severity, Option<&str>)> = diagnostics
            .iter()
            .map(|d| (d.file.to_str().unwrap(), d.severity, d.code.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("/a.js", Severity::Warning, Some("semi")),
                ("/a.js", Severity::Error, Some("no-undef")),
                ("/c.js", Severity::Error, None),
            ]
        );
        assert_eq!(diagnostics[2].line, None);
        assert_eq!(diagnostics[2].column, None);
    }

    #[test]
    fn malformed_output_yields_nothing() {
        assert!(parse("Oops! Something went wrong!").is_empty());
        assert!(parse("{}").is_empty());
    }
}
