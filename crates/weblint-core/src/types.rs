//! Core types for normalized diagnostics and lint runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::linter::LinterKind;

/// Message used when a file handed to a linter does not exist on disk.
pub const MISSING_FILE_MESSAGE: &str = "The file doesn't exist";

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single issue reported by an external linter.
///
/// `line` and `column` are zero-based. They are `None` when the tool did
/// not report a location, e.g. for a missing file or raw stderr output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Absolute path of the file this diagnostic belongs to.
    pub file: PathBuf,
    /// Zero-based line number.
    pub line: Option<u32>,
    /// Zero-based column number.
    pub column: Option<u32>,
    /// Human-readable message.
    pub message: String,
    /// Severity reported by the tool.
    pub severity: Severity,
    /// Tool-specific rule identifier (e.g., "no-undef").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Linter that produced this diagnostic.
    pub linter: LinterKind,
}

impl Diagnostic {
    /// Creates a location-less diagnostic.
    #[must_use]
    pub fn new(
        linter: LinterKind,
        file: impl Into<PathBuf>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line: None,
            column: None,
            message: message.into(),
            severity,
            code: None,
            linter,
        }
    }

    /// Sets the zero-based location.
    #[must_use]
    pub fn at(mut self, line: Option<u32>, column: Option<u32>) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Sets the rule code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns the documentation URL for this diagnostic's rule, if the
    /// linter publishes one and a rule code is present.
    #[must_use]
    pub fn help_url(&self) -> Option<String> {
        let format = self.linter.help_link_format()?;
        let code = self.code.as_deref()?;
        Some(format.replace("{code}", code))
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", u64::from(line) + 1)?;
            if let Some(column) = self.column {
                write!(f, ":{}", u64::from(column) + 1)?;
            }
        }
        write!(f, ": {}", self.severity)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        write!(f, " ({}) {}", self.linter, self.message)
    }
}

/// Result of invoking one linter on one batch of files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintRun {
    /// Linter that was invoked.
    pub linter: LinterKind,
    /// Input files, in the order supplied by the caller.
    pub files: Vec<PathBuf>,
    /// Diagnostics, in the order the tool emitted them.
    pub diagnostics: Vec<Diagnostic>,
}

impl LintRun {
    /// Creates a run with no diagnostics.
    #[must_use]
    pub fn new(linter: LinterKind, files: Vec<PathBuf>) -> Self {
        Self {
            linter,
            files,
            diagnostics: Vec::new(),
        }
    }

    /// Returns true if the tool reported anything at all.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Counts diagnostics with [`Severity::Error`].
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Counts diagnostics with [`Severity::Warning`].
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Groups diagnostics by file, keeping files in first-seen order.
    #[must_use]
    pub fn by_file(&self) -> Vec<(&Path, Vec<&Diagnostic>)> {
        group_by_file(&self.diagnostics)
    }
}

/// Groups diagnostics by file path, keeping files in first-seen order and
/// diagnostics in their original order within each file.
#[must_use]
pub fn group_by_file<'a, I>(diagnostics: I) -> Vec<(&'a Path, Vec<&'a Diagnostic>)>
where
    I: IntoIterator<Item = &'a Diagnostic>,
{
    let mut groups: Vec<(&Path, Vec<&Diagnostic>)> = Vec::new();
    let mut index: HashMap<&Path, usize> = HashMap::new();
    for diagnostic in diagnostics {
        let file = diagnostic.file.as_path();
        match index.get(file) {
            Some(&at) => groups[at].1.push(diagnostic),
            None => {
                index.insert(file, groups.len());
                groups.push((file, vec![diagnostic]));
            }
        }
    }
    groups
}

/// Summary counts across several runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of linters invoked.
    pub runs: usize,
    /// Number of distinct input files.
    pub files: usize,
    /// Error-level diagnostics.
    pub errors: usize,
    /// Warning-level diagnostics.
    pub warnings: usize,
}

impl Summary {
    /// Computes counts for a set of runs.
    #[must_use]
    pub fn of(runs: &[LintRun]) -> Self {
        let mut files: Vec<&Path> = runs
            .iter()
            .flat_map(|r| r.files.iter().map(PathBuf::as_path))
            .collect();
        files.sort_unstable();
        files.dedup();

        Self {
            runs: runs.len(),
            files: files.len(),
            errors: runs.iter().map(LintRun::error_count).sum(),
            warnings: runs.iter().map(LintRun::warning_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(file: &str, severity: Severity) -> Diagnostic {
        Diagnostic::new(LinterKind::EsLint, file, severity, "x is not defined")
            .at(Some(4), Some(2))
            .with_code("no-undef")
    }

    #[test]
    fn display_uses_one_based_location() {
        let d = diag("/src/a.js", Severity::Error);
        assert_eq!(
            d.to_string(),
            "/src/a.js:5:3: error [no-undef] (ESLint) x is not defined"
        );
    }

    #[test]
    fn display_omits_missing_location() {
        let d = Diagnostic::new(
            LinterKind::CssLint,
            "/src/a.css",
            Severity::Error,
            MISSING_FILE_MESSAGE,
        );
        assert_eq!(
            d.to_string(),
            "/src/a.css: error (CssLint) The file doesn't exist"
        );
    }

    #[test]
    fn help_url_only_for_eslint_codes() {
        let d = diag("/src/a.js", Severity::Error);
        assert_eq!(
            d.help_url().as_deref(),
            Some("http://eslint.org/docs/rules/no-undef")
        );

        let mut ts = d.clone();
        ts.linter = LinterKind::TsLint;
        assert!(ts.help_url().is_none());

        let uncoded = Diagnostic::new(LinterKind::EsLint, "/a.js", Severity::Warning, "m");
        assert!(uncoded.help_url().is_none());
    }

    #[test]
    fn has_errors_means_any_diagnostic() {
        let mut run = LintRun::new(LinterKind::EsLint, vec![PathBuf::from("/src/a.js")]);
        assert!(!run.has_errors());
        run.diagnostics.push(diag("/src/a.js", Severity::Warning));
        assert!(run.has_errors());
        assert_eq!(run.error_count(), 0);
        assert_eq!(run.warning_count(), 1);
    }

    #[test]
    fn by_file_keeps_first_seen_order() {
        let mut run = LintRun::new(LinterKind::EsLint, Vec::new());
        run.diagnostics.push(diag("/b.js", Severity::Error));
        run.diagnostics.push(diag("/a.js", Severity::Warning));
        run.diagnostics.push(diag("/b.js", Severity::Warning));

        let groups = run.by_file();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Path::new("/b.js"));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[1].severity, Severity::Warning);
        assert_eq!(groups[1].0, Path::new("/a.js"));
    }

    #[test]
    fn group_by_file_handles_many_interleaved_files() {
        let diagnostics: Vec<Diagnostic> = (0..600)
            .map(|i| diag(&format!("/src/f{}.ts", i % 200), Severity::Warning))
            .collect();

        let groups = group_by_file(&diagnostics);
        assert_eq!(groups.len(), 200);
        for (i, (file, list)) in groups.iter().enumerate() {
            assert_eq!(*file, Path::new(&format!("/src/f{i}.ts")));
            assert_eq!(list.len(), 3);
        }
    }

    #[test]
    fn summary_counts_distinct_files() {
        let mut es = LintRun::new(LinterKind::EsLint, vec![PathBuf::from("/a.js")]);
        es.diagnostics.push(diag("/a.js", Severity::Error));
        let mut css = LintRun::new(
            LinterKind::CssLint,
            vec![PathBuf::from("/a.css"), PathBuf::from("/b.css")],
        );
        css.diagnostics.push(diag("/a.css", Severity::Warning));
        css.diagnostics.push(diag("/b.css", Severity::Warning));

        let summary = Summary::of(&[es, css]);
        assert_eq!(
            summary,
            Summary {
                runs: 2,
                files: 3,
                errors: 1,
                warnings: 2,
            }
        );
    }
}
