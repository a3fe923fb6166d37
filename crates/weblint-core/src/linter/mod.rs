//! Adapters for the external linters.
//!
//! The set of supported tools is closed: [`LinterKind`] enumerates them and
//! each variant knows its executable, arguments, marker configuration file
//! and output grammar. [`Linter`] pairs a kind with its enable flag and
//! implements the shared run contract.

mod coffeelint;
mod csslint;
mod eslint;
mod tslint;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::environment::EnvironmentLayout;
use crate::runner::{Invocation, ProcessRunner, RunnerError};
use crate::types::{Diagnostic, LintRun, Severity, MISSING_FILE_MESSAGE};

/// One of the supported external linters.
///
/// Ordering follows declaration order and determines the order in which
/// the orchestrator invokes linters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinterKind {
    /// ESLint, for JavaScript, JSX and ES6 files.
    EsLint,
    /// TSLint, for TypeScript and TSX files.
    TsLint,
    /// CoffeeLint, for CoffeeScript, Literate CoffeeScript and Iced files.
    CoffeeLint,
    /// CSS Lint, for stylesheets.
    CssLint,
}

impl LinterKind {
    /// Every supported linter, in invocation order.
    pub const ALL: [Self; 4] = [Self::EsLint, Self::TsLint, Self::CoffeeLint, Self::CssLint];

    /// Stable display name, also used as progress and log tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::EsLint => "ESLint",
            Self::TsLint => "TSLint",
            Self::CoffeeLint => "CoffeeLint",
            Self::CssLint => "CssLint",
        }
    }

    /// Executable name under `node_modules/.bin`.
    #[must_use]
    pub fn tool(self) -> &'static str {
        match self {
            Self::EsLint => "eslint",
            Self::TsLint => "tslint",
            Self::CoffeeLint => "coffeelint",
            Self::CssLint => "csslint",
        }
    }

    /// Project-local configuration file that anchors the working directory.
    #[must_use]
    pub fn marker_file(self) -> &'static str {
        match self {
            Self::EsLint => ".eslintrc",
            Self::TsLint => "tslint.json",
            Self::CoffeeLint => "coffeelint.json",
            Self::CssLint => ".csslintrc",
        }
    }

    /// Lowercase file extensions (without dot) routed to this linter.
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::EsLint => &["js", "jsx", "es6"],
            Self::TsLint => &["ts", "tsx"],
            Self::CoffeeLint => &["coffee", "litcoffee", "iced"],
            Self::CssLint => &["css"],
        }
    }

    /// Arguments placed before the target files.
    #[must_use]
    pub fn args(self) -> &'static [&'static str] {
        match self {
            Self::EsLint => eslint::ARGS,
            Self::TsLint => tslint::ARGS,
            Self::CoffeeLint => coffeelint::ARGS,
            Self::CssLint => csslint::ARGS,
        }
    }

    /// URL template for rule documentation; `{code}` is replaced by the
    /// rule code.
    #[must_use]
    pub fn help_link_format(self) -> Option<&'static str> {
        match self {
            Self::EsLint => Some("http://eslint.org/docs/rules/{code}"),
            Self::TsLint | Self::CoffeeLint | Self::CssLint => None,
        }
    }

    /// Routes a file extension (without dot, any case) to a linter.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.extensions().contains(&extension.as_str()))
    }

    /// Routes a file path to a linter by its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Looks up a linter by display name or tool name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.name().eq_ignore_ascii_case(name) || kind.tool().eq_ignore_ascii_case(name)
        })
    }

    /// Parses captured stdout into diagnostics.
    ///
    /// `files` is the batch the tool was run on; it supplies the file for
    /// output grammars that do not name one. Lines that do not match the
    /// grammar are skipped.
    #[must_use]
    pub fn parse(self, output: &str, files: &[PathBuf]) -> Vec<Diagnostic> {
        match self {
            Self::EsLint => eslint::parse(output),
            Self::TsLint => tslint::parse(output),
            Self::CoffeeLint => coffeelint::parse(output),
            Self::CssLint => csslint::parse(output, files),
        }
    }
}

impl std::fmt::Display for LinterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared resources a linter needs to run.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    /// Launches the linter process.
    pub runner: &'a dyn ProcessRunner,
    /// Provisioned environment the executables are resolved from.
    pub layout: &'a EnvironmentLayout,
    /// Directory appended to `PATH` for the child process.
    pub extra_path: Option<&'a Path>,
}

/// A linter adapter: a [`LinterKind`] plus its enable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linter {
    kind: LinterKind,
    enabled: bool,
}

impl Linter {
    /// Creates an adapter.
    #[must_use]
    pub fn new(kind: LinterKind, enabled: bool) -> Self {
        Self { kind, enabled }
    }

    /// Creates an adapter with the enable flag taken from configuration.
    #[must_use]
    pub fn from_config(kind: LinterKind, config: &Config) -> Self {
        Self::new(kind, config.is_enabled(kind))
    }

    /// Returns the linter kind.
    #[must_use]
    pub fn kind(&self) -> LinterKind {
        self.kind
    }

    /// Returns the stable display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Returns whether the linter is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Runs the linter on a batch of files.
    ///
    /// A disabled linter returns an empty run without starting a process.
    /// If any file is missing, the run holds a single location-less
    /// diagnostic for it and the tool is not started.
    ///
    /// # Errors
    ///
    /// Returns an error if the linter process cannot be started.
    pub fn run(&self, files: &[PathBuf], ctx: RunContext<'_>) -> Result<LintRun, RunnerError> {
        let mut result = LintRun::new(self.kind, files.to_vec());

        if !self.enabled {
            debug!("Skipping disabled linter: {}", self.name());
            return Ok(result);
        }

        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            debug!("{}: {} does not exist", self.name(), missing.display());
            result.diagnostics.push(Diagnostic::new(
                self.kind,
                missing.clone(),
                Severity::Error,
                MISSING_FILE_MESSAGE,
            ));
            return Ok(result);
        }

        let Some(first) = files.first() else {
            return Ok(result);
        };

        let start = first.parent().unwrap_or(first);
        let home = home::home_dir();
        let working_dir = find_working_dir(start, self.kind.marker_file(), home.as_deref());

        let invocation = Invocation::new(ctx.layout.tool_path(self.kind.tool()), working_dir)
            .args(self.kind.args().iter().copied())
            .files(files.iter().cloned())
            .extra_path(ctx.extra_path.map(Path::to_path_buf));

        let output = ctx.runner.run(&invocation)?;

        if !output.stdout.is_empty() {
            result.diagnostics = self.kind.parse(&output.stdout, files);
        } else if !output.stderr.is_empty() {
            warn!("{} wrote only to stderr: {}", self.name(), output.stderr);
            result.diagnostics.push(Diagnostic::new(
                self.kind,
                first.clone(),
                Severity::Error,
                output.stderr,
            ));
        }

        info!(
            "{}: {} diagnostic(s) in {} file(s)",
            self.name(),
            result.diagnostics.len(),
            files.len()
        );

        Ok(result)
    }
}

/// Walks upward from `start` to the first directory containing `marker`.
///
/// Falls back to `fallback` (normally the user's home directory) and then
/// to `start` itself when no directory up to the root has the marker.
#[must_use]
pub fn find_working_dir(start: &Path, marker: &str, fallback: Option<&Path>) -> PathBuf {
    let mut candidate = Some(start);
    while let Some(dir) = candidate {
        if dir.join(marker).is_file() {
            debug!("Found {} in {}", marker, dir.display());
            return dir.to_path_buf();
        }
        candidate = dir.parent();
    }

    fallback.unwrap_or(start).to_path_buf()
}

/// Converts a 1-based number captured from tool output to zero-based.
pub(crate) fn zero_based(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().map(|n| n.saturating_sub(1))
}
