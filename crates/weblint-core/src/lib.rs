//! # weblint-core
//!
//! Runs external web linters (ESLint, TSLint, CoffeeLint, CSS Lint) over
//! source files and normalizes their output into one diagnostic model.
//!
//! This crate provides:
//!
//! - [`Orchestrator`] for routing files to linters and running them
//! - [`Provisioner`] for installing the private linter runtime on demand
//! - [`LinterKind`] and [`Linter`], the adapters for each tool
//! - [`Diagnostic`] and [`LintRun`] for representing results
//! - [`FileFilter`] for discarding paths that should not be linted
//!
//! ## Example
//!
//! ```ignore
//! use weblint_core::{Config, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(Config::default());
//! let runs = orchestrator.lint(&["/work/site/app.js"], |event| {
//!     eprintln!("{event:?}");
//! })?;
//! for run in &runs {
//!     for diagnostic in &run.diagnostics {
//!         println!("{diagnostic}");
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod environment;
mod event;
mod filter;
mod linter;
mod orchestrator;
mod runner;
mod types;

pub use config::{Config, ConfigError, EnvironmentConfig, FilesConfig, LintersConfig};
pub use environment::{
    Bundle, EnvironmentLayout, Payload, PayloadSource, ProvisionError, ProvisionOutcome,
    Provisioner, DEFAULT_MIN_MODULES, MARKER_FILE,
};
pub use event::{forward_to, LintEvent, Progress};
pub use filter::FileFilter;
pub use linter::{find_working_dir, Linter, LinterKind, RunContext};
pub use orchestrator::{group_files, LintError, Orchestrator, OrchestratorBuilder};
pub use runner::{CommandRunner, Invocation, ProcessOutput, ProcessRunner, RunnerError};
pub use types::{group_by_file, Diagnostic, LintRun, Severity, Summary, MISSING_FILE_MESSAGE};
