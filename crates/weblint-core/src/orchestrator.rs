//! Routing files to linters and running them against the provisioned
//! environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::environment::{Bundle, EnvironmentLayout, ProvisionError, Provisioner};
use crate::event::{LintEvent, Progress};
use crate::linter::{Linter, LinterKind, RunContext};
use crate::runner::{CommandRunner, ProcessRunner, RunnerError};
use crate::types::LintRun;

/// Errors that abort a lint call.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum LintError {
    /// The linter environment could not be provisioned.
    #[error("failed to provision the linter environment")]
    #[diagnostic(
        code(weblint::provision),
        help("run `weblint setup --force` to rebuild the environment, or check `bundle_dir`")
    )]
    Provision(#[from] ProvisionError),

    /// A linter process could not be started.
    #[error("failed to run {linter}")]
    #[diagnostic(
        code(weblint::runner),
        help("the environment may be incomplete; run `weblint setup --force`")
    )]
    Runner {
        /// Linter whose process failed.
        linter: LinterKind,
        /// Underlying runner error.
        #[source]
        source: RunnerError,
    },
}

/// Groups files by the linter that handles them.
///
/// Files with unrecognized extensions are dropped. Duplicates within a
/// group are removed, keeping first-seen order.
#[must_use]
pub fn group_files<P: AsRef<Path>>(files: &[P]) -> BTreeMap<LinterKind, Vec<PathBuf>> {
    let mut groups: BTreeMap<LinterKind, Vec<PathBuf>> = BTreeMap::new();

    for file in files {
        let file = file.as_ref();
        let Some(kind) = LinterKind::from_path(file) else {
            debug!("No linter for {}", file.display());
            continue;
        };
        let group = groups.entry(kind).or_default();
        if !group.iter().any(|f| f == file) {
            group.push(file.to_path_buf());
        }
    }

    groups
}

/// Builder for configuring an [`Orchestrator`].
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: Option<Config>,
    runner: Option<Arc<dyn ProcessRunner>>,
    provisioner: Option<Arc<Provisioner>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the process runner used for linters and, unless a provisioner
    /// is given, for setup.
    #[must_use]
    pub fn runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Shares an existing provisioner.
    #[must_use]
    pub fn provisioner(mut self, provisioner: Arc<Provisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    /// Builds the orchestrator.
    #[must_use]
    pub fn build(self) -> Orchestrator {
        let config = self.config.unwrap_or_default();
        let runner: Arc<dyn ProcessRunner> =
            self.runner.unwrap_or_else(|| Arc::new(CommandRunner::new()));
        let provisioner = self.provisioner.unwrap_or_else(|| {
            Arc::new(Provisioner::new(
                EnvironmentLayout::from_config(&config.environment),
                Bundle::from_config(&config.environment),
                Arc::clone(&runner),
            ))
        });
        let linters = LinterKind::ALL
            .iter()
            .map(|kind| Linter::from_config(*kind, &config))
            .collect();

        Orchestrator {
            linters,
            runner,
            provisioner,
            extra_path: config.environment.extra_path,
        }
    }
}

/// Runs the configured linters over a set of files.
pub struct Orchestrator {
    linters: Vec<Linter>,
    runner: Arc<dyn ProcessRunner>,
    provisioner: Arc<Provisioner>,
    extra_path: Option<PathBuf>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("linters", &self.linters)
            .field("provisioner", &self.provisioner)
            .field("extra_path", &self.extra_path)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator with the production runner.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::builder().config(config).build()
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Returns the shared provisioner.
    #[must_use]
    pub fn provisioner(&self) -> &Arc<Provisioner> {
        &self.provisioner
    }

    /// Returns the configured linters in invocation order.
    #[must_use]
    pub fn linters(&self) -> &[Linter] {
        &self.linters
    }

    fn linter(&self, kind: LinterKind) -> Linter {
        self.linters
            .iter()
            .copied()
            .find(|l| l.kind() == kind)
            .unwrap_or_else(|| Linter::new(kind, false))
    }

    /// Lints `files`, returning one [`LintRun`] per linter that had files.
    ///
    /// Provisions the environment first when at least one file is
    /// recognized. Linters run one after another, in [`LinterKind`] order.
    ///
    /// # Errors
    ///
    /// Returns an error if provisioning fails or a linter process cannot
    /// be started. Runs already finished are discarded in that case.
    pub fn lint<P: AsRef<Path>>(
        &self,
        files: &[P],
        mut on_event: impl FnMut(LintEvent),
    ) -> Result<Vec<LintRun>, LintError> {
        let groups = group_files(files);
        if groups.is_empty() {
            debug!("No lintable files among {} input(s)", files.len());
            return Ok(Vec::new());
        }

        self.provisioner.ensure_ready(&mut on_event)?;

        let ctx = RunContext {
            runner: self.runner.as_ref(),
            layout: self.provisioner.layout(),
            extra_path: self.extra_path.as_deref(),
        };

        let total = groups.len();
        let mut runs = Vec::with_capacity(total);

        for (completed, (kind, batch)) in groups.into_iter().enumerate() {
            on_event(LintEvent::Progress(Progress {
                total,
                completed,
                linter: kind,
                files: batch.len(),
            }));

            let run = self
                .linter(kind)
                .run(&batch, ctx)
                .map_err(|source| LintError::Runner {
                    linter: kind,
                    source,
                })?;
            runs.push(run);
        }

        info!("Ran {total} linter(s)");
        on_event(LintEvent::Done { total });
        Ok(runs)
    }
}
