//! Lifecycle and progress events reported to callers.

use std::sync::mpsc::Sender;

use crate::linter::LinterKind;

/// Progress of one orchestrator call, reported before each linter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Number of linters this call will run.
    pub total: usize,
    /// Number of linters already finished.
    pub completed: usize,
    /// Linter about to run.
    pub linter: LinterKind,
    /// Number of files handed to it.
    pub files: usize,
}

/// Event emitted while linting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintEvent {
    /// The linter runtime is being (re)installed.
    ProvisioningStarted,
    /// The linter runtime was installed successfully.
    ProvisioningFinished,
    /// A linter is about to run.
    Progress(Progress),
    /// All linters of the call have run.
    Done {
        /// Number of linters that ran.
        total: usize,
    },
}

/// Returns an event callback that forwards every event into a channel.
///
/// Events are dropped once the receiver is gone.
pub fn forward_to(sender: Sender<LintEvent>) -> impl FnMut(LintEvent) {
    move |event| {
        if sender.send(event).is_err() {
            tracing::trace!("event receiver dropped, discarding {event:?}");
        }
    }
}
