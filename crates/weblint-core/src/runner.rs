//! Out-of-process execution of the external linters.
//!
//! Every linter and the environment setup script go through a
//! [`ProcessRunner`]. The production implementation is [`CommandRunner`];
//! tests substitute stubs that record invocations.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Errors raised while launching a child process.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The process could not be started.
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The process started but its output could not be collected.
    #[error("failed to collect output of {}: {source}", program.display())]
    Wait {
        /// Program that was running.
        program: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// One child process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments placed before the target files.
    pub args: Vec<String>,
    /// Target files, each passed as its own argument.
    pub files: Vec<PathBuf>,
    /// Working directory of the child.
    pub working_dir: PathBuf,
    /// Directory appended to the child's `PATH`, if it exists.
    pub extra_path: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation with no arguments or files.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            files: Vec::new(),
            working_dir: working_dir.into(),
            extra_path: None,
        }
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends target files.
    #[must_use]
    pub fn files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Sets the directory appended to `PATH`.
    #[must_use]
    pub fn extra_path(mut self, dir: Option<PathBuf>) -> Self {
        self.extra_path = dir;
        self
    }

    /// Renders the command line for logs, quoting each file path.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        for file in &self.files {
            line.push_str(&format!(" \"{}\"", file.display()));
        }
        line
    }
}

/// Captured output of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Trimmed standard output.
    pub stdout: String,
    /// Trimmed standard error.
    pub stderr: String,
    /// Exit code, `None` if the process was terminated by a signal.
    pub status: Option<i32>,
}

impl ProcessOutput {
    /// Returns true if the process exited with code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Launches child processes and captures their output.
pub trait ProcessRunner: Send + Sync {
    /// Runs the invocation to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or its output
    /// cannot be read. A non-zero exit code is not an error here.
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, RunnerError>;
}

/// [`ProcessRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl CommandRunner {
    /// Creates a new runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, RunnerError> {
        debug!(
            "Running {} in {}",
            invocation.command_line(),
            invocation.working_dir.display()
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .args(&invocation.files)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(path) = augmented_path(invocation.extra_path.as_deref()) {
            cmd.env("PATH", path);
        }

        let child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        // Drains stdout and stderr concurrently while waiting for exit.
        let output = child
            .wait_with_output()
            .map_err(|source| RunnerError::Wait {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            status: output.status.code(),
        })
    }
}

/// Returns the current `PATH` with `extra` appended, or `None` when there
/// is nothing to add.
fn augmented_path(extra: Option<&Path>) -> Option<OsString> {
    let extra = extra.filter(|dir| dir.is_dir())?;
    let mut paths: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default();
    paths.push(extra.to_path_buf());
    std::env::join_paths(paths).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_each_file() {
        let inv = Invocation::new("/env/node_modules/.bin/eslint", "/proj")
            .args(["--format=json"])
            .files(["/proj/my file.js", "/proj/b.js"]);
        assert_eq!(
            inv.command_line(),
            "/env/node_modules/.bin/eslint --format=json \"/proj/my file.js\" \"/proj/b.js\""
        );
    }

    #[test]
    fn command_line_without_files_has_no_trailing_space() {
        let inv =
            Invocation::new("/env/node_modules/.bin/csslint", "/proj").args(["--format=compact"]);
        assert_eq!(
            inv.command_line(),
            "/env/node_modules/.bin/csslint --format=compact"
        );
    }

    #[test]
    fn augmented_path_skips_missing_dir() {
        assert!(augmented_path(None).is_none());
        assert!(augmented_path(Some(Path::new("/definitely/not/here"))).is_none());
    }

    #[test]
    fn augmented_path_appends_existing_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let joined = augmented_path(Some(tmp.path())).unwrap();
        let parts: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(parts.last().map(PathBuf::as_path), Some(tmp.path()));
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let inv = Invocation::new(tmp.path().join("no-such-linter"), tmp.path());
        let err = CommandRunner::new().run(&inv).unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn captures_trimmed_stdout_and_stderr() {
        let tmp = tempfile::TempDir::new().unwrap();
        let inv = Invocation::new("sh", tmp.path())
            .args(["-c", "echo '  out  '; echo err 1>&2; exit 3"]);
        let output = CommandRunner::new().run(&inv).unwrap();
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        assert_eq!(output.status, Some(3));
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[test]
    fn passes_files_with_spaces_as_single_arguments() {
        let tmp = tempfile::TempDir::new().unwrap();
        let inv = Invocation::new("sh", tmp.path())
            .args(["-c", "echo $#", "sh"])
            .files(["/a b/c d.js", "/e.js"]);
        let output = CommandRunner::new().run(&inv).unwrap();
        assert_eq!(output.stdout, "2");
    }
}
