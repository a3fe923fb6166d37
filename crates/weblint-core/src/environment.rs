//! Provisioning of the private linter runtime.
//!
//! The linters are not resolved from the system `PATH`. They live in an
//! execution directory that is created on first use from four bundled
//! payloads: a dependency archive, an extraction utility, the utility's
//! runtime library and a setup script that unpacks the archive into
//! `node_modules`. A marker file records a completed setup.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::EnvironmentConfig;
use crate::event::LintEvent;
use crate::runner::{Invocation, ProcessRunner, RunnerError};

/// Default minimum number of packages in `node_modules`.
pub const DEFAULT_MIN_MODULES: usize = 36;

/// Marker file written after a successful setup.
pub const MARKER_FILE: &str = "log.txt";

const MODULES_DIR: &str = "node_modules";

#[cfg(windows)]
const DEFAULT_PAYLOADS: [&str; 4] = ["node_modules.7z", "7z.exe", "7z.dll", "prepare.cmd"];
#[cfg(not(windows))]
const DEFAULT_PAYLOADS: [&str; 4] = ["node_modules.7z", "7za", "lib7z.so", "prepare.sh"];

/// Errors that can occur while provisioning.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Filesystem operation on the execution directory failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path being created, copied or removed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A bundled payload file is not present.
    #[error("bundled payload {name} not found at {path}")]
    MissingPayload {
        /// Payload file name.
        name: String,
        /// Where it was expected.
        path: PathBuf,
    },

    /// The setup script could not be started.
    #[error("setup script could not be started: {0}")]
    Spawn(#[from] RunnerError),

    /// The setup script exited unsuccessfully.
    #[error("setup script failed with status {status:?}: {stderr}")]
    SetupFailed {
        /// Exit code, `None` if killed by a signal.
        status: Option<i32>,
        /// Captured stderr of the script.
        stderr: String,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProvisionError + '_ {
    move |source| ProvisionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// On-disk layout of the execution directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentLayout {
    exec_dir: PathBuf,
    min_modules: usize,
}

impl EnvironmentLayout {
    /// Creates a layout rooted at `exec_dir` with the default module threshold.
    #[must_use]
    pub fn new(exec_dir: impl Into<PathBuf>) -> Self {
        Self {
            exec_dir: exec_dir.into(),
            min_modules: DEFAULT_MIN_MODULES,
        }
    }

    /// Creates a layout from configuration.
    #[must_use]
    pub fn from_config(config: &EnvironmentConfig) -> Self {
        let exec_dir = config
            .exec_dir
            .clone()
            .unwrap_or_else(Self::default_exec_dir);
        Self::new(exec_dir).with_min_modules(config.min_modules)
    }

    /// `<temp>/weblint<version>`, so different versions never share state.
    #[must_use]
    pub fn default_exec_dir() -> PathBuf {
        std::env::temp_dir().join(format!("weblint{}", env!("CARGO_PKG_VERSION")))
    }

    /// Sets the minimum package count for a valid installation.
    #[must_use]
    pub fn with_min_modules(mut self, min_modules: usize) -> Self {
        self.min_modules = min_modules;
        self
    }

    /// Returns the execution directory.
    #[must_use]
    pub fn exec_dir(&self) -> &Path {
        &self.exec_dir
    }

    /// Returns the extracted dependency directory.
    #[must_use]
    pub fn modules_dir(&self) -> PathBuf {
        self.exec_dir.join(MODULES_DIR)
    }

    /// Returns the marker file path.
    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.exec_dir.join(MARKER_FILE)
    }

    /// Returns the path of a linter executable inside the environment.
    #[must_use]
    pub fn tool_path(&self, tool: &str) -> PathBuf {
        let bin = self.modules_dir().join(".bin");
        if cfg!(windows) {
            bin.join(format!("{tool}.cmd"))
        } else {
            bin.join(tool)
        }
    }

    /// Counts package directories in `node_modules`.
    #[must_use]
    pub fn module_count(&self) -> usize {
        let Ok(entries) = fs::read_dir(self.modules_dir()) else {
            return 0;
        };
        entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .count()
    }

    /// Returns true if a previous setup completed and the dependency tree
    /// looks intact.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.marker_path().is_file()
            && self.modules_dir().is_dir()
            && self.module_count() >= self.min_modules
    }
}

/// Where a payload's bytes come from.
#[derive(Debug, Clone)]
pub enum PayloadSource {
    /// In-memory contents.
    Bytes(Cow<'static, [u8]>),
    /// A file copied into the execution directory.
    File(PathBuf),
}

/// One file written into the execution directory before setup.
#[derive(Debug, Clone)]
pub struct Payload {
    /// File name inside the execution directory.
    pub file_name: String,
    /// Contents.
    pub source: PayloadSource,
}

impl Payload {
    /// Creates a payload backed by a file.
    #[must_use]
    pub fn file(file_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            source: PayloadSource::File(path.into()),
        }
    }

    /// Creates a payload backed by bytes.
    #[must_use]
    pub fn bytes(file_name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            source: PayloadSource::Bytes(bytes.into()),
        }
    }

    fn write_to(&self, dir: &Path) -> Result<PathBuf, ProvisionError> {
        let dest = dir.join(&self.file_name);
        match &self.source {
            PayloadSource::Bytes(bytes) => {
                fs::write(&dest, bytes).map_err(io_error(&dest))?;
                mark_executable(&dest)?;
            }
            PayloadSource::File(src) => {
                if !src.is_file() {
                    return Err(ProvisionError::MissingPayload {
                        name: self.file_name.clone(),
                        path: src.clone(),
                    });
                }
                fs::copy(src, &dest).map_err(io_error(&dest))?;
            }
        }
        debug!("Extracted {}", dest.display());
        Ok(dest)
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), ProvisionError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(io_error(path))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), ProvisionError> {
    Ok(())
}

/// The four payloads needed to build the execution directory.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Compressed `node_modules` tree.
    pub archive: Payload,
    /// Extraction utility.
    pub extractor: Payload,
    /// Runtime library of the extraction utility.
    pub extractor_runtime: Payload,
    /// Script that unpacks the archive; run with the execution directory
    /// as working directory.
    pub setup_script: Payload,
}

impl Bundle {
    /// Uses the platform's default payload file names inside `dir`.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let [archive, extractor, runtime, script] = DEFAULT_PAYLOADS;
        Self {
            archive: Payload::file(archive, dir.join(archive)),
            extractor: Payload::file(extractor, dir.join(extractor)),
            extractor_runtime: Payload::file(runtime, dir.join(runtime)),
            setup_script: Payload::file(script, dir.join(script)),
        }
    }

    /// Creates a bundle from configuration, defaulting to a `node`
    /// directory next to the running executable.
    #[must_use]
    pub fn from_config(config: &EnvironmentConfig) -> Self {
        let dir = config.bundle_dir.clone().unwrap_or_else(default_bundle_dir);
        Self::from_dir(&dir)
    }

    /// Returns the payloads in extraction order.
    #[must_use]
    pub fn payloads(&self) -> [&Payload; 4] {
        [
            &self.archive,
            &self.extractor,
            &self.extractor_runtime,
            &self.setup_script,
        ]
    }

    /// Builds the invocation that runs the setup script in `exec_dir`.
    #[must_use]
    pub fn setup_invocation(&self, exec_dir: &Path) -> Invocation {
        let script = self.setup_script.file_name.as_str();
        if cfg!(windows) {
            Invocation::new("cmd.exe", exec_dir).args(["/c", script])
        } else {
            Invocation::new("sh", exec_dir).args([script])
        }
    }
}

fn default_bundle_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("node")))
        .unwrap_or_else(|| PathBuf::from("node"))
}

/// What [`Provisioner::ensure_ready`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The environment was already valid.
    AlreadyReady,
    /// The environment was (re)created by this call.
    Provisioned,
}

/// Creates the execution directory on demand.
///
/// Safe to share between threads: provisioning runs under a single lock,
/// and callers that find the environment valid never take it.
pub struct Provisioner {
    layout: EnvironmentLayout,
    bundle: Bundle,
    runner: Arc<dyn ProcessRunner>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("layout", &self.layout)
            .field("bundle", &self.bundle)
            .finish_non_exhaustive()
    }
}

impl Provisioner {
    /// Creates a provisioner.
    #[must_use]
    pub fn new(layout: EnvironmentLayout, bundle: Bundle, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            layout,
            bundle,
            runner,
            lock: Mutex::new(()),
        }
    }

    /// Returns the managed layout.
    #[must_use]
    pub fn layout(&self) -> &EnvironmentLayout {
        &self.layout
    }

    /// Makes sure the environment is valid, provisioning it if needed.
    ///
    /// Concurrent callers block until the pass in progress finishes and
    /// then observe its result instead of provisioning again.
    ///
    /// # Errors
    ///
    /// Returns an error if any provisioning step fails. No marker file is
    /// written in that case, so the next call starts over.
    pub fn ensure_ready(
        &self,
        on_event: &mut dyn FnMut(LintEvent),
    ) -> Result<ProvisionOutcome, ProvisionError> {
        if self.layout.is_valid() {
            return Ok(ProvisionOutcome::AlreadyReady);
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.layout.is_valid() {
            debug!("Environment provisioned by a concurrent caller");
            return Ok(ProvisionOutcome::AlreadyReady);
        }

        self.provision(on_event)?;
        Ok(ProvisionOutcome::Provisioned)
    }

    /// Deletes and recreates the environment even if it is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if any provisioning step fails.
    pub fn reprovision(&self, on_event: &mut dyn FnMut(LintEvent)) -> Result<(), ProvisionError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.provision(on_event)
    }

    fn provision(&self, on_event: &mut dyn FnMut(LintEvent)) -> Result<(), ProvisionError> {
        let exec_dir = self.layout.exec_dir();
        info!("Provisioning linter environment in {}", exec_dir.display());
        on_event(LintEvent::ProvisioningStarted);

        if exec_dir.exists() {
            fs::remove_dir_all(exec_dir).map_err(io_error(exec_dir))?;
        }
        fs::create_dir_all(exec_dir).map_err(io_error(exec_dir))?;

        for payload in self.bundle.payloads() {
            payload.write_to(exec_dir)?;
        }

        let output = self
            .runner
            .run(&self.bundle.setup_invocation(exec_dir))?;
        if !output.success() {
            return Err(ProvisionError::SetupFailed {
                status: output.status,
                stderr: output.stderr,
            });
        }

        let marker = self.layout.marker_path();
        let stamp = chrono::Local::now()
            .format("%A, %B %-d, %Y %H:%M:%S")
            .to_string();
        fs::write(&marker, stamp).map_err(io_error(&marker))?;

        info!(
            "Linter environment ready ({} packages)",
            self.layout.module_count()
        );
        on_event(LintEvent::ProvisioningFinished);
        Ok(())
    }
}
