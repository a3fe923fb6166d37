//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/weblint.toml` or `.weblint.toml`
//! 3. `$WEBLINT_CONFIG_DIR/config.toml` or `~/.weblint/config.toml`
//! 4. No config found → defaults

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use weblint_core::Config;

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["weblint.toml", ".weblint.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Resolves and loads the configuration in one step.
///
/// # Errors
///
/// Returns an error if a resolved file cannot be loaded.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    resolve(project_dir, explicit).load()
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Returns the global config directory path.
///
/// Resolution: `$WEBLINT_CONFIG_DIR` > `~/.weblint/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("WEBLINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".weblint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use weblint_core::LinterKind;

    /// A project dir and a global dir, each optionally holding a config.
    struct Dirs {
        project: TempDir,
        global: TempDir,
    }

    impl Dirs {
        fn new() -> Self {
            Self {
                project: TempDir::new().unwrap(),
                global: TempDir::new().unwrap(),
            }
        }

        fn project_file(&self, name: &str, content: &str) -> PathBuf {
            let path = self.project.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }

        fn global_file(&self, content: &str) -> PathBuf {
            let path = self.global.path().join(GLOBAL_CONFIG_NAME);
            fs::write(&path, content).unwrap();
            path
        }

        fn resolve(&self, explicit: Option<&Path>) -> ConfigSource {
            resolve_inner(
                self.project.path(),
                explicit,
                Some(self.global.path().to_path_buf()),
            )
        }
    }

    #[test]
    fn explicit_config_wins_and_is_loaded() {
        let dirs = Dirs::new();
        dirs.project_file("weblint.toml", "[linters]\neslint = false\n");
        dirs.global_file("[linters]\ntslint = false\n");
        let explicit = dirs.project_file("ci.toml", "[linters]\ncsslint = false\n");

        let source = dirs.resolve(Some(&explicit));
        assert_eq!(source, ConfigSource::Explicit(explicit));

        let config = source.load().unwrap();
        assert!(!config.is_enabled(LinterKind::CssLint));
        assert!(config.is_enabled(LinterKind::EsLint));
        assert!(config.is_enabled(LinterKind::TsLint));
    }

    #[test]
    fn explicit_config_that_fails_to_parse_names_the_file() {
        let dirs = Dirs::new();
        let explicit = dirs.project_file("broken.toml", "[linters\neslint = maybe\n");

        let err = dirs.resolve(Some(&explicit)).load().unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("broken.toml"), "{message}");
    }

    #[test]
    fn explicit_config_that_is_missing_is_an_error() {
        let dirs = Dirs::new();
        let missing = dirs.project.path().join("nope.toml");

        let source = dirs.resolve(Some(&missing));
        assert_eq!(source, ConfigSource::Explicit(missing));
        assert!(source.load().is_err());
    }

    #[test]
    fn plain_project_name_preferred_over_dot_prefix() {
        let dirs = Dirs::new();
        dirs.project_file(".weblint.toml", "[linters]\ncoffeelint = false\n");
        assert!(!dirs
            .resolve(None)
            .load()
            .unwrap()
            .is_enabled(LinterKind::CoffeeLint));

        let plain = dirs.project_file("weblint.toml", "");
        let source = dirs.resolve(None);
        assert_eq!(source, ConfigSource::Project(plain));
        assert!(source.load().unwrap().is_enabled(LinterKind::CoffeeLint));
    }

    #[test]
    fn global_config_applies_without_project_config() {
        let dirs = Dirs::new();
        let global = dirs.global_file("[files]\nignore_minified = false\n");

        let source = dirs.resolve(None);
        assert_eq!(source, ConfigSource::Global(global));
        assert!(!source.load().unwrap().files.ignore_minified);
    }

    #[test]
    fn project_config_shadows_global() {
        let dirs = Dirs::new();
        dirs.global_file("[linters]\neslint = false\n");
        dirs.project_file("weblint.toml", "");

        let config = dirs.resolve(None).load().unwrap();
        assert!(config.is_enabled(LinterKind::EsLint));
    }

    #[test]
    fn defaults_when_nothing_is_found() {
        let dirs = Dirs::new();

        let source = dirs.resolve(None);
        assert_eq!(source, ConfigSource::Default);
        assert!(source.path().is_none());
        let config = source.load().unwrap();
        assert!(LinterKind::ALL.iter().all(|k| config.is_enabled(*k)));
    }
}
