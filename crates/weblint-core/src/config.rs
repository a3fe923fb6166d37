//! Configuration types for weblint.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::linter::LinterKind;

/// Top-level configuration for weblint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-linter enable flags.
    #[serde(default)]
    pub linters: LintersConfig,

    /// Which files are handed to the linters at all.
    #[serde(default)]
    pub files: FilesConfig,

    /// Where and how the linter runtime is provisioned.
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a linter is enabled.
    #[must_use]
    pub fn is_enabled(&self, kind: LinterKind) -> bool {
        match kind {
            LinterKind::EsLint => self.linters.eslint,
            LinterKind::TsLint => self.linters.tslint,
            LinterKind::CoffeeLint => self.linters.coffeelint,
            LinterKind::CssLint => self.linters.csslint,
        }
    }

    /// Enables or disables a linter.
    pub fn set_enabled(&mut self, kind: LinterKind, enabled: bool) {
        let flag = match kind {
            LinterKind::EsLint => &mut self.linters.eslint,
            LinterKind::TsLint => &mut self.linters.tslint,
            LinterKind::CoffeeLint => &mut self.linters.coffeelint,
            LinterKind::CssLint => &mut self.linters.csslint,
        };
        *flag = enabled;
    }

    /// Returns the non-empty ignore patterns.
    pub fn ignore_patterns(&self) -> impl Iterator<Item = &str> {
        self.files
            .ignore
            .iter()
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty())
    }
}

/// Enable flags for each supported linter. All default to `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintersConfig {
    /// Run ESLint on `.js`, `.jsx` and `.es6` files.
    #[serde(default = "default_true")]
    pub eslint: bool,
    /// Run TSLint on `.ts` and `.tsx` files.
    #[serde(default = "default_true")]
    pub tslint: bool,
    /// Run CoffeeLint on `.coffee`, `.litcoffee` and `.iced` files.
    #[serde(default = "default_true")]
    pub coffeelint: bool,
    /// Run CSS Lint on `.css` files.
    #[serde(default = "default_true")]
    pub csslint: bool,
}

impl Default for LintersConfig {
    fn default() -> Self {
        Self {
            eslint: true,
            tslint: true,
            coffeelint: true,
            csslint: true,
        }
    }
}

/// File selection settings applied by callers before linting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Path fragments or glob patterns; any matching file is skipped.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Skip minified files such as `app.min.js`.
    ///
    /// This is the only switch for minified files; `ignore` holds no
    /// `.min.` pattern by default so setting this to `false` lints them.
    #[serde(default = "default_true")]
    pub ignore_minified: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
            ignore_minified: true,
        }
    }
}

/// Settings for the provisioned linter runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Execution directory (default: `<temp>/weblint<version>`).
    #[serde(default)]
    pub exec_dir: Option<PathBuf>,

    /// Directory holding the bundled payloads extracted during setup.
    #[serde(default)]
    pub bundle_dir: Option<PathBuf>,

    /// Minimum number of packages under `node_modules` for the
    /// environment to count as fully installed.
    #[serde(default = "default_min_modules")]
    pub min_modules: usize,

    /// Extra directory appended to `PATH` when running the linters.
    #[serde(default)]
    pub extra_path: Option<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            exec_dir: None,
            bundle_dir: None,
            min_modules: default_min_modules(),
            extra_path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_min_modules() -> usize {
    crate::environment::DEFAULT_MIN_MODULES
}

fn default_ignore() -> Vec<String> {
    [
        "/node_modules/",
        "/bower_components/",
        "/typings/",
        "/lib/",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
