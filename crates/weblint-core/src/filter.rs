//! Decides which paths are worth handing to the orchestrator.

use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::linter::LinterKind;

/// Pre-filter applied by callers before linting.
///
/// A path passes when it is absolute, has a recognized extension, is not
/// a minified bundle (`name.min.js`) and matches no ignore pattern.
#[derive(Debug, Clone)]
pub struct FileFilter {
    patterns: Vec<Pattern>,
    ignore_minified: bool,
}

#[derive(Debug, Clone)]
struct Pattern {
    glob: Option<glob::Pattern>,
    text: String,
}

impl Pattern {
    fn new(raw: &str) -> Self {
        Self {
            glob: glob::Pattern::new(raw).ok(),
            text: normalize(raw),
        }
    }

    fn matches(&self, normalized_path: &str) -> bool {
        if let Some(glob) = &self.glob {
            if glob.matches(normalized_path) {
                return true;
            }
        }

        // Plain fragments such as "/node_modules/" match anywhere.
        let fragment = self.text.replace("**", "");
        !fragment.is_empty() && normalized_path.contains(&fragment)
    }
}

fn normalize(s: &str) -> String {
    s.replace('\\', "/")
}

impl FileFilter {
    /// Creates a filter from raw ignore patterns.
    #[must_use]
    pub fn new<I, S>(patterns: I, ignore_minified: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .filter(|p| !p.as_ref().trim().is_empty())
                .map(|p| Pattern::new(p.as_ref()))
                .collect(),
            ignore_minified,
        }
    }

    /// Creates a filter from the `[files]` configuration section.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ignore_patterns(), config.files.ignore_minified)
    }

    /// Returns true if `path` should be linted.
    #[must_use]
    pub fn is_lintable(&self, path: &Path) -> bool {
        if !path.is_absolute() {
            debug!("Not absolute: {}", path.display());
            return false;
        }
        if LinterKind::from_path(path).is_none() {
            return false;
        }
        if self.ignore_minified && is_minified(path) {
            debug!("Minified: {}", path.display());
            return false;
        }

        let normalized = normalize(&path.to_string_lossy());
        if self.patterns.iter().any(|p| p.matches(&normalized)) {
            debug!("Ignored: {}", path.display());
            return false;
        }

        true
    }
}

/// `name.min.ext`, compared case-insensitively.
fn is_minified(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| Path::new(stem).extension())
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("min"))
}
