//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# weblint configuration

[linters]
eslint = true
tslint = true
coffeelint = true
csslint = true

[files]
# Path fragments or glob patterns; matching files are never linted
ignore = [
    "/node_modules/",
    "/bower_components/",
    "/typings/",
    "/lib/",
]

# Skip minified files such as app.min.js
ignore_minified = true

[environment]
# Where the linters are installed (default: <temp>/weblint<version>)
# exec_dir = "/var/cache/weblint"

# Directory holding node_modules.7z, the extractor and the setup script
# bundle_dir = "/opt/weblint/node"

# Packages expected under node_modules for a complete install
min_modules = 36

# Directory appended to PATH for the linters (e.g. where node lives)
# extra_path = "/usr/local/bin"
"#;

/// Runs the init command, writing `weblint.toml` into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = write_default(dir, force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit weblint.toml to enable or disable linters");
    println!("  2. Run: weblint check");

    Ok(())
}

fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join("weblint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use weblint_core::{Config, LinterKind, DEFAULT_MIN_MODULES};

    #[test]
    fn default_config_matches_built_in_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();

        for kind in LinterKind::ALL {
            assert!(config.is_enabled(kind));
        }
        assert_eq!(config.files.ignore, defaults.files.ignore);
        assert!(config.files.ignore_minified);
        assert_eq!(config.environment.min_modules, DEFAULT_MIN_MODULES);
        assert!(config.environment.exec_dir.is_none());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("weblint.toml"), "# mine").unwrap();

        assert!(write_default(tmp.path(), false).is_err());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("weblint.toml")).unwrap(),
            "# mine"
        );

        write_default(tmp.path(), true).unwrap();
        assert!(std::fs::read_to_string(tmp.path().join("weblint.toml"))
            .unwrap()
            .contains("[linters]"));
    }
}
