//! Check command implementation.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use miette::{GraphicalReportHandler, GraphicalTheme};
use std::path::{Path, PathBuf};
use weblint_core::{Config, FileFilter, LintError, LintEvent, LinterKind, Orchestrator, Summary};

use crate::config_resolver;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    paths: &[PathBuf],
    format: OutputFormat,
    linters_filter: Option<&str>,
    config_path: Option<&Path>,
) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let project_dir = paths
        .first()
        .map(|p| project_dir_of(&cwd.join(p)))
        .unwrap_or_else(|| cwd.clone());

    let mut config = config_resolver::load(&project_dir, config_path)?;
    if let Some(filter) = linters_filter {
        restrict_linters(&mut config, filter);
    }

    let files = collect_files(&cwd, paths, &config)?;
    tracing::info!("Linting {} file(s)", files.len());

    let orchestrator = Orchestrator::new(config);
    let runs = match orchestrator.lint(&files, report_progress) {
        Ok(runs) => runs,
        Err(e) => {
            eprint!("{}", render_lint_error(&e));
            std::process::exit(2);
        }
    };

    super::output::print(&runs, format)?;

    // Exit with error code if there are errors
    if Summary::of(&runs).errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn project_dir_of(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map_or_else(|| path.to_path_buf(), Path::to_path_buf)
    }
}

/// Disables every linter not named in the comma-separated `filter`.
fn restrict_linters(config: &mut Config, filter: &str) {
    let selected: Vec<LinterKind> = filter
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let kind = LinterKind::from_name(name);
            if kind.is_none() {
                tracing::warn!("Unknown linter: {}", name);
            }
            kind
        })
        .collect();

    for kind in LinterKind::ALL {
        if !selected.contains(&kind) {
            config.set_enabled(kind, false);
        }
    }
}

/// Expands directories (honoring `.gitignore`) and keeps lintable files
/// whose linter is enabled.
fn collect_files(cwd: &Path, paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let filter = FileFilter::from_config(config);
    let mut files = Vec::new();

    for path in paths {
        let path = cwd.join(path);
        if path.is_dir() {
            for entry in WalkBuilder::new(&path).build() {
                let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if entry.file_type().is_some_and(|t| t.is_file()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            // Missing files are kept so the linter reports them.
            files.push(path);
        }
    }

    files.retain(|f| {
        filter.is_lintable(f) && LinterKind::from_path(f).is_some_and(|k| config.is_enabled(k))
    });
    Ok(files)
}

/// Renders the error with its code, cause chain and help text.
fn render_lint_error(err: &LintError) -> String {
    let handler =
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()).with_width(120);
    let mut out = String::new();
    if handler.render_report(&mut out, err).is_err() {
        return format!("Error: {err}\n");
    }
    out
}

fn report_progress(event: LintEvent) {
    match event {
        LintEvent::ProvisioningStarted => eprintln!("Preparing linter environment..."),
        LintEvent::ProvisioningFinished => eprintln!("Linter environment ready"),
        LintEvent::Progress(p) if p.total > 1 => eprintln!(
            "[{}/{}] {} ({} file(s))",
            p.completed + 1,
            p.total,
            p.linter,
            p.files
        ),
        LintEvent::Progress(_) | LintEvent::Done { .. } => {}
    }
}
