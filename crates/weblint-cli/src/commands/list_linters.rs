//! List linters command implementation.

use weblint_core::{Config, LinterKind};

/// Runs the list-linters command.
pub fn run(config: &Config) {
    println!("Supported linters:\n");
    println!(
        "{:<12} {:<10} {:<24} {:<16} Enabled",
        "Name", "Tool", "Extensions", "Config file"
    );
    println!("{}", "-".repeat(72));

    for kind in LinterKind::ALL {
        let extensions = kind
            .extensions()
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:<12} {:<10} {:<24} {:<16} {}",
            kind.name(),
            kind.tool(),
            extensions,
            kind.marker_file(),
            if config.is_enabled(kind) { "yes" } else { "no" }
        );
    }

    println!("\nUse --linters to run a subset, e.g.:");
    println!("  weblint check --linters eslint,csslint");
}
