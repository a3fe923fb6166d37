//! Setup command implementation.

use anyhow::{Context, Result};
use std::sync::Arc;
use weblint_core::{
    Bundle, CommandRunner, Config, EnvironmentLayout, LintEvent, ProvisionOutcome, Provisioner,
};

/// Runs the setup command.
pub fn run(config: &Config, force: bool) -> Result<()> {
    let provisioner = Provisioner::new(
        EnvironmentLayout::from_config(&config.environment),
        Bundle::from_config(&config.environment),
        Arc::new(CommandRunner::new()),
    );
    let exec_dir = provisioner.layout().exec_dir().display().to_string();

    let mut on_event = |event: LintEvent| {
        if event == LintEvent::ProvisioningStarted {
            eprintln!("Installing linters into {exec_dir}...");
        }
    };

    if force {
        provisioner
            .reprovision(&mut on_event)
            .context("Setup failed")?;
        println!("Linter environment rebuilt in {exec_dir}");
        return Ok(());
    }

    match provisioner
        .ensure_ready(&mut on_event)
        .context("Setup failed")?
    {
        ProvisionOutcome::AlreadyReady => {
            println!("Linter environment already installed in {exec_dir}");
        }
        ProvisionOutcome::Provisioned => println!("Linter environment installed in {exec_dir}"),
    }

    Ok(())
}
