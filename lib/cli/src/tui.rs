use crate::{ExecArgs, ShellArgs};
use anyhow::{Context, Result};
use catalog::{Catalog, SelectCache};
use common::config::ShellConfig;
use compile::report_error;
use driver::{
    shell::Shell, AlwaysConfirm, Confirm, Driver, ExecError, NeverConfirm, Outcome, StdinConfirm,
};
use owo_colors::OwoColorize;
use std::{io, path::Path};
use tracing::{info, instrument};

/// Opens the store named by `db` (or the configured `data_path`), or an
/// in-memory catalog when `memory` is set.
pub fn open_catalog(config: &ShellConfig, db: Option<&Path>, memory: bool) -> Result<Catalog> {
    let catalog = if memory {
        Catalog::in_memory()
    } else {
        let path = db.unwrap_or(config.data_path().as_path());
        Catalog::load(path).with_context(|| format!("failed to open {}", path.display()))?
    };

    Ok(catalog
        .with_autosave(*config.autosave())
        .with_cache(SelectCache::new(*config.cache())))
}

/// Writes the catalog back when autosave is off; with autosave on every
/// mutation has already been saved.
fn finish(config: &ShellConfig, driver: Driver) -> Result<()> {
    if !*config.autosave() {
        driver.into_catalog().flush().context("failed to save the catalog")?;
    }
    Ok(())
}

#[instrument(skip_all)]
pub fn handle_shell_command(args: &ShellArgs, config: &ShellConfig) -> Result<i32> {
    let catalog = open_catalog(config, args.db().as_deref(), *args.memory())?;
    let confirm: Box<dyn Confirm> = if *config.confirm_destructive() {
        Box::new(StdinConfirm)
    } else {
        Box::new(AlwaysConfirm)
    };
    let driver = Driver::builder().catalog(catalog).confirm(confirm).build();

    let mut shell = Shell::new(driver, config)?;
    let code = shell.run()?;
    finish(config, shell.into_driver())?;

    info!(code, "shell session ended");
    Ok(code)
}

/// Runs each command in order, stopping at the first failure. Destructive
/// commands are declined unless `--yes` was given.
#[instrument(skip_all)]
pub fn handle_exec_command(args: &ExecArgs, config: &ShellConfig) -> Result<i32> {
    let catalog = open_catalog(config, args.db().as_deref(), false)?;
    let confirm: Box<dyn Confirm> = if *args.yes() || !*config.confirm_destructive() {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(NeverConfirm)
    };
    let mut driver = Driver::builder().catalog(catalog).confirm(confirm).build();

    let mut code = 0;
    for line in args.commands() {
        match driver.execute(line) {
            Ok(response) => match response.outcome() {
                Outcome::Exit => break,
                Outcome::Cancelled { action } => {
                    eprintln!("{} {} (pass --yes to allow it)", "Declined:".yellow(), action)
                }
                outcome => println!("{}", outcome),
            },
            Err(e) => {
                report(line, &e);
                code = 1;
                break;
            }
        }
    }

    finish(config, driver)?;
    Ok(code)
}

fn report(line: &str, e: &ExecError) {
    if let ExecError::Parse(parse) = e {
        if report_error(&mut io::stderr(), line, parse).is_ok() {
            return;
        }
    }
    eprintln!("{}: {}", e.kind().red(), e);
}
