use clap::{Args, Parser, Subcommand};
use getset::Getters;
use std::path::{Path, PathBuf};

pub mod tui;

/// primdb: a tiny file-persisted table store
#[derive(Debug, Parser, Getters)]
#[command(name = "primdb")]
#[command(about = "primdb: a tiny file-persisted table store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    #[getset(get = "pub")]
    command: Commands,
}

impl Cli {
    /// Configuration file named on the command line, if any.
    pub fn config_file(&self) -> Option<&Path> {
        match &self.command {
            Commands::Shell(args) => args.config.as_deref(),
            Commands::Exec(args) => args.config.as_deref(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the interactive shell
    Shell(ShellArgs),
    /// Run commands non-interactively and exit
    Exec(ExecArgs),
}

#[derive(Debug, Args, Getters)]
#[getset(get = "pub")]
pub struct ShellArgs {
    /// Path to the JSON store (overrides `data_path`)
    #[arg(long)]
    db: Option<PathBuf>,
    /// Configuration file (defaults to ./primdb.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Keep everything in memory; nothing is read or written
    #[arg(long, conflicts_with = "db")]
    memory: bool,
}

#[derive(Debug, Args, Getters)]
#[getset(get = "pub")]
pub struct ExecArgs {
    /// Commands to run, in order, e.g. "select from users"
    #[arg(required = true)]
    commands: Vec<String>,
    /// Path to the JSON store (overrides `data_path`)
    #[arg(long)]
    db: Option<PathBuf>,
    /// Configuration file (defaults to ./primdb.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Approve destructive commands instead of declining them
    #[arg(short, long)]
    yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        <Cli as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn parse_shell() {
        let cli = Cli::try_parse_from(["primdb", "shell", "--memory"]).unwrap();
        match cli.command() {
            Commands::Shell(args) => {
                assert!(*args.memory());
                assert!(args.db().is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(cli.config_file().is_none());
    }

    #[test]
    fn memory_conflicts_with_db() {
        assert!(Cli::try_parse_from(["primdb", "shell", "--memory", "--db", "x.json"]).is_err());
    }

    #[test]
    fn parse_exec() {
        let cli = Cli::try_parse_from([
            "primdb",
            "exec",
            "list_tables",
            "drop_table users",
            "--yes",
            "-c",
            "custom.toml",
        ])
        .unwrap();

        match cli.command() {
            Commands::Exec(args) => {
                assert_eq!(args.commands(), &vec!["list_tables", "drop_table users"]);
                assert!(*args.yes());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(cli.config_file(), Some(Path::new("custom.toml")));
    }

    #[test]
    fn exec_needs_a_command() {
        assert!(Cli::try_parse_from(["primdb", "exec"]).is_err());
    }
}
