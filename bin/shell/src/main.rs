use anyhow::Result;
use clap::Parser;
use cli::{
    tui::{handle_exec_command, handle_shell_command},
    Cli, Commands,
};
use common::{config::ShellConfig, util::trace::initialize_tracing};
use tracing::info;

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = ShellConfig::load(args.config_file())?;

    initialize_tracing(config.log_level())?;
    info!("primdb started");

    let code = match args.command() {
        Commands::Shell(args) => handle_shell_command(args, &config)?,
        Commands::Exec(args) => handle_exec_command(args, &config)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
