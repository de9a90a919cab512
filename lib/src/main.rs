//! toolmix CLI
//!
//! Command-line interface for rewriting five-tool G-code.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::debug;

use toolmix::cli::{commands, Cli, Commands};
use toolmix::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    debug!("toolmix v{}", env!("CARGO_PKG_VERSION"));

    match handle_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Process {
            input,
            output,
            job,
            save_job,
            schedule,
        } => commands::process(
            input.as_deref(),
            output.as_deref(),
            job.as_deref(),
            save_job.as_deref(),
            &schedule,
        ),
        Commands::Preview { layers, schedule } => commands::preview(layers, &schedule),
        Commands::Mix { colors } => commands::mix(&colors),
    }
}
