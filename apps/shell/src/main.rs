mod args;
mod commands;

use crate::args::{Cli, Command};
use anyhow::Result;
use clap::Parser;
use stackline::config::{StacklineConfig, load_config};
use stackline::setup::{build_executor, init_logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config: StacklineConfig = load_config(cli.config.as_deref())?;
    let _logger = init_logger(&config.logging)?;
    let executor = build_executor(&config.executor)?;

    let mut out = std::io::stdout();
    match cli.command {
        Command::Split { frames } => commands::split(&mut out, executor, frames)?,
        Command::Migrate { frames } => commands::migrate(&mut out, executor, frames)?,
        Command::Fanout { tasks } => commands::fanout(&mut out, executor, tasks)?,
    }

    Ok(())
}
