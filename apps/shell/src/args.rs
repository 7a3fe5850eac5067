//! Command-line arguments of the `stackline` shell.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "stackline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Walk through call stack hand-offs between threads")]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML), overlaid with `STACKLINE__*` variables
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy a stack into a worker while the source keeps running
    Split {
        /// Frames pushed before the hand-off
        #[arg(short, long, default_value_t = 3)]
        frames: usize,
    },
    /// Move a stack into a worker and lock the source
    Migrate {
        /// Frames pushed before the hand-off
        #[arg(short, long, default_value_t = 3)]
        frames: usize,
    },
    /// Run tasks through an executor wrapped by the current stack
    Fanout {
        /// Number of tasks to submit
        #[arg(short, long, default_value_t = 4)]
        tasks: usize,
    },
}
