//! # RogueTech Installer CLI
//!
//! This is the binary entry point for the `roguetech-installer` tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initialising logging.
//! - Running the install or the option listing, and turning failures into a
//!   non-zero exit status.
//!
//! The install logic lives in the library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    if cli.help {
        cli::Cli::print_help();
        std::process::exit(1);
    }

    init_logging(cli.log_filter());
    cli.execute()
}

/// `RUST_LOG` wins over the command-line level.
fn init_logging(default_filter: &str) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .format_timestamp(None)
    .format_target(false)
    .try_init();
}
