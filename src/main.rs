mod cli;
mod collect;
mod commands;
mod config;
mod error;
mod execute;
mod logging;
mod manifest;
mod marks;
mod model;
mod serialization;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(&args),
        Commands::Collect(args) => commands::collect::run(&args),
    }
}
