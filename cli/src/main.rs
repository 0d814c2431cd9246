
mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{density, distance};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Density(args) => density::run(&cli, args),
        Commands::Distance(args) => distance::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
