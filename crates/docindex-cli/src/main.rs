//! docindex CLI - build, check and search Documenter search indexes.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use commands::Outcome;

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::initialize_logging(&cli)?;

    let outcome = execute_command(cli.command)?;
    if outcome == Outcome::Problems {
        std::process::exit(2);
    }
    Ok(())
}

fn execute_command(command: Commands) -> Result<Outcome> {
    match command {
        Commands::Build {
            config,
            check,
            stdout,
        } => commands::build(&config, check, stdout),

        Commands::Check { file, format } => commands::check(&file, format),

        Commands::Search {
            query,
            index,
            mode,
            category,
            limit,
            format,
        } => commands::search(&commands::SearchArgs {
            query: query.join(" "),
            index,
            mode,
            category,
            limit,
            format,
        }),

        Commands::Stats { file, format } => commands::stats(&file, format),

        Commands::Fmt { file, write } => commands::fmt(&file, write),
    }
}
