mod cli;
mod commands;
mod config;
mod data;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Render(args) => {
            let output = commands::render(&args)?;
            commands::emit(&output, args.output.as_deref())?;
        }
        Commands::Vars(args) => commands::emit(&commands::vars(&args.template)?, None)?,
        Commands::Blocks(args) => commands::emit(&commands::blocks(&args.template)?, None)?,
    }

    Ok(())
}
