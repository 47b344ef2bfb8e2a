//! Flotilla CLI - declarative container deployment for small device fleets
//!
//! Usage: flotilla <COMMAND>
//!
//! Commands:
//!   init    Scaffold a new flotilla project
//!   vet     Validate the project configuration
//!   build   Build application images and record them in flotilla.lock
//!   deploy  Deploy applications to their resolved target nodes
//!   status  Show node reachability and recorded deployments

mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { dir } => {
            let dir = dir.unwrap_or_else(|| cli.project.clone());
            commands::init::run(&dir)
        }
        Commands::Vet => commands::vet::run(&cli.project, cli.json),
        Commands::Build { app } => commands::build::run(&cli.project, app.as_deref()),
        Commands::Deploy { app } => commands::deploy::run(&cli.project, app.as_deref()),
        Commands::Status => commands::status::run(&cli.project, cli.json),
    }
}
