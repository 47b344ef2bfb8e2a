use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Flotilla - declarative container deployment for small device fleets
#[derive(Parser, Debug)]
#[command(name = "flotilla")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory (default: current working directory)
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Machine-readable output (JSON lines)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new flotilla project
    Init {
        /// Directory to initialize (default: the project directory)
        dir: Option<PathBuf>,
    },

    /// Validate the project configuration
    Vet,

    /// Build application images and record them in flotilla.lock
    Build {
        /// Build a single application instead of all
        app: Option<String>,
    },

    /// Deploy applications to their resolved target nodes
    Deploy {
        /// Deploy a single application instead of all
        app: Option<String>,
    },

    /// Show node reachability and recorded deployments
    Status,
}
