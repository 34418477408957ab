// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for procflow

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "procflow")]
#[command(about = "Run a declarative tree of processes with restart and fan-out policies")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a pipeline; exits with the failing process's own status code
    Run {
        #[arg(help = "Path to pipeline YAML file")]
        pipeline: PathBuf,
    },

    /// Parse a pipeline and print its resolved tree without executing
    Validate {
        #[arg(help = "Path to pipeline YAML file")]
        pipeline: PathBuf,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
