//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bayesnet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (overrides RUST_LOG and the config file)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Quiet mode (no progress bar or summary)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Don't load configuration file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Without a subcommand, behaves like `run` with its defaults
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer every query of a batch input file
    Run {
        /// Batch file: network path on the first line, one query per line after it
        #[arg(value_name = "INPUT", default_value = "input.txt")]
        input: PathBuf,

        /// File receiving one result line per query
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,

        /// Worker threads used to evaluate queries
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Answer a single query against a network file
    Query {
        /// XMLBIF network file
        #[arg(short, long)]
        network: PathBuf,

        /// Query text, e.g. "P(B=T|J=T,M=T)" or "P(B=T,E=F)"
        query: String,

        /// Algorithm for conditional queries (1 enumeration, 2 VE lexicographic, 3 VE min-weight)
        #[arg(short, long)]
        algorithm: Option<u32>,
    },

    /// Print the variables, parents and topological order of a network
    Inspect {
        /// XMLBIF network file
        #[arg(short, long)]
        network: PathBuf,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Initialize default configuration file
    Init,
}
