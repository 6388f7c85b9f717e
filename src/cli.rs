//! Command-line interface for strictly_werewolf.

use clap::{Parser, Subcommand};

/// Strictly Werewolf - referee for werewolf matches between agents
#[derive(Parser, Debug)]
#[command(name = "strictly_werewolf")]
#[command(about = "Referee werewolf matches between remote and LLM participants", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a match with the configured gateway and print the record as JSON
    Run {
        /// Path to match configuration file
        #[arg(short, long, default_value = "match.toml")]
        config: std::path::PathBuf,
    },

    /// Run a match offline with scripted fallback players
    Simulate {
        /// Path to match configuration file
        #[arg(short, long, default_value = "match.toml")]
        config: std::path::PathBuf,
    },
}
