//! CLI argument definitions using clap
//!
//! Commands:
//! - flatdb init --config <path>
//! - flatdb tables --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// flatdb - a single-file typed record store
#[derive(Parser, Debug)]
#[command(name = "flatdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write an empty document at the configured path
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./flatdb.json")]
        config: PathBuf,
    },

    /// List tables with their type and record count
    Tables {
        /// Path to configuration file
        #[arg(long, default_value = "./flatdb.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
