//! CLI module for flatdb
//!
//! Provides command-line access to a document:
//! - init: Write an empty document
//! - tables: List the tables of a document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, table_summaries, tables};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
