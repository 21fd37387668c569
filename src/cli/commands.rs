//! CLI command implementations
//!
//! Commands operate on the raw document and need no record types
//! registered: `tables` reads table names, type descriptors and record
//! counts straight from the encoded form.

use std::path::Path;

use serde_json::{json, Value};

use crate::codec::EncodedDocument;
use crate::config::DatabaseConfig;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::store::{DocumentStore, FileStore};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(ref e) = result {
        // stdout may itself be the failure; the caller still reports on stderr
        let _ = write_error(e.code_str(), e.message());
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Tables { config } => tables(&config),
    }
}

fn load_config(config_path: &Path) -> CliResult<DatabaseConfig> {
    let config = DatabaseConfig::load(config_path)
        .map_err(|e| CliError::config_error(e.to_string()))?;
    let severity = config
        .severity()
        .map_err(|e| CliError::config_error(e.to_string()))?;
    Logger::set_min_severity(severity);
    Ok(config)
}

/// Write an empty document at the configured path
///
/// Refuses to touch an existing document.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let mut store = FileStore::new(&config.path);

    if store.exists() {
        return Err(CliError::already_initialized(&store.describe()));
    }

    let bytes = EncodedDocument::empty().to_bytes(config.pretty)?;
    store.write_document(&bytes)?;

    let location = store.describe();
    log_event_with_fields(Event::DocumentCreated, &[("store", location.as_str())]);

    write_response(json!({
        "initialized": true,
        "path": location,
    }))
}

/// Name, type descriptor and record count of every table, in document order
pub fn table_summaries(config_path: &Path) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let store = FileStore::new(&config.path);

    if !store.exists() {
        return Err(CliError::not_initialized(&store.describe()));
    }

    let document = EncodedDocument::from_bytes(&store.read_document()?)?;
    let tables: Vec<Value> = document
        .tables
        .iter()
        .map(|table| {
            json!({
                "name": table.name,
                "type": table.type_name,
                "records": table.records.len(),
            })
        })
        .collect();

    Ok(json!({
        "path": store.describe(),
        "saved_at": document.saved_at,
        "tables": tables,
    }))
}

/// List the tables of the configured document
pub fn tables(config_path: &Path) -> CliResult<()> {
    write_response(table_summaries(config_path)?)
}
