//! Ingest command implementation.

use crate::backend::Engine;
use crate::cli::IngestArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;

/// Execute the ingest command.
pub fn execute_ingest(args: IngestArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let filename = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::InvalidInput(format!("not a file: {}", args.file.display())))?
        .to_string();

    let bytes = fs::read(&args.file)?;
    let receipt = engine.ingest(&bytes, &filename)?;

    println!("{}", formatter.format_receipt(&receipt)?);
    Ok(())
}
