//! List command implementation.

use crate::backend::Engine;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the list command.
pub fn execute_list(engine: &Engine, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_documents(&engine.list())?);
    Ok(())
}
