//! Extract command implementation.

use crate::backend::Engine;
use crate::cli::ExtractArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let extraction = engine.extraction(&args.id)?;
    let report = args.validate.then(|| engine.validate(&extraction.record));

    println!("{}", formatter.format_extraction(&extraction, report.as_ref())?);
    Ok(())
}
