//! Ask command implementation.

use crate::backend::Engine;
use crate::cli::AskArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the ask command.
pub fn execute_ask(args: AskArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let question = args.question.trim();
    if question.is_empty() {
        return Err(CliError::InvalidInput("question must not be empty".to_string()));
    }

    let answer = engine.ask(&args.id, question)?;
    println!("{}", formatter.format_answer(&answer)?);
    Ok(())
}
