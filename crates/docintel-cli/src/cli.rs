//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docintel CLI - Ask questions about logistics documents and extract shipment fields.
#[derive(Debug, Parser)]
#[command(name = "docintel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DOCINTEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids and bare values)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest a document and print its identifier
    Ingest(IngestArgs),

    /// Ask a question about an ingested document
    Ask(AskArgs),

    /// Extract shipment fields from an ingested document
    Extract(ExtractArgs),

    /// List ingested documents
    List,

    /// Show or initialize the configuration file
    Config(ConfigArgs),
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Path to a .txt, .md or .csv file
    pub file: PathBuf,
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Document identifier returned by ingest
    pub id: String,

    /// Question to answer from the document
    pub question: String,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document identifier returned by ingest
    pub id: String,

    /// Also print a completeness report
    #[arg(long)]
    pub validate: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_command() {
        let cli = Cli::parse_from(["docintel", "ask", "a1b2c3d4e5f6", "Who is the shipper?"]);
        match cli.command {
            Command::Ask(args) => {
                assert_eq!(args.id, "a1b2c3d4e5f6");
                assert_eq!(args.question, "Who is the shipper?");
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["docintel", "extract", "abc", "--validate", "-f", "json", "-vv"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Extract(args) => assert!(args.validate),
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["docintel", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force: true }
            })
        ));
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["docintel"]).is_err());
    }
}
