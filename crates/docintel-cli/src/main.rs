//! Docintel CLI - Question answering and field extraction for logistics documents.

use clap::Parser;
use docintel_cli::commands;
use docintel_cli::config::OutputFormat;
use docintel_cli::{backend, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let formatter = Formatter::new(OutputFormat::Table, !cli.no_color);
    if let Err(e) = run(cli) {
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> docintel_cli::Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let config = Config::load_from(&path)?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    if let Command::Config(args) = cli.command {
        return commands::execute_config(args, &config, &path, &formatter);
    }

    let engine = backend::build_engine(&config)?;
    match cli.command {
        Command::Ingest(args) => commands::execute_ingest(args, &engine, &formatter),
        Command::Ask(args) => commands::execute_ask(args, &engine, &formatter),
        Command::Extract(args) => commands::execute_extract(args, &engine, &formatter),
        Command::List => commands::execute_list(&engine, &formatter),
        Command::Config(_) => Ok(()),
    }
}
