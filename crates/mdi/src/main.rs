//! mdi CLI - Markdown ingestion.
//!
//! Provides commands for:
//! - `convert`: Convert markdown to editor markup
//! - `blocks`: List the block selectors used for normalization

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BlocksArgs, ConvertArgs};
use output::Output;

/// mdi - Markdown ingestion for structured editors.
#[derive(Parser)]
#[command(name = "mdi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markdown to normalized editor markup.
    Convert(ConvertArgs),
    /// Print the block selectors of the standard schema.
    Blocks(BlocksArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Convert(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Blocks(args) => args.execute(),
    };

    if let Err(err) = result {
        output.failure(&err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "mdi", "convert", "doc.md", "--inline", "--ignore", r"\$\w+", "--verbose",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Convert(ref args) if args.verbose));
    }

    #[test]
    fn test_html_flags_conflict() {
        assert!(Cli::try_parse_from(["mdi", "convert", "--html", "true", "--no-html"]).is_err());
    }
}
