//! `mdi blocks` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use mdi_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the blocks command.
#[derive(Args)]
pub(crate) struct BlocksArgs {
    /// Path to configuration file (default: auto-discover mdi.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the combined selector list on one line.
    #[arg(long)]
    joined: bool,
}

impl BlocksArgs {
    /// Execute the blocks command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let editor = config.editor();

        let blocks: Vec<(&str, Vec<&str>)> = editor
            .schema()
            .nodes()
            .filter(|node| node.is_block())
            .map(|node| (node.name(), node.parse_tags().collect()))
            .collect();

        let mut stdout = io::stdout().lock();
        if self.joined {
            let selectors: Vec<&str> = blocks.iter().flat_map(|(_, tags)| tags.iter().copied()).collect();
            writeln!(stdout, "{}", selectors.join(","))?;
            return Ok(());
        }

        output.block_header(blocks.len());
        for (name, tags) in &blocks {
            writeln!(stdout, "{name}\t{}", tags.join(", "))?;
        }
        output.block_footer(editor.extensions().len());
        Ok(())
    }
}
