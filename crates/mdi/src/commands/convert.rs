//! `mdi convert` command implementation.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Args;
use mdi_config::{CliSettings, Config};
use mdi_core::{MarkdownParser, ParseOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert (default: read stdin).
    file: Option<PathBuf>,

    /// Write the markup to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Convert as inline content: a leading paragraph is unwrapped.
    #[arg(long)]
    inline: bool,

    /// Path to configuration file (default: auto-discover mdi.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pass raw HTML through (default: enabled).
    #[arg(long)]
    html: Option<bool>,

    /// Render raw HTML as text.
    #[arg(long, conflicts_with = "html")]
    no_html: bool,

    /// Turn bare URLs into links.
    #[arg(long)]
    linkify: bool,

    /// Render single line breaks as <br>.
    #[arg(long)]
    breaks: bool,

    /// Keep text matching REGEX verbatim (repeatable, added to config).
    #[arg(long = "ignore", value_name = "REGEX")]
    ignore: Vec<String>,

    /// Enable task lists (default: enabled).
    #[arg(long)]
    task_lists: Option<bool>,

    /// Disable task lists.
    #[arg(long, conflicts_with = "task_lists")]
    no_task_lists: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input, or conversion fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markdown = match &self.file {
            Some(path) => fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let html = convert(&markdown, &config, self.inline)?;

        match &self.output {
            Some(path) => {
                fs::write(path, &html)?;
                output.wrote(path, html.len());
            }
            None => writeln!(io::stdout().lock(), "{html}")?,
        }

        Ok(())
    }

    /// Build CLI settings from args.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            html: self.no_html.then_some(false).or(self.html),
            linkify: self.linkify.then_some(true),
            breaks: self.breaks.then_some(true),
            extra_ignore_patterns: self.ignore.clone(),
            task_lists_enabled: self.no_task_lists.then_some(false).or(self.task_lists),
        }
    }
}

/// Convert `markdown` with the parser described by `config`.
fn convert(markdown: &str, config: &Config, inline: bool) -> Result<String, CliError> {
    let parser = MarkdownParser::new(config.editor(), config.markdown_options())?;
    Ok(parser.parse_markdown(markdown, ParseOptions { inline })?)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ConvertArgs,
    }

    fn args(argv: &[&str]) -> ConvertArgs {
        let mut full = vec!["convert"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_cli_settings_defaults() {
        let settings = args(&[]).cli_settings();
        assert_eq!(settings.html, None);
        assert_eq!(settings.linkify, None);
        assert_eq!(settings.breaks, None);
        assert!(settings.extra_ignore_patterns.is_empty());
        assert_eq!(settings.task_lists_enabled, None);
    }

    #[test]
    fn test_cli_settings_flags() {
        let settings = args(&[
            "--no-html",
            "--linkify",
            "--ignore",
            "a+",
            "--ignore",
            "b+",
            "--no-task-lists",
        ])
        .cli_settings();
        assert_eq!(settings.html, Some(false));
        assert_eq!(settings.linkify, Some(true));
        assert_eq!(settings.breaks, None);
        assert_eq!(settings.extra_ignore_patterns, ["a+", "b+"]);
        assert_eq!(settings.task_lists_enabled, Some(false));
    }

    #[test]
    fn test_convert_block_and_inline() {
        let config = Config::default();
        assert_eq!(convert("# Title", &config, false).unwrap(), "<h1>Title</h1>");
        assert_eq!(convert("  *hi*  ", &config, true).unwrap(), "  <em>hi</em>  ");
    }

    #[test]
    fn test_convert_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdi.toml");
        fs::write(
            &path,
            "[markdown]\nignore_patterns = ['\\$\\w+']\n\n[code_block]\nlanguage_class_prefix = \"lang-\"\n",
        )
        .unwrap();
        let config = Config::load(Some(path.as_path()), None).unwrap();

        assert_eq!(
            convert("*$a_b*", &config, false).unwrap(),
            "<p><em>$a_b</em></p>"
        );
        assert_eq!(
            convert("```rs\nx\n```", &config, false).unwrap(),
            "<pre><code class=\"lang-rs\">x\n</code></pre>"
        );
    }

    #[test]
    fn test_convert_invalid_pattern() {
        let mut config = Config::default();
        config.markdown.ignore_patterns.push("(".to_owned());
        let err = convert("x", &config, false).unwrap_err();
        assert!(matches!(err, CliError::Ingest(_)));
    }
}
