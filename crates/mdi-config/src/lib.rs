//! Configuration management for mdi.
//!
//! Parses `mdi.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [markdown]
//! html = true
//! linkify = false
//! breaks = false
//! ignore_patterns = ['\{\{[^}]*\}\}']
//!
//! [code_block]
//! language_class_prefix = "language-"
//!
//! [task_list]
//! enabled = true
//! ```

use std::path::{Path, PathBuf};

use mdi_core::{Editor, MarkdownOptions, standard_editor};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override raw HTML passthrough.
    pub html: Option<bool>,
    /// Override bare URL linking.
    pub linkify: Option<bool>,
    /// Override soft break rendering.
    pub breaks: Option<bool>,
    /// Ignore patterns appended to the configured ones.
    pub extra_ignore_patterns: Vec<String>,
    /// Override task list support.
    pub task_lists_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdi.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown rendering configuration.
    pub markdown: MarkdownConfig,
    /// Code block configuration.
    pub code_block: CodeBlockConfig,
    /// Task list configuration.
    pub task_list: TaskListConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Pass raw HTML through.
    pub html: bool,
    /// Turn bare URLs into links.
    pub linkify: bool,
    /// Render soft line breaks as `<br>`.
    pub breaks: bool,
    /// Regular expressions whose matches are kept verbatim.
    pub ignore_patterns: Vec<String>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        let defaults = MarkdownOptions::default();
        Self {
            html: defaults.html,
            linkify: defaults.linkify,
            breaks: defaults.breaks,
            ignore_patterns: defaults.ignore_regex,
        }
    }
}

/// Code block configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CodeBlockConfig {
    /// Class prefix for fenced code languages.
    pub language_class_prefix: String,
}

impl Default for CodeBlockConfig {
    fn default() -> Self {
        Self {
            language_class_prefix: "language-".to_owned(),
        }
    }
}

/// Task list configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TaskListConfig {
    /// Whether `- [ ]` items become task items.
    pub enabled: bool,
}

impl Default for TaskListConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdi.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };
        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(html) = settings.html {
            self.markdown.html = html;
        }
        if let Some(linkify) = settings.linkify {
            self.markdown.linkify = linkify;
        }
        if let Some(breaks) = settings.breaks {
            self.markdown.breaks = breaks;
        }
        self.markdown
            .ignore_patterns
            .extend(settings.extra_ignore_patterns.iter().cloned());
        if let Some(enabled) = settings.task_lists_enabled {
            self.task_list.enabled = enabled;
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_markdown()?;
        self.validate_code_block()?;
        Ok(())
    }

    fn validate_markdown(&self) -> Result<(), ConfigError> {
        for (index, pattern) in self.markdown.ignore_patterns.iter().enumerate() {
            if pattern.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "markdown.ignore_patterns[{index}] cannot be empty"
                )));
            }
        }
        Ok(())
    }

    fn validate_code_block(&self) -> Result<(), ConfigError> {
        let prefix = &self.code_block.language_class_prefix;
        if prefix
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>'))
        {
            return Err(ConfigError::Validation(format!(
                "code_block.language_class_prefix contains characters not allowed in a class name: {prefix:?}"
            )));
        }
        Ok(())
    }

    /// Options for [`mdi_core::MarkdownParser`].
    #[must_use]
    pub fn markdown_options(&self) -> MarkdownOptions {
        MarkdownOptions {
            html: self.markdown.html,
            linkify: self.markdown.linkify,
            breaks: self.markdown.breaks,
            ignore_regex: self.markdown.ignore_patterns.clone(),
        }
    }

    /// Standard editor with extension options taken from this configuration.
    #[must_use]
    pub fn editor(&self) -> Editor {
        let mut editor = standard_editor();
        let extensions = editor.extensions_mut();
        if let Some(options) = extensions
            .get_mut("codeBlock")
            .and_then(|code_block| code_block.options_mut().as_object_mut())
        {
            options.insert(
                "languageClassPrefix".to_owned(),
                serde_json::Value::String(self.code_block.language_class_prefix.clone()),
            );
        }
        if !self.task_list.enabled {
            extensions.remove("taskList");
            extensions.remove("taskItem");
        }
        editor
    }
}
