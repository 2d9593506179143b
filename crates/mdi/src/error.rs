//! CLI error types.

use mdi_config::ConfigError;
use mdi_core::IngestError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Ingest(#[from] IngestError),
}
