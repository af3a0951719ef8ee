//! CLI error types.

use std::path::PathBuf;

use pw_builder::BuildError;
use pw_config::ConfigError;
use pw_writer::WriteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Write(#[from] WriteError),

    #[error("{0}")]
    Validation(String),
}
