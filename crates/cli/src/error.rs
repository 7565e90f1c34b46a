//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The audit database does not exist.
    ///
    /// This typically means no console or script has been run yet.
    #[error("database not found at {path}. Run 'fieldguard console' first")]
    DatabaseNotFound { path: PathBuf },

    /// No data directory could be determined and none was configured.
    #[error("no data directory; set storage.path in fieldguard.toml")]
    NoDataDir,

    /// A console command could not be parsed.
    #[error("{0}")]
    Command(String),

    /// A script line could not be parsed.
    #[error("line {line}: {message}")]
    Script { line: usize, message: String },

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred in the runtime layer.
    #[error(transparent)]
    Runtime(#[from] runtime::Error),

    /// An error occurred in the storage layer.
    #[error(transparent)]
    Storage(#[from] storage::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
