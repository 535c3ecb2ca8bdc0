use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Failure to turn a source file into a typed table.
///
/// `Clone` so a memoized outcome can be handed out more than once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("reading {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("unsupported file extension: .{extension} ({})", path.display())]
    Unsupported { path: PathBuf, extension: String },

    #[error("{}: missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}, row {row}: {message}", path.display())]
    Parse {
        path: PathBuf,
        row: usize,
        message: String,
    },
}

impl LoadError {
    /// Whether the backing file is simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// The decoded university is not one of the known keys.
    #[error("unknown university '{0}'")]
    Unresolved(String),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
