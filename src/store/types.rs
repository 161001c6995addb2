use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing items data files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid items data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to back up {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options controlling how items data is written
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Copy an existing file aside before overwriting it
    pub create_backup: bool,
    /// Indent output with four spaces
    pub pretty: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            create_backup: true,
            pretty: true,
        }
    }
}
