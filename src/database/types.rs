use std::path::PathBuf;
use serde::{Serialize, Deserialize};

/// What the last scan recorded about one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// File stem
    pub name: String,
    /// Path to the file
    pub path: PathBuf,
    /// Hex SHA-256 of the content at scan time
    pub hash: String,
    /// Whether the file loaded successfully
    pub processed: bool,
    /// Unix timestamp of the scan
    pub timestamp: i64,
}

/// Statistics about the scan database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDatabaseStats {
    /// Total number of files in the database
    pub total: usize,
    /// Number of files that loaded successfully
    pub processed: usize,
    /// Number of files that failed to load
    pub failed: usize,
}
