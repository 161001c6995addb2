use std::collections::BTreeMap;
use std::path::PathBuf;
use serde::{Serialize, Deserialize};

use crate::items::CommonItemsData;
use crate::validator::ValidationReport;

/// Default file extensions considered items data files
pub const DEFAULT_FILE_EXTENSIONS: &[&str] = &["json"];

/// Result of loading one items data file during a scan
#[derive(Debug, Clone)]
pub struct ItemsFileResult {
    /// File stem, e.g. `loadouts` for `loadouts.json`
    pub name: String,
    /// Path to the file
    pub path: PathBuf,
    /// Hex SHA-256 of the file content
    pub hash: String,
    /// Parsed data, if the file could be loaded
    pub data: Option<CommonItemsData>,
    /// Lint results, unless validation was skipped
    pub validation: Option<ValidationReport>,
    /// Why loading failed
    pub error: Option<String>,
}

impl ItemsFileResult {
    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }
}

/// Statistics about a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Total number of files found
    pub total: usize,
    /// Number of files loaded successfully
    pub processed: usize,
    /// Number of files that failed to load
    pub failed: usize,
    /// Number of files unchanged since the last scan
    pub unchanged: usize,
}

/// Reason why a file was skipped during scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File was unchanged since last scan
    Unchanged,
    /// File could not be read or hashed
    ReadFailed,
    /// File isn't valid items data
    ParseFailed,
    /// Other reason (with description)
    Other(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unchanged => write!(f, "Unchanged"),
            SkipReason::ReadFailed => write!(f, "Read failed"),
            SkipReason::ParseFailed => write!(f, "Parse failed"),
            SkipReason::Other(reason) => write!(f, "Other: {}", reason),
        }
    }
}

/// Configuration for scanning directories of items data files
#[derive(Debug, Clone)]
pub struct ItemsScannerConfig {
    /// Maximum number of threads to use for loading
    pub max_threads: usize,
    /// Whether to descend into subdirectories
    pub recursive: bool,
    /// Whether to reload files unchanged since the last scan
    pub force_rescan: bool,
    /// Whether to skip linting loaded files
    pub skip_validation: bool,
    /// File extensions to consider, lowercase, without the dot
    pub file_extensions: Vec<String>,
    /// Whether to draw a progress bar
    pub show_progress: bool,
}

impl Default for ItemsScannerConfig {
    fn default() -> Self {
        Self {
            max_threads: num_cpus::get(),
            recursive: true,
            force_rescan: false,
            skip_validation: false,
            file_extensions: DEFAULT_FILE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            show_progress: true,
        }
    }
}

/// Everything a scan produced
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Files that were loaded, or failed to load
    pub results: Vec<ItemsFileResult>,
    /// Files not loaded at all, and why
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub stats: ScanStats,
}

/// Per-file line of a scan report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub path: PathBuf,
    pub hash: String,
    pub kits: usize,
    pub kit_groups: usize,
    pub items: usize,
    pub errors: usize,
    pub warnings: usize,
    pub error: Option<String>,
}

/// Serializable summary of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub stats: ScanStats,
    pub files: Vec<FileSummary>,
    /// Every item name with the number of times it appears
    pub unique_items: BTreeMap<String, usize>,
}
