mod types;
mod operations;

pub use types::*;
pub use operations::*;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use serde::{Serialize, Deserialize};

use crate::types::SkipReason;

/// Cache of file hashes from previous scans
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanDatabase {
    /// Map of file paths to scan records
    files: BTreeMap<String, ScanRecord>,
}

impl ScanDatabase {
    /// Create a new empty scan database
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    /// Load a scan database from disk or create a new one if it doesn't exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading scan database from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open scan database {}", path.display()))?;
            let db: Self = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse scan database {}", path.display()))?;
            info!("Loaded scan database with {} entries", db.files.len());
            Ok(db)
        } else {
            info!("Creating new scan database");
            Ok(Self::new())
        }
    }

    /// Save the scan database to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        info!("Saving scan database to {}", path.display());
        let file = File::create(path)
            .with_context(|| format!("Failed to create scan database {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write scan database {}", path.display()))?;
        writer.flush()
            .with_context(|| format!("Failed to write scan database {}", path.display()))?;
        info!("Saved scan database with {} entries", self.files.len());
        Ok(())
    }

    /// Get the record for a file
    pub fn get(&self, path: &Path) -> Option<&ScanRecord> {
        self.files.get(path.to_string_lossy().as_ref())
    }

    /// Insert or replace the record for a file
    pub fn update(&mut self, record: ScanRecord) {
        let key = record.path.to_string_lossy().to_string();
        self.files.insert(key, record);
    }

    /// Record a file with the outcome of its scan
    pub fn update_with_reason(
        &mut self,
        path: &Path,
        hash: &str,
        failed: bool,
        reason: Option<SkipReason>,
    ) {
        if let Some(reason) = &reason {
            debug!("Recording {} ({})", path.display(), reason);
        }

        let name = path.file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        self.update(ScanRecord {
            name,
            path: path.to_path_buf(),
            hash: hash.to_string(),
            processed: !failed,
            timestamp: Utc::now().timestamp(),
        });
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Get statistics about the scan database
    pub fn stats(&self) -> ScanDatabaseStats {
        let total = self.files.len();
        let processed = self.files.values()
            .filter(|r| r.processed)
            .count();

        ScanDatabaseStats {
            total,
            processed,
            failed: total - processed,
        }
    }
}
