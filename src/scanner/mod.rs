
mod collector;
mod scanner;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use anyhow::{Context, Result};
use log::info;

use crate::database::ScanDatabase;
use crate::types::{FileSummary, ItemsFileResult, ItemsScannerConfig, ScanOutcome, ScanReport};

// Re-export scanner functionality
pub use scanner::{scan_with_config, scan, scan_file};

// Re-export collector functionality
pub use collector::collect_items_files;

/// Scanner for directories of items data files
pub struct ItemsScanner<'a> {
    /// Directory containing items data files to scan
    input_dir: &'a Path,
    /// Configuration options
    config: ItemsScannerConfig,
}

impl<'a> ItemsScanner<'a> {
    /// Create a new scanner with default configuration
    pub fn new(input_dir: &'a Path) -> Self {
        Self {
            input_dir,
            config: ItemsScannerConfig::default(),
        }
    }

    /// Create a new scanner with custom configuration
    pub fn with_config(input_dir: &'a Path, config: ItemsScannerConfig) -> Self {
        Self {
            input_dir,
            config,
        }
    }

    pub fn config(&self) -> &ItemsScannerConfig {
        &self.config
    }

    /// Scan items data files, consulting and updating `db` if given
    pub async fn scan(&self, db: Option<&mut ScanDatabase>) -> Result<ScanOutcome> {
        scanner::scan_with_config(self.input_dir, &self.config, db).await
    }
}

/// Count every item name across all loaded files
pub fn unique_items(results: &[ItemsFileResult]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    for data in results.iter().filter_map(|r| r.data.as_ref()) {
        for (_, item) in data.item_references() {
            let name = item.trim();
            if name.is_empty() {
                continue;
            }
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    counts
}

/// Summarise a scan for writing out as JSON
pub fn build_report(outcome: &ScanOutcome) -> ScanReport {
    let files = outcome.results
        .iter()
        .map(|result| {
            let (kits, kit_groups, items) = result.data
                .as_ref()
                .map(|d| (d.item_kits.len(), d.random_item_kit_groups.len(), d.item_count()))
                .unwrap_or_default();
            let (errors, warnings) = result.validation
                .as_ref()
                .map(|v| (v.error_count(), v.warning_count()))
                .unwrap_or_default();

            FileSummary {
                name: result.name.clone(),
                path: result.path.clone(),
                hash: result.hash.clone(),
                kits,
                kit_groups,
                items,
                errors,
                warnings,
                error: result.error.clone(),
            }
        })
        .collect();

    ScanReport {
        stats: outcome.stats.clone(),
        files,
        unique_items: unique_items(&outcome.results),
    }
}

/// Write a scan report as pretty JSON
pub fn save_report(report: &ScanReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    writer.flush()
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}
