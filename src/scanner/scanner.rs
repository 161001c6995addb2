use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};
use log::{info, warn, debug};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::database::{ScanDatabase, has_file_changed};
use crate::store::load_items_data;
use crate::types::{ItemsFileResult, ItemsScannerConfig, ScanOutcome, ScanStats, SkipReason};
use crate::utils::compute_file_hash;
use crate::validator::validate_items_data;
use super::collector;

/// What happened to a single file
enum FileOutcome {
    Scanned(ItemsFileResult),
    Skipped(PathBuf, SkipReason),
}

fn file_name(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Load and optionally lint one items data file
///
/// Parse failures are recorded on the result rather than returned.
pub fn scan_file(path: &Path, hash: String, skip_validation: bool) -> ItemsFileResult {
    match load_items_data(path) {
        Ok(data) => {
            let validation = if skip_validation {
                None
            } else {
                Some(validate_items_data(&data))
            };
            ItemsFileResult {
                name: file_name(path),
                path: path.to_path_buf(),
                hash,
                data: Some(data),
                validation,
                error: None,
            }
        }
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            ItemsFileResult {
                name: file_name(path),
                path: path.to_path_buf(),
                hash,
                data: None,
                validation: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn scan_one(
    path: &Path,
    config: &ItemsScannerConfig,
    previous: Option<&ScanDatabase>,
) -> FileOutcome {
    let hash = match compute_file_hash(path) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("{:#}", e);
            return FileOutcome::Skipped(path.to_path_buf(), SkipReason::ReadFailed);
        }
    };

    if let Some(db) = previous {
        if let (false, Some(reason)) = has_file_changed(db, path, &hash) {
            debug!("Skipping {}: {}", path.display(), reason);
            return FileOutcome::Skipped(path.to_path_buf(), reason);
        }
    }

    FileOutcome::Scanned(scan_file(path, hash, config.skip_validation))
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress.set_message("Loading items data");
    progress
}

/// Load files in parallel on a dedicated rayon pool
fn load_files(
    files: &[PathBuf],
    config: &ItemsScannerConfig,
    previous: Option<&ScanDatabase>,
    progress: &ProgressBar,
) -> Result<Vec<FileOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_threads.max(1))
        .build()?;

    let outcomes = pool.install(|| {
        files.par_iter()
            .map(|path| {
                let outcome = scan_one(path, config, previous);
                progress.inc(1);
                outcome
            })
            .collect()
    });

    Ok(outcomes)
}

/// Scan a directory for items data files with configuration
///
/// With a database, files whose content hash matches the last successful scan
/// are skipped unless `force_rescan` is set, and the database is updated with
/// every file that was loaded or failed to load.
pub async fn scan_with_config(
    input_dir: &Path,
    config: &ItemsScannerConfig,
    mut db: Option<&mut ScanDatabase>,
) -> Result<ScanOutcome> {
    info!("Scanning for items data files in {}", input_dir.display());
    debug!("Configuration: {:?}", config);

    if !input_dir.exists() {
        return Err(anyhow!("Input directory does not exist: {}", input_dir.display()));
    }

    if let Err(e) = std::fs::read_dir(input_dir) {
        return Err(anyhow!("Input directory is not readable: {} - {}", input_dir.display(), e));
    }

    let files = collector::collect_items_files(input_dir, config)?;

    if files.is_empty() {
        warn!("No items data files found in {}", input_dir.display());
        return Ok(ScanOutcome::default());
    }

    info!("Found {} items data files", files.len());

    let previous = if config.force_rescan {
        None
    } else {
        db.as_deref().cloned()
    };

    let progress = progress_bar(files.len(), config.show_progress);
    let task_files = files.clone();
    let task_config = config.clone();
    let task_progress = progress.clone();

    let outcomes = tokio::task::spawn_blocking(move || {
        load_files(&task_files, &task_config, previous.as_ref(), &task_progress)
    })
    .await
    .context("Items data loading task failed")??;

    let mut outcome = ScanOutcome {
        stats: ScanStats {
            total: files.len(),
            ..Default::default()
        },
        ..Default::default()
    };

    for file_outcome in outcomes {
        match file_outcome {
            FileOutcome::Scanned(result) => {
                if result.is_loaded() {
                    outcome.stats.processed += 1;
                } else {
                    outcome.stats.failed += 1;
                }
                if let Some(db) = db.as_deref_mut() {
                    let reason = (!result.is_loaded()).then_some(SkipReason::ParseFailed);
                    db.update_with_reason(&result.path, &result.hash, !result.is_loaded(), reason);
                }
                outcome.results.push(result);
            }
            FileOutcome::Skipped(path, reason) => {
                match reason {
                    SkipReason::Unchanged => outcome.stats.unchanged += 1,
                    _ => outcome.stats.failed += 1,
                }
                outcome.skipped.push((path, reason));
            }
        }
    }

    progress.finish_with_message(format!(
        "Loaded {} files ({} failed, {} unchanged)",
        outcome.stats.processed, outcome.stats.failed, outcome.stats.unchanged
    ));

    info!(
        "Scan complete: {} total, {} loaded, {} failed, {} unchanged",
        outcome.stats.total, outcome.stats.processed, outcome.stats.failed, outcome.stats.unchanged
    );

    Ok(outcome)
}

/// Scan items data files with default configuration and no database
pub async fn scan(input_dir: &Path) -> Result<ScanOutcome> {
    let config = ItemsScannerConfig::default();
    scan_with_config(input_dir, &config, None).await
}
