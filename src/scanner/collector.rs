use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::debug;

use crate::types::ItemsScannerConfig;
use crate::utils::{find_files_by_extension, is_backup_file};

/// Collect items data files from a directory
///
/// The result is sorted and free of duplicates; backups left behind by
/// earlier saves are skipped.
pub fn collect_items_files(dir: &Path, config: &ItemsScannerConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!("Not a directory: {}", dir.display()));
    }

    let mut files = Vec::new();
    for extension in &config.file_extensions {
        files.extend(find_files_by_extension(dir, extension, config.recursive));
    }

    files.retain(|path| {
        let keep = !is_backup_file(path);
        if !keep {
            debug!("Skipping backup file {}", path.display());
        }
        keep
    });

    files.sort();
    files.dedup();

    Ok(files)
}
