//! JSON persistence for [`CommonItemsData`]
//!
//! Files use the same layout the game's JSON loader reads:
//! `{"item_kits": [...], "random_item_kit_groups": [...]}`. Overwriting a file
//! copies the previous version aside first unless disabled in [`StoreOptions`].

mod types;

pub use types::*;

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::items::CommonItemsData;

/// One lock per file, so saves to the same file within this process never interleave
///
/// Entries are never removed; the table grows by one per distinct file saved
/// for the life of the process.
static FILE_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Key identifying `path` regardless of how it was spelled
///
/// Uses the canonical parent directory plus the file name. Falls back to the
/// path as given when the parent doesn't exist yet.
fn lock_key(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = FILE_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    locks
        .entry(lock_key(path))
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Parse items data from a JSON string
pub fn from_json_str(json: &str) -> Result<CommonItemsData, serde_json::Error> {
    // Editors on Windows like to prepend a BOM
    serde_json::from_str(json.trim_start_matches('\u{feff}'))
}

/// Serialize items data, four-space indented when `pretty`
pub fn to_json_vec(data: &CommonItemsData, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    if !pretty {
        return serde_json::to_vec(data);
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut serializer)?;
    Ok(buf)
}

/// Serialize items data to a string
pub fn to_json_string(data: &CommonItemsData, pretty: bool) -> Result<String, serde_json::Error> {
    let buf = to_json_vec(data, pretty)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Load items data from a JSON file
pub fn load_items_data(path: &Path) -> Result<CommonItemsData, StoreError> {
    debug!("Loading items data from {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let data = from_json_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "Loaded {} kits and {} kit groups from {}",
        data.item_kits.len(),
        data.random_item_kit_groups.len(),
        path.display()
    );

    Ok(data)
}

/// Load items data, or start from an empty instance if the file doesn't exist
pub fn load_or_default(path: &Path) -> Result<CommonItemsData, StoreError> {
    if path.exists() {
        load_items_data(path)
    } else {
        info!("{} does not exist, starting with empty items data", path.display());
        Ok(CommonItemsData::new())
    }
}

/// Path of the backup made for `path` at the current local time
///
/// `attempt` 0 gives `<path>.bak.<YYYYmmdd_HHMMSS>`; later attempts append
/// `_<attempt>` for backups taken within the same second.
pub fn backup_path_for(path: &Path, attempt: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".bak.{}", Local::now().format("%Y%m%d_%H%M%S")));
    if attempt > 0 {
        name.push(format!("_{}", attempt));
    }
    PathBuf::from(name)
}

/// Copy `path` aside with a timestamp suffix
///
/// Never overwrites an earlier backup.
pub fn create_backup(path: &Path) -> Result<PathBuf, StoreError> {
    let backup_err = |source| StoreError::Backup {
        path: path.to_path_buf(),
        source,
    };

    let mut source = File::open(path).map_err(backup_err)?;

    let mut attempt = 0;
    let (backup_path, mut target) = loop {
        let candidate = backup_path_for(path, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => break (candidate, file),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(backup_err(e)),
        }
    };

    io::copy(&mut source, &mut target)
        .and_then(|_| target.sync_all())
        .map_err(backup_err)?;

    info!("Backup created: {}", backup_path.display());
    Ok(backup_path)
}

/// Write items data to `path`
///
/// Returns the backup path when an existing file was copied aside. The new
/// content is written to a sibling temp file and renamed into place.
pub fn save_items_data(
    data: &CommonItemsData,
    path: &Path,
    options: &StoreOptions,
) -> Result<Option<PathBuf>, StoreError> {
    let lock = file_lock(path);
    let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

    let backup = if options.create_backup && path.exists() {
        Some(create_backup(path)?)
    } else {
        None
    };

    let mut content = to_json_vec(data, options.pretty).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    content.push(b'\n');

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, &content).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if let Err(source) = fs::rename(&tmp_path, path) {
        if let Err(e) = fs::remove_file(&tmp_path) {
            warn!("Failed to remove temp file {}: {}", tmp_path.display(), e);
        }
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    info!(
        "Saved {} kits and {} kit groups to {}",
        data.item_kits.len(),
        data.random_item_kit_groups.len(),
        path.display()
    );

    Ok(backup)
}
