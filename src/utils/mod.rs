use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Find all files with a specific extension, compared case-insensitively
pub fn find_files_by_extension(dir: &Path, extension: &str, recursive: bool) -> Vec<PathBuf> {
    let extension = extension.to_lowercase();
    let mut walker = WalkDir::new(dir);
    if !recursive {
        walker = walker.max_depth(1);
    }

    walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file() &&
            e.path().extension()
                .map(|ext| ext.to_string_lossy().to_lowercase() == extension)
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}

static BACKUP_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.bak\.\d{8}_\d{6}(_\d+)?$").expect("backup suffix pattern is valid")
});

/// Check if a path names a backup made before overwriting, e.g. `kits.json.bak.20240101_120000`
///
/// Only the suffix written by the store counts; `survivor.bak.json` is an ordinary file.
pub fn is_backup_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| BACKUP_SUFFIX.is_match(&name.to_string_lossy()))
        .unwrap_or(false)
}

/// Hex SHA-256 of a file's content
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let read = reader.read(&mut buf)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_files_by_extension() -> Result<()> {
        let temp_dir = tempdir()?;
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested)?;
        fs::write(temp_dir.path().join("a.json"), "{}")?;
        fs::write(temp_dir.path().join("b.JSON"), "{}")?;
        fs::write(temp_dir.path().join("notes.txt"), "")?;
        fs::write(nested.join("c.json"), "{}")?;

        assert_eq!(find_files_by_extension(temp_dir.path(), "json", true).len(), 3);
        assert_eq!(find_files_by_extension(temp_dir.path(), "json", false).len(), 2);
        Ok(())
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file(Path::new("dir/kits.json.bak.20240101_120000")));
        assert!(is_backup_file(Path::new("dir/kits.json.bak.20240101_120000_2")));
        assert!(!is_backup_file(Path::new("dir/kits.json")));
        assert!(!is_backup_file(Path::new("dir/survivor.bak.json")));
        assert!(!is_backup_file(Path::new("dir/kits.json.bak.old")));
    }

    #[test]
    fn test_compute_file_hash() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("empty.json");
        fs::write(&path, "")?;

        assert_eq!(
            compute_file_hash(&path)?,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(compute_file_hash(&temp_dir.path().join("missing.json")).is_err());
        Ok(())
    }
}
