use std::path::Path;

use crate::types::SkipReason;
use super::ScanDatabase;

/// Check if a file has changed since it was last scanned
///
/// Files that failed last time always count as changed.
pub fn has_file_changed(
    db: &ScanDatabase,
    path: &Path,
    hash: &str,
) -> (bool, Option<SkipReason>) {
    match db.get(path) {
        Some(record) if record.processed && record.hash == hash => {
            (false, Some(SkipReason::Unchanged))
        }
        _ => (true, None),
    }
}
