//! Removal of generated files whose schema no longer exists.

use crate::config::WalkConfig;
use crate::writer::FileWriter;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Remove every file under `output_root` with `extension` that is not in
/// `expected`.
///
/// Directories reserved by `walk` are left alone. Returns the removed paths,
/// or the paths that would be removed when `writer` is a dry run.
pub fn prune_orphans(
    output_root: &Path,
    extension: &str,
    walk: &WalkConfig,
    expected: &HashSet<PathBuf>,
    writer: &FileWriter,
) -> Vec<PathBuf> {
    if !output_root.is_dir() {
        return Vec::new();
    }

    let mut pruned = Vec::new();
    let entries = WalkDir::new(output_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || entry
                    .file_name()
                    .to_str()
                    .map_or(true, |name| !walk.is_skipped_dir(name))
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file());

    for entry in entries {
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != extension) || expected.contains(path) {
            continue;
        }

        match writer.remove(path) {
            Ok(true) => {
                info!(file = %path.display(), "Removed stale output");
                pruned.push(path.to_path_buf());
            }
            Ok(false) => {
                info!(file = %path.display(), "Would remove stale output");
                pruned.push(path.to_path_buf());
            }
            Err(e) => warn!(error = %e, "Failed to remove stale output"),
        }
    }

    pruned
}

/// Whether `output_root` contains `input_root` (or is the same directory).
///
/// Pruning such a tree would delete files that were never generated.
pub fn encloses_input(output_root: &Path, input_root: &Path) -> bool {
    match (output_root.canonicalize(), input_root.canonicalize()) {
        (Ok(output), Ok(input)) => input.starts_with(output),
        _ => false,
    }
}
