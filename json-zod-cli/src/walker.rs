//! Recursive discovery of JSON Schema files.
//!
//! The walker visits the input tree depth-first, skips reserved dependency
//! directories wherever they appear, and turns every schema file into a
//! [`FileTask`] whose output directory mirrors the file's position under the
//! input root.

use crate::config::{Config, WalkConfig};
use crate::error::{CliResult, ScanError};
use crate::pipeline::{task_for, FileTask};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walker over an input tree of schema files.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    /// Root directory to scan.
    root: PathBuf,

    /// Root of the mirrored output tree.
    output_root: PathBuf,

    /// Schema extension and reserved directory names.
    walk: WalkConfig,

    /// Optional glob filter pattern.
    filter: Option<glob::Pattern>,
}

impl TreeWalker {
    /// Create a walker with the default extension and reserved directories.
    pub fn new(root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_root: output_root.into(),
            walk: WalkConfig::default(),
            filter: None,
        }
    }

    /// Create a walker honouring the `[walk]` and `[output]` sections.
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            root: root.into(),
            output_root: config.output.root(),
            walk: config.walk.clone(),
            filter: None,
        }
    }

    /// Set a glob filter pattern for files.
    ///
    /// Only schema files whose path relative to the root matches are visited.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ScanError> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        self.filter = Some(glob_pattern);
        Ok(self)
    }

    /// Visit every schema file, calling `visit` as soon as each is found.
    ///
    /// Only a missing or unreadable root is an error. Entries below it that
    /// cannot be read are logged and skipped.
    pub fn walk<F>(&self, mut visit: F) -> CliResult<()>
    where
        F: FnMut(FileTask),
    {
        if !self.root.is_dir() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }
        std::fs::read_dir(&self.root).map_err(|source| ScanError::UnreadableRoot {
            path: self.root.clone(),
            source,
        })?;

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(task) = task_for(&self.root, &self.output_root, path, &self.walk.extension)
            else {
                continue;
            };

            if let Some(ref pattern) = self.filter {
                if !pattern.matches_path(self.relative_path(path)) {
                    debug!(file = %path.display(), "excluded by filter");
                    continue;
                }
            }

            visit(task);
        }

        Ok(())
    }

    /// Collect every task without running anything.
    pub fn tasks(&self) -> CliResult<Vec<FileTask>> {
        let mut tasks = Vec::new();
        self.walk(|task| tasks.push(task))?;
        Ok(tasks)
    }

    fn is_skipped(&self, entry: &walkdir::DirEntry) -> bool {
        let skipped = entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.walk.is_skipped_dir(name));
        if skipped {
            debug!(dir = %entry.path().display(), "skipping reserved directory");
        }
        skipped
    }

    /// Get the relative path from root.
    fn relative_path<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the output root.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Whether a filter restricts the walk.
    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }
}
