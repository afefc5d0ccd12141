//! File watcher for development mode.
//!
//! This module provides file system watching functionality
//! to automatically regenerate types when schema files change.

use crate::config::WalkConfig;
use crate::error::{CliResult, WatchError};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// Quiet period before a batch of changes is reported.
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Event types for file changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A schema file was created or modified.
    Modified(PathBuf),
    /// A schema file was deleted.
    Deleted(PathBuf),
    /// An error occurred.
    Error(String),
}

/// File watcher for monitoring schema files.
pub struct FileWatcher {
    /// Root directory to watch.
    root: PathBuf,
    /// Which files are schemas and which directories are ignored.
    walk: WalkConfig,
}

impl FileWatcher {
    /// Create a new file watcher for the given directory.
    pub fn new(root: impl Into<PathBuf>, walk: WalkConfig) -> Self {
        Self {
            root: root.into(),
            walk,
        }
    }

    /// Start watching for file changes.
    ///
    /// Returns the debouncer, which must be kept alive while watching, and a
    /// receiver that yields watch events.
    pub fn watch(&self) -> CliResult<(Debouncer<RecommendedWatcher>, Receiver<WatchEvent>)> {
        let (tx, rx) = channel::<WatchEvent>();
        let walk = self.walk.clone();
        // Event paths are absolute even when the root was given relatively.
        let root = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone());

        let mut debouncer = new_debouncer(
            DEBOUNCE,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    for event in events {
                        let path = event.path;

                        if !is_schema_change(&walk, &root, &path) {
                            continue;
                        }

                        let watch_event = if path.exists() {
                            WatchEvent::Modified(path)
                        } else {
                            WatchEvent::Deleted(path)
                        };

                        let _ = tx.send(watch_event);
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            },
        )
        .map_err(|e| WatchError::Init(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::Notify(e.to_string()))?;

        Ok((debouncer, rx))
    }
}

/// Whether a change to `path` can affect the generated tree.
///
/// Only components below `root` are checked against the reserved directories.
fn is_schema_change(walk: &WalkConfig, root: &Path, path: &Path) -> bool {
    let is_schema = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(&format!(".{}", walk.extension)));

    let relative = path.strip_prefix(root).unwrap_or(path);
    is_schema
        && !relative.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| walk.is_skipped_dir(name))
        })
}

impl WatchEvent {
    /// Get the path associated with this event.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchEvent::Modified(p) | WatchEvent::Deleted(p) => Some(p),
            WatchEvent::Error(_) => None,
        }
    }

    /// Check if this is an error event.
    pub fn is_error(&self) -> bool {
        matches!(self, WatchEvent::Error(_))
    }

    /// Get the error message if this is an error event.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            WatchEvent::Error(msg) => Some(msg),
            _ => None,
        }
    }
}
