//! Error types for the CLI.
//!
//! Two layers of errors exist. [`PipelineError`] describes why a single
//! schema file could not be converted; it is logged and the walk moves on.
//! [`CliError`] describes failures of the run itself (unreadable input root,
//! bad configuration, watcher failures) and aborts it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for run-level operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error during directory traversal.
    #[error("Failed to scan directory: {0}")]
    Scan(#[from] ScanError),

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error during file watching.
    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    /// Check failed (generated files out of date).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during directory traversal.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Input root does not exist or is not a directory.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Invalid filter pattern.
    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The input root could not be listed.
    #[error("Failed to read input root {path}: {source}")]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of one collaborator process.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program could not be started.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but reported failure.
    #[error("`{program}` exited with {}: {}", format_code(.code), .stderr.trim())]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Standard output was not valid UTF-8.
    #[error("`{program}` produced non UTF-8 output")]
    InvalidOutput { program: String },
}

/// Malformed document shape found while merging properties.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The resolved document is not a JSON object.
    #[error("resolved document is not an object (found {found})")]
    NotAnObject { found: &'static str },

    /// A section that must be an object holds another kind of value.
    #[error("`{section}` must be an object (found {found})")]
    InvalidSection {
        section: &'static str,
        found: &'static str,
    },
}

/// Why a single schema file could not be converted.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The resolver failed or returned something that is not JSON.
    #[error("Failed to resolve references in {file}: {message}")]
    Resolution { file: PathBuf, message: String },

    /// The resolved document has an unexpected shape.
    #[error("Failed to merge properties in {file}: {source}")]
    Merge {
        file: PathBuf,
        #[source]
        source: MergeError,
    },

    /// The type emitter failed.
    #[error("Failed to generate types for {file}: {source}")]
    Emission {
        file: PathBuf,
        #[source]
        source: ToolError,
    },

    /// The formatter failed.
    #[error("Failed to format generated code for {file}: {source}")]
    Format {
        file: PathBuf,
        #[source]
        source: ToolError,
    },

    /// The artifact could not be written.
    #[error("Failed to write output for {file}: {source}")]
    Write {
        file: PathBuf,
        #[source]
        source: WriteError,
    },
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a stale file.
    #[error("Failed to remove file {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error during file watching.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Failed to initialize watcher.
    #[error("Failed to initialize file watcher: {0}")]
    Init(String),

    /// Error from notify crate.
    #[error("Watch notification error: {0}")]
    Notify(String),
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl PipelineError {
    /// Create a resolution error.
    pub fn resolution(file: PathBuf, message: impl Into<String>) -> Self {
        Self::Resolution {
            file,
            message: message.into(),
        }
    }

    /// The schema file this error originated from.
    pub fn file(&self) -> &std::path::Path {
        match self {
            Self::Resolution { file, .. }
            | Self::Merge { file, .. }
            | Self::Emission { file, .. }
            | Self::Format { file, .. }
            | Self::Write { file, .. } => file,
        }
    }

    /// Short name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "resolve",
            Self::Merge { .. } => "merge",
            Self::Emission { .. } => "emit",
            Self::Format { .. } => "format",
            Self::Write { .. } => "write",
        }
    }
}

impl ScanError {
    /// Create a directory not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
