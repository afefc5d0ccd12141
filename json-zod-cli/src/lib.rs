//! # json-zod-cli
//!
//! CLI library for generating TypeScript Zod schemas from a tree of JSON
//! Schema files.
//!
//! Every `.json` file under the input root is run through a small pipeline:
//! its `$ref` pointers are resolved, `extends.properties` is merged into
//! `properties`, a Zod validator is generated and formatted, and a
//! `z.infer` type export is appended. The result lands in an output tree
//! mirroring the input tree.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`walker`] - Schema file discovery
//! - [`merge`] - `extends` property merging
//! - [`tools`] - External resolver, emitter and formatter
//! - [`pipeline`] - Per-file conversion
//! - [`generator`] - Whole-tree conversion and reporting
//! - [`writer`] - File output and dry-run support
//! - [`prune`] - Removal of stale generated files
//! - [`watcher`] - File system watching for development mode
//! - [`error`] - Error types and handling

pub mod config;
pub mod error;
pub mod generator;
pub mod merge;
pub mod pipeline;
pub mod prune;
pub mod tools;
pub mod walker;
pub mod watcher;
pub mod writer;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult, PipelineError};
pub use generator::{generate_types, Generator, WalkReport};
pub use merge::{merge_properties, MergePrecedence};
pub use pipeline::{FileTask, OutputArtifact, Pipeline};
pub use tools::{CodeFormatter, SchemaResolver, Toolchain, TypeEmitter};
pub use walker::TreeWalker;
pub use watcher::FileWatcher;
pub use writer::FileWriter;
