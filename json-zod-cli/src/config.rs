//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `json-zod.toml` files
//! and merging with command-line arguments.

use crate::error::{CliResult, ConfigError};
use crate::merge::MergePrecedence;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "json-zod.toml";

/// Output label used when none is configured.
pub const DEFAULT_OUTPUT_LABEL: &str = "zod";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration.
    pub output: OutputConfig,

    /// Traversal settings.
    pub walk: WalkConfig,

    /// Property merge settings.
    pub merge: MergeConfig,

    /// External collaborator commands.
    pub commands: CommandsConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the generated tree. Empty means [`DEFAULT_OUTPUT_LABEL`].
    pub dir: PathBuf,

    /// Extension of generated files.
    pub extension: String,

    /// Remove generated files whose schema no longer exists.
    pub prune: bool,
}

/// Traversal configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Extension of schema files.
    pub extension: String,

    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub precedence: MergePrecedence,
}

/// Argument vectors for the external collaborators. The first element is the
/// program; the per-file argument is appended by the pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub resolver: Vec<String>,
    pub emitter: Vec<String>,
    pub formatter: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::new(),
            extension: "ts".to_string(),
            prune: false,
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
            skip_dirs: vec!["node_modules".to_string()],
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            resolver: argv(&["json-refs", "resolve"]),
            emitter: argv(&["json-schema-to-zod", "-n"]),
            formatter: argv(&["prettier", "--parser", "typescript"]),
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl OutputConfig {
    /// The effective output root, substituting the default label for an
    /// empty directory.
    pub fn root(&self) -> PathBuf {
        if self.dir.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_OUTPUT_LABEL)
        } else {
            self.dir.clone()
        }
    }
}

impl WalkConfig {
    /// Whether a directory with this name is skipped.
    pub fn is_skipped_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|skip| skip == name)
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Reject values that would only fail later, file by file.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        for (key, command) in [
            ("commands.resolver", &config.commands.resolver),
            ("commands.emitter", &config.commands.emitter),
            ("commands.formatter", &config.commands.formatter),
        ] {
            if command.first().map_or(true, |program| program.is_empty()) {
                return Err(ConfigError::invalid_value(key, "command must not be empty"));
            }
        }

        for (key, extension) in [
            ("walk.extension", &config.walk.extension),
            ("output.extension", &config.output.extension),
        ] {
            if extension.is_empty() {
                return Err(ConfigError::invalid_value(key, "extension must not be empty"));
            }
            if extension.starts_with('.') {
                return Err(ConfigError::invalid_value(
                    key,
                    "extension is written without a leading dot",
                ));
            }
        }

        Ok(())
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(prune) = args.prune {
            config.output.prune = prune;
        }

        if let Some(precedence) = args.precedence {
            config.merge.precedence = precedence;
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# json-zod configuration file

[output]
# Root of the generated tree; an empty value writes to "./zod"
dir = ""

# Extension of generated files
extension = "ts"

# Remove generated files whose source schema was deleted or renamed
prune = false

[walk]
# Extension of JSON Schema files
extension = "json"

# Directory names that are never descended into
skip_dirs = ["node_modules"]

[merge]
# Which side wins when `properties` and `extends.properties` share a key
# ("base" or "extends")
precedence = "base"

[commands]
# Resolves $ref pointers; the schema path is appended
resolver = ["json-refs", "resolve"]

# Generates the Zod validator; the declaration name is appended, schema on stdin
emitter = ["json-schema-to-zod", "-n"]

# Formats generated TypeScript from stdin
formatter = ["prettier", "--parser", "typescript"]
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Output directory override.
    pub output: Option<PathBuf>,

    /// Prune override.
    pub prune: Option<bool>,

    /// Merge precedence override.
    pub precedence: Option<MergePrecedence>,
}
