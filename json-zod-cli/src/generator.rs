//! Tree conversion: walk the input root and run the pipeline on every schema.
//!
//! Files are processed one at a time as the walker finds them. A failing
//! file is logged and recorded in the [`WalkReport`]; the walk carries on
//! with the next entry.

use crate::config::Config;
use crate::error::{CliResult, ConfigError, PipelineError};
use crate::pipeline::Pipeline;
use crate::prune::{encloses_input, prune_orphans};
use crate::tools::Toolchain;
use crate::walker::TreeWalker;
use crate::writer::{FileWriter, WriteResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Outcome of one tree conversion.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Artifacts written, or previewed in dry-run mode.
    pub results: Vec<WriteResult>,

    /// Files whose pipeline failed.
    pub failures: Vec<PipelineError>,

    /// Stale artifacts removed (or that would be removed in dry-run mode).
    pub pruned: Vec<PathBuf>,
}

impl WalkReport {
    /// Number of schema files the pipeline was attempted on.
    pub fn attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Paths of previewed artifacts whose file on disk is missing or differs.
    ///
    /// Only meaningful for dry-run reports.
    pub fn out_of_date(&self) -> Vec<&Path> {
        self.results
            .iter()
            .filter_map(|result| match result {
                WriteResult::DryRun { content, path } => {
                    match std::fs::read_to_string(path) {
                        Ok(existing) if existing == *content => None,
                        _ => Some(path.as_path()),
                    }
                }
                WriteResult::Written { .. } => None,
            })
            .collect()
    }
}

/// Converts a whole input tree.
#[derive(Debug)]
pub struct Generator {
    config: Config,
    toolchain: Toolchain,
    dry_run: bool,
    filter: Option<String>,
}

impl Generator {
    /// Create a generator with explicit collaborators.
    pub fn new(config: Config, toolchain: Toolchain) -> Self {
        Self {
            config,
            toolchain,
            dry_run: false,
            filter: None,
        }
    }

    /// Create a generator running the configured external commands.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let toolchain = Toolchain::from_config(&config.commands)?;
        Ok(Self::new(config, toolchain))
    }

    /// Preview artifacts instead of writing them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Only convert schema files matching a glob relative to the input root.
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert every schema file under `input_root`.
    ///
    /// Fails only when the input root cannot be read or the filter is invalid.
    pub fn run(&self, input_root: &Path) -> CliResult<WalkReport> {
        let mut walker = TreeWalker::from_config(input_root, &self.config);
        if let Some(ref pattern) = self.filter {
            walker = walker.with_filter(pattern)?;
        }

        let extension = self.config.output.extension.as_str();
        let pipeline = Pipeline::new(&self.toolchain, self.config.merge.precedence, extension);
        let writer = FileWriter::new(self.dry_run);

        let mut report = WalkReport::default();
        let mut expected = HashSet::new();

        walker.walk(|task| {
            expected.insert(task.output_path(extension));

            match pipeline.process(&task, &writer) {
                Ok(result) => {
                    match &result {
                        WriteResult::Written { path, bytes } => {
                            info!(bytes, "Successfully generated types in {}", path.display());
                        }
                        WriteResult::DryRun { path, .. } => {
                            info!("Would generate types in {}", path.display());
                        }
                    }
                    report.results.push(result);
                }
                Err(e) => {
                    error!(file = %e.file().display(), stage = e.stage(), "Error: {}", e);
                    report.failures.push(e);
                }
            }
        })?;

        if self.config.output.prune {
            report.pruned = self.prune(&walker, &expected, &writer);
        }

        Ok(report)
    }

    fn prune(
        &self,
        walker: &TreeWalker,
        expected: &HashSet<PathBuf>,
        writer: &FileWriter,
    ) -> Vec<PathBuf> {
        if walker.is_filtered() {
            warn!("Skipping pruning because a filter is active");
            return Vec::new();
        }
        if encloses_input(walker.output_root(), walker.root()) {
            warn!(
                output = %walker.output_root().display(),
                "Skipping pruning because the output root contains the input root"
            );
            return Vec::new();
        }

        prune_orphans(
            walker.output_root(),
            &self.config.output.extension,
            &self.config.walk,
            expected,
            writer,
        )
    }
}

/// Convert every schema under `input_root` into `output_root` using the
/// default external commands.
///
/// An empty `output_root` writes to `zod`, relative to the working directory.
pub fn generate_types(
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
) -> CliResult<WalkReport> {
    let mut config = Config::default();
    config.output.dir = output_root.as_ref().to_path_buf();

    Generator::from_config(config)?.run(input_root.as_ref())
}
