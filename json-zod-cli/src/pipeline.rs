//! Per-file conversion pipeline.
//!
//! resolve → merge → emit → format → append type export → write.
//! Every stage depends on the previous one; the first failure ends the
//! pipeline for that file and nothing is written.

use crate::error::PipelineError;
use crate::merge::{merge_properties, MergePrecedence};
use crate::tools::Toolchain;
use crate::writer::{FileWriter, WriteResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One pending schema conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// Path of the schema file.
    pub schema_path: PathBuf,

    /// Schema file name without its extension; names the generated validator.
    pub name: String,

    /// Directory the artifact is written to.
    pub output_dir: PathBuf,
}

impl FileTask {
    /// Path of the artifact this task produces.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", self.name, extension))
    }
}

/// Generated source plus its type export, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

/// The line exporting the inferred type of the validator called `name`.
pub fn type_export_line(name: &str) -> String {
    format!("export type Z{name} = z.infer<typeof {name}>;\n")
}

/// Runs the conversion stages for one file at a time.
pub struct Pipeline<'a> {
    toolchain: &'a Toolchain,
    precedence: MergePrecedence,
    extension: &'a str,
}

impl<'a> Pipeline<'a> {
    pub fn new(toolchain: &'a Toolchain, precedence: MergePrecedence, extension: &'a str) -> Self {
        Self {
            toolchain,
            precedence,
            extension,
        }
    }

    /// Produce the artifact for `task` without touching the output tree.
    pub fn render(&self, task: &FileTask) -> Result<OutputArtifact, PipelineError> {
        let file = &task.schema_path;

        let resolved = self
            .toolchain
            .resolver
            .resolve(file)
            .map_err(|e| PipelineError::resolution(file.clone(), e.to_string()))?;
        let document: serde_json::Value = serde_json::from_str(&resolved).map_err(|e| {
            PipelineError::resolution(file.clone(), format!("resolver output is not JSON: {e}"))
        })?;

        let merged =
            merge_properties(&document, self.precedence).map_err(|source| PipelineError::Merge {
                file: file.clone(),
                source,
            })?;
        debug!(file = %file.display(), "merged properties");

        let emitted = self
            .toolchain
            .emitter
            .emit(&task.name, &merged.to_string())
            .map_err(|source| PipelineError::Emission {
                file: file.clone(),
                source,
            })?;

        let formatted = self
            .toolchain
            .formatter
            .format(&emitted)
            .map_err(|source| PipelineError::Format {
                file: file.clone(),
                source,
            })?;

        let mut content = formatted;
        content.push_str(&type_export_line(&task.name));

        Ok(OutputArtifact {
            name: task.name.clone(),
            path: task.output_path(self.extension),
            content,
        })
    }

    /// Render `task` and hand the artifact to `writer`.
    pub fn process(
        &self,
        task: &FileTask,
        writer: &FileWriter,
    ) -> Result<WriteResult, PipelineError> {
        let artifact = self.render(task)?;
        writer
            .write(&artifact.path, &artifact.content)
            .map_err(|source| PipelineError::Write {
                file: task.schema_path.clone(),
                source,
            })
    }
}

/// Build the task for a schema file found under `input_root`.
///
/// Returns `None` when `path` does not carry the schema extension or when
/// nothing would remain of its name once the extension is removed.
pub fn task_for(
    input_root: &Path,
    output_root: &Path,
    path: &Path,
    extension: &str,
) -> Option<FileTask> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    if name.is_empty() {
        return None;
    }

    let relative = path.strip_prefix(input_root).unwrap_or(path);
    let output_dir = match relative.parent() {
        Some(parent) => output_root.join(parent),
        None => output_root.to_path_buf(),
    };

    Some(FileTask {
        schema_path: path.to_path_buf(),
        name: name.to_string(),
        output_dir,
    })
}
