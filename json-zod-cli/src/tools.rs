//! External collaborators of the conversion pipeline.
//!
//! Reference resolution, Zod generation and formatting are delegated to
//! other programs (`json-refs`, `json-schema-to-zod` and `prettier` by
//! default). Each one sits behind a trait so the pipeline can be driven by
//! in-memory fakes in tests.

use crate::config::CommandsConfig;
use crate::error::{ConfigError, ToolError};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Inlines every `$ref` pointer of a schema document.
pub trait SchemaResolver {
    /// Return the resolved document text for the schema at `schema_path`.
    fn resolve(&self, schema_path: &Path) -> Result<String, ToolError>;
}

/// Translates a JSON Schema into validator source code.
pub trait TypeEmitter {
    /// Generate source for `schema`, declaring the validator as `name`.
    fn emit(&self, name: &str, schema: &str) -> Result<String, ToolError>;
}

/// Canonically formats generated source code.
pub trait CodeFormatter {
    fn format(&self, source: &str) -> Result<String, ToolError>;
}

/// The three collaborators used by one run.
pub struct Toolchain {
    pub resolver: Box<dyn SchemaResolver>,
    pub emitter: Box<dyn TypeEmitter>,
    pub formatter: Box<dyn CodeFormatter>,
}

impl Toolchain {
    /// Assemble a toolchain from arbitrary implementations.
    pub fn new(
        resolver: impl SchemaResolver + 'static,
        emitter: impl TypeEmitter + 'static,
        formatter: impl CodeFormatter + 'static,
    ) -> Self {
        Self {
            resolver: Box::new(resolver),
            emitter: Box::new(emitter),
            formatter: Box::new(formatter),
        }
    }

    /// Build the process-backed toolchain described by `[commands]`.
    pub fn from_config(commands: &CommandsConfig) -> Result<Self, ConfigError> {
        let resolver = ExternalCommand::from_argv("commands.resolver", &commands.resolver)?;
        let emitter = ExternalCommand::from_argv("commands.emitter", &commands.emitter)?;
        let formatter = ExternalCommand::from_argv("commands.formatter", &commands.formatter)?;

        Ok(Self::new(
            CommandResolver(resolver),
            CommandEmitter(emitter),
            CommandFormatter(formatter),
        ))
    }
}

impl std::fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolchain").finish_non_exhaustive()
    }
}

/// A program plus its fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a configured argument vector; the first element is the program.
    pub fn from_argv(key: &str, argv: &[String]) -> Result<Self, ConfigError> {
        match argv.split_first() {
            Some((program, args)) if !program.is_empty() => Ok(Self::new(program, args)),
            _ => Err(ConfigError::invalid_value(key, "command must not be empty")),
        }
    }

    /// Run with `extra` appended to the fixed arguments, feeding `input` on
    /// stdin, and return stdout.
    pub fn run(&self, extra: &[&str], input: Option<&str>) -> Result<String, ToolError> {
        debug!(program = %self.program, args = ?self.args, extra = ?extra, "running collaborator");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from its own thread; the child may fill its stdout pipe
        // before it has consumed all of its input.
        let feeder = match (child.stdin.take(), input) {
            (Some(mut stdin), Some(input)) => {
                let input = input.to_owned();
                Some(std::thread::spawn(move || stdin.write_all(input.as_bytes())))
            }
            _ => None,
        };

        let output = child.wait_with_output().map_err(|source| ToolError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if let Some(Ok(Err(e))) = feeder.map(|handle| handle.join()) {
            if e.kind() != ErrorKind::BrokenPipe {
                debug!(program = %self.program, error = %e, "failed to write stdin");
            }
        }

        if !output.status.success() {
            return Err(ToolError::Exit {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ToolError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}

/// Resolver backed by a command taking the schema path as its last argument.
#[derive(Debug, Clone)]
pub struct CommandResolver(pub ExternalCommand);

impl SchemaResolver for CommandResolver {
    fn resolve(&self, schema_path: &Path) -> Result<String, ToolError> {
        let path = schema_path.to_string_lossy();
        self.0.run(&[path.as_ref()], None)
    }
}

/// Emitter backed by a command taking the declaration name as its last
/// argument and the schema on stdin.
#[derive(Debug, Clone)]
pub struct CommandEmitter(pub ExternalCommand);

impl TypeEmitter for CommandEmitter {
    fn emit(&self, name: &str, schema: &str) -> Result<String, ToolError> {
        self.0.run(&[name], Some(schema))
    }
}

/// Formatter backed by a command filtering stdin to stdout.
#[derive(Debug, Clone)]
pub struct CommandFormatter(pub ExternalCommand);

impl CodeFormatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String, ToolError> {
        self.0.run(&[], Some(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_argv_splits_program() {
        let cmd = ExternalCommand::from_argv("k", &argv(&["prettier", "--parser", "typescript"]))
            .unwrap();
        assert_eq!(cmd, ExternalCommand::new("prettier", ["--parser", "typescript"]));
        assert_eq!(cmd.program, "prettier");
    }

    #[test]
    fn test_from_argv_rejects_empty() {
        assert!(matches!(
            ExternalCommand::from_argv("commands.emitter", &[]),
            Err(ConfigError::InvalidValue { key, .. }) if key == "commands.emitter"
        ));
        assert!(ExternalCommand::from_argv("k", &argv(&[""])).is_err());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let cmd = ExternalCommand::new("json-zod-test-no-such-program", Vec::<String>::new());
        let err = cmd.run(&[], None).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_pipes_stdin_to_stdout() {
        let formatter = CommandFormatter(ExternalCommand::new("cat", Vec::<String>::new()));
        let out = formatter.format("export const a = 1;\n").unwrap();
        assert_eq!(out, "export const a = 1;\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_appends_extra_argument() {
        let emitter = CommandEmitter(ExternalCommand::new("echo", ["-n"]));
        let out = emitter.emit("shape", "{}").unwrap();
        assert_eq!(out, "shape");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_captures_stderr() {
        let cmd = ExternalCommand::new("sh", ["-c", "echo broken >&2; exit 3"]);
        let err = cmd.run(&[], Some("ignored")).unwrap_err();
        match err {
            ToolError::Exit { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_large_input_does_not_deadlock() {
        let input = "x".repeat(1 << 20);
        let formatter = CommandFormatter(ExternalCommand::new("cat", Vec::<String>::new()));
        let out = formatter.format(&input).unwrap();
        assert_eq!(out.len(), input.len());
    }
}
