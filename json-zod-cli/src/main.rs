//! # json-zod
//!
//! CLI tool for generating TypeScript Zod schemas from JSON Schema files.
//!
//! ## Usage
//!
//! ```bash
//! # Convert every schema under the current directory into ./zod
//! json-zod
//!
//! # Convert a specific tree into a specific output directory
//! json-zod --input ./schemas --output ./src/zod
//!
//! # Watch mode for development
//! json-zod --watch
//!
//! # Preview without writing, or remove outputs of deleted schemas
//! json-zod --dry-run
//! json-zod --prune
//!
//! # Initialize configuration
//! json-zod init
//!
//! # Verify generated files are up-to-date
//! json-zod check
//! ```

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use json_zod_cli::{
    config::{CliArgs, Config, ConfigManager},
    error::CliError,
    generator::Generator,
    merge::MergePrecedence,
    watcher::FileWatcher,
};

#[derive(Parser)]
#[command(name = "json-zod")]
#[command(author, version, about = "Generate TypeScript Zod schemas from JSON Schema files", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Input directory containing JSON Schema files
    #[arg(short, long, default_value = ".")]
    input: PathBuf,

    /// Output directory for generated TypeScript files (default: ./zod)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only convert schemas whose relative path matches this glob
    #[arg(long)]
    filter: Option<String>,

    /// Which side wins when `properties` and `extends.properties` share a key
    #[arg(long, value_name = "base|extends")]
    precedence: Option<MergePrecedence>,

    /// Preview changes without writing files
    #[arg(long)]
    dry_run: bool,

    /// Remove generated files whose schema no longer exists
    #[arg(long)]
    prune: bool,

    /// Watch for schema changes and regenerate
    #[arg(short, long)]
    watch: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new json-zod configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "json-zod.toml")]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Check that generated files are up-to-date
    Check {
        /// Input directory containing JSON Schema files
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Output directory holding the generated files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Which side wins when `properties` and `extends.properties` share a key
        #[arg(long, value_name = "base|extends")]
        precedence: Option<MergePrecedence>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            match e {
                CliError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the verbosity flags.
fn init_logging(verbose: &Verbosity<InfoLevel>) {
    const CRATES: &[&str] = &["json_zod_cli", "json_zod"];
    let level = verbose.tracing_level_filter();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let allowlist: Vec<String> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
        EnvFilter::new(format!("warn,{}", allowlist.join(",")))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        None => cmd_generate(cli.generate),
        Some(Commands::Init { output, force }) => cmd_init(output, force),
        Some(Commands::Check {
            input,
            output,
            config,
            precedence,
        }) => cmd_check(input, output, config, precedence),
    }
}

/// Load the config file and apply command-line overrides.
fn load_config(config_path: Option<&Path>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(config_path)?;
    Ok(ConfigManager::merge_cli_args(config, args))
}

/// Generate command implementation.
fn cmd_generate(args: GenerateArgs) -> Result<(), CliError> {
    let config = load_config(
        args.config.as_deref(),
        &CliArgs {
            output: args.output,
            prune: args.prune.then_some(true),
            precedence: args.precedence,
        },
    )?;

    let generator = Generator::from_config(config)?
        .with_dry_run(args.dry_run)
        .with_filter(args.filter);

    if args.watch {
        run_watch_mode(&args.input, &generator)
    } else {
        run_generate(&args.input, &generator)
    }
}

/// Run schema generation once.
fn run_generate(input: &Path, generator: &Generator) -> Result<(), CliError> {
    generator.run(input)?;
    Ok(())
}

/// Run in watch mode.
fn run_watch_mode(input: &Path, generator: &Generator) -> Result<(), CliError> {
    println!("{}", "Starting watch mode...".cyan());
    println!("  Watching: {}", input.display());
    println!("  Press Ctrl+C to stop\n");

    // Initial generation
    run_generate(input, generator)?;

    let watcher = FileWatcher::new(input, generator.config().walk.clone());
    let (_debouncer, rx) = watcher.watch()?;

    println!("\n{}", "Watching for changes...".cyan());

    while let Ok(event) = rx.recv() {
        if event.is_error() {
            println!(
                "{} {}",
                "Watch error:".red(),
                event.error_message().unwrap_or("Unknown error")
            );
            continue;
        }

        if let Some(path) = event.path() {
            println!("\n{} {}", "File changed:".cyan(), path.display());
        }

        // One regeneration covers the rest of the batch.
        while rx.try_recv().is_ok() {}

        if let Err(e) = run_generate(input, generator) {
            println!("{} {}", "Generation error:".red(), e);
        }

        println!("\n{}", "Watching for changes...".cyan());
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    let content = ConfigManager::default_config_content();
    std::fs::write(&output, content)?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Check command implementation.
fn cmd_check(
    input: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    precedence: Option<MergePrecedence>,
) -> Result<(), CliError> {
    println!("{}", "Checking generated files...".cyan());

    let mut config = load_config(
        config_path.as_deref(),
        &CliArgs {
            output,
            precedence,
            ..Default::default()
        },
    )?;
    config.output.prune = false;

    let report = Generator::from_config(config)?
        .with_dry_run(true)
        .run(&input)?;

    let stale = report.out_of_date();
    for path in &stale {
        println!("  {} {}", "✗".red(), path.display());
    }
    for failure in &report.failures {
        println!("  {} {}", "✗".red(), failure);
    }

    if stale.is_empty() && report.failures.is_empty() {
        println!("{} Generated files are up-to-date", "✓".green());
        Ok(())
    } else {
        println!("  Run 'json-zod' to update");
        Err(CliError::Validation(format!(
            "{} generated file(s) out of date, {} schema(s) failed",
            stale.len(),
            report.failures.len()
        )))
    }
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
