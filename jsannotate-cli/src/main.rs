//! jsannotate CLI - turns trigger lines into JSDoc comment blocks

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Logs go to stderr, results go to stdout

use anyhow::Context;
use clap::{Parser, Subcommand};
use jsannotate_core::config::{self, ResolvedConfig};
use jsannotate_core::position::LineEnding;
use jsannotate_core::render;
use jsannotate_core::{expand_path, handle_enter, Buffer, EditorPosition, FileExpansion};
use jsannotate_core::{KeystrokeOutcome, SignatureRecord};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsannotate")]
#[command(about = "Generate JSDoc comment blocks for JavaScript and TypeScript functions")]
#[command(version = env!("JSANNOTATE_VERSION"))]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate pressing Enter after a trigger snippet in a file
    Annotate {
        /// Path to the source file
        file: PathBuf,

        /// 1-based line holding the trigger snippet
        #[arg(long)]
        line: usize,

        /// 0-based cursor column (default: end of the trimmed line)
        #[arg(long)]
        column: Option<usize>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Write the edited file back
        #[arg(long)]
        write: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Expand every trigger line in a file or directory
    Expand {
        /// Path to source file or directory
        path: PathBuf,

        /// Write changed files back
        #[arg(long)]
        write: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Render a comment block for a hand-written signature
    Render {
        /// Comma-separated parameter names
        #[arg(long, value_delimiter = ',')]
        params: Vec<String>,

        /// Include a `@returns` line
        #[arg(long)]
        returns: bool,

        /// Indentation placed before every line
        #[arg(long, default_value = "")]
        indent: String,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Annotate {
            file,
            line,
            column,
            format,
            write,
            config: config_path,
        } => handle_annotate(&file, line, column, format, write, config_path.as_deref()),
        Commands::Expand {
            path,
            write,
            format,
            config: config_path,
        } => handle_expand(&path, write, format, config_path.as_deref()),
        Commands::Render {
            params,
            returns,
            indent,
        } => {
            let signature = SignatureRecord {
                name: None,
                params: params.into_iter().filter(|p| !p.trim().is_empty()).collect(),
                return_descriptor: returns.then(|| "value".to_string()),
            };
            print!("{}", render::render(&signature, &indent, LineEnding::Lf));
            Ok(())
        }
        Commands::Config { action } => handle_config(action),
    }
}

/// Logs go to stderr to keep stdout clean for text/JSON output
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_annotate(
    file: &Path,
    line: usize,
    column: Option<usize>,
    format: OutputFormat,
    write: bool,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    if line == 0 {
        anyhow::bail!("--line is 1-based");
    }

    let resolved_config = load_config(file, config_path)?;
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mut buffer = Buffer::new(text);

    let line_index = line - 1;
    let line_text = buffer.line(line_index).ok_or_else(|| {
        anyhow::anyhow!(
            "line {} is out of range ({} has {} lines)",
            line,
            file.display(),
            buffer.line_count()
        )
    })?;
    let column = column.unwrap_or_else(|| line_text.trim_end().chars().count());
    let mut cursor = EditorPosition::new(line_index, column);

    let outcome = handle_enter(
        &mut buffer,
        &mut cursor,
        &resolved_config.trigger_settings(),
        &file.to_string_lossy(),
    )?;

    let written = write && matches!(outcome, KeystrokeOutcome::Annotated { .. });
    if written {
        std::fs::write(file, buffer.text())
            .with_context(|| format!("failed to write {}", file.display()))?;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => match &outcome {
            KeystrokeOutcome::Ignored => {
                println!("No trigger at {}:{}:{}", file.display(), line, column);
            }
            KeystrokeOutcome::Declined { trigger } => {
                println!(
                    "Trigger {:?} at {}:{} is not directly above a function",
                    trigger,
                    file.display(),
                    line
                );
            }
            KeystrokeOutcome::Annotated { insertion, .. } => {
                println!(
                    "Insert before {}:{} (cursor {}:{}){}",
                    file.display(),
                    insertion.position.line + 1,
                    insertion.cursor.line + 1,
                    insertion.cursor.column,
                    if written { ", written" } else { "" }
                );
                print!("{}", insertion.text);
            }
        },
    }

    Ok(())
}

fn handle_expand(
    path: &Path,
    write: bool,
    format: OutputFormat,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let normalized_path = if path.is_relative() {
        std::env::current_dir()?.join(path)
    } else {
        path.to_path_buf()
    };
    if !normalized_path.exists() {
        anyhow::bail!("Path does not exist: {}", normalized_path.display());
    }

    let resolved_config = load_config(&normalized_path, config_path)?;
    let results = expand_path(&normalized_path, &resolved_config, write)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Text => print_expansions(&results, write),
    }

    Ok(())
}

fn print_expansions(results: &[FileExpansion], write: bool) {
    let mut annotated = 0;
    let mut declined = 0;
    for result in results {
        for entry in &result.expansion.entries {
            let status = if entry.annotated { "annotated" } else { "declined" };
            match &entry.function {
                Some(name) => println!(
                    "{}:{}: {} ({})",
                    result.path.display(),
                    entry.line,
                    status,
                    name
                ),
                None => println!("{}:{}: {}", result.path.display(), entry.line, status),
            }
        }
        annotated += result.expansion.annotated_count();
        declined += result.expansion.declined_count();
    }

    let changed = results.iter().filter(|r| r.changed()).count();
    println!(
        "{} annotated, {} declined, {} file(s) {}",
        annotated,
        declined,
        changed,
        if write { "written" } else { "would change" }
    );
}

fn handle_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Validate { path } => {
            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, path.as_deref());

            match resolved {
                Ok(config) => {
                    if let Some(ref p) = config.config_path {
                        println!("Config valid: {}", p.display());
                    } else {
                        println!("No config file found. Using defaults.");
                    }
                }
                Err(e) => {
                    eprintln!("Config validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Show { path } => {
            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, path.as_deref())
                .context("failed to load configuration")?;

            println!("Configuration:");
            if let Some(ref p) = resolved.config_path {
                println!("  Source: {}", p.display());
            } else {
                println!("  Source: defaults (no config file found)");
            }
            println!();
            println!("  enabled: {}", resolved.enabled);
            println!("  triggers: {}", resolved.triggers.join(" "));
            println!(
                "  include: {}",
                if resolved.include.is_some() {
                    "custom patterns"
                } else {
                    "all files"
                }
            );
            println!("  exclude: {}", exclude_summary(&resolved));
        }
    }

    Ok(())
}

/// Where the exclude patterns came from, followed by the patterns themselves
fn exclude_summary(resolved: &ResolvedConfig) -> String {
    let source = if resolved.custom_exclude {
        "custom patterns"
    } else {
        "defaults"
    };
    format!("{} ({})", source, resolved.exclude_patterns.join(", "))
}

/// Load configuration for the project containing `path`
fn load_config(path: &Path, config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = find_project_root(path);
    let resolved_config = config::load_and_resolve(&project_root, config_path)
        .context("failed to load configuration")?;

    if let Some(config_path) = &resolved_config.config_path {
        tracing::info!(config = %config_path.display(), "using config");
    }

    Ok(resolved_config)
}

/// Nearest ancestor holding a config file, a package.json or a .git directory
///
/// Falls back to the starting directory.
fn find_project_root(start_path: &Path) -> PathBuf {
    let start = if start_path.is_file() {
        start_path.parent().unwrap_or(start_path).to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    let markers = [
        ".jsannotaterc.json",
        "jsannotate.config.json",
        "package.json",
        ".git",
    ];
    let mut current = start.as_path();
    loop {
        if markers.iter().any(|m| current.join(m).exists()) {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return start,
        }
    }
}
