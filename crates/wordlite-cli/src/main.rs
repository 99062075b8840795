//! wordlite CLI
//!
//! Command-line interface for wordlite - rich-text documents and exports.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wordlite_core::{AsyncDocumentService, Config, DocumentService};

mod commands;
mod output;

use commands::export::{Destination, Source};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "wordlite")]
#[command(about = "wordlite - rich-text documents with plain text, HTML and DOCX export")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output to stderr (or the configured log file)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a document with the starter content
    New {
        /// Document name
        name: Option<String>,
    },
    /// Create a document from a content file or text
    #[command(alias = "add")]
    Create {
        /// Document name
        #[arg(short, long)]
        name: Option<String>,
        /// Content JSON file ("-" reads stdin)
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Plain text, one paragraph per line
        #[arg(short, long)]
        text: Option<String>,
    },
    /// List documents, most recently updated first
    #[command(alias = "ls")]
    List {
        /// Maximum number of documents
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Number of documents to skip
        #[arg(short, long, allow_negative_numbers = true)]
        offset: Option<i64>,
    },
    /// Show a document
    Show {
        /// Document ID (full UUID or prefix)
        id: String,
    },
    /// Rename a document or replace its content
    Update {
        /// Document ID (full UUID or prefix)
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// Content JSON file ("-" reads stdin)
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Plain text, one paragraph per line
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Delete a document
    #[command(alias = "rm")]
    Delete {
        /// Document ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Export a document to txt, html or page-document (docx)
    Export {
        /// Document ID (full UUID or prefix)
        #[arg(required_unless_present = "input", conflicts_with = "input")]
        id: Option<String>,
        /// Export a content JSON file instead of a stored document
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Title for --input exports (defaults to the file name)
        #[arg(short, long, requires = "input")]
        name: Option<String>,
        /// Output format: txt, html, page-document (aliases: text, htm, docx)
        #[arg(short, long, default_value = "page-document")]
        format: String,
        /// Output file or directory (defaults to the export directory)
        #[arg(short = 'O', long, conflicts_with = "stdout")]
        output: Option<PathBuf>,
        /// Write the rendered bytes to stdout
        #[arg(long)]
        stdout: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, cache_capacity, export_dir, log_file)
        key: String,
        /// Configuration value ("none" clears optional keys)
        value: String,
    },
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Commands that don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);
    debug!(data_dir = ?config.data_dir, "Loaded configuration");

    let service = AsyncDocumentService::new(
        DocumentService::open_with_config(config.clone()).context("Failed to open document store")?,
    );

    match cli.command {
        Commands::New { name } => commands::document::new(&service, name, &output).await,
        Commands::Create { name, file, text } => {
            commands::document::create(&service, name, file, text, &output).await
        }
        Commands::List { limit, offset } => {
            commands::document::list(&service, limit, offset, &output).await
        }
        Commands::Show { id } => commands::document::show(&service, id, &output).await,
        Commands::Update {
            id,
            name,
            file,
            text,
        } => commands::document::update(&service, id, name, file, text, &output).await,
        Commands::Delete { id, yes } => {
            commands::document::delete(&service, id, yes, &output).await
        }
        Commands::Export {
            id,
            input,
            name,
            format,
            output: target,
            stdout,
        } => {
            let source = match (id, input) {
                (_, Some(path)) => Source::File { path, name },
                (Some(id), None) => Source::Stored(id),
                (None, None) => anyhow::bail!("Give a document ID or --input"),
            };
            let destination = if stdout {
                Destination::Stdout
            } else {
                Destination::Path(target)
            };
            commands::export::export(&service, &config, source, &format, destination, &output)
                .await
        }
        Commands::Config { .. } => Ok(()), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
        Some(ConfigCommands::Path) => commands::config::path(config_path),
    }
}

/// Filter from RUST_LOG, or our crates at warn (debug with --verbose)
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(format!("wordlite_core={},wordlite_cli={}", level, level))
    })
}

/// Initialize logging to stderr, or to the configured log file
fn init_logging(config: &Config, verbose: bool) {
    if let Some(log_path) = &config.log_file {
        match File::options().create(true).append(true).open(log_path) {
            Ok(log_file) => {
                // Ignore error if already initialized
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(env_filter(verbose))
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(log_file))
                    .try_init();
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from(["wordlite", "export", "abc123", "-f", "html", "--stdout"])
            .unwrap();
        match cli.command {
            Commands::Export {
                id, format, stdout, ..
            } => {
                assert_eq!(id.as_deref(), Some("abc123"));
                assert_eq!(format, "html");
                assert!(stdout);
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_export_needs_a_source() {
        assert!(Cli::try_parse_from(["wordlite", "export"]).is_err());
        assert!(Cli::try_parse_from(["wordlite", "export", "--input", "doc.json"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["wordlite", "list", "--json", "--limit", "5"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::List {
                limit: Some(5),
                offset: None
            }
        ));
    }
}
