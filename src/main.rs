//! # dsi: document store ingest CLI
//!
//! Uploads local files and text to a remote vector document store and runs
//! queries against it.
//!
//! ## Usage
//!
//! ```bash
//! dsi --config ./config/dsi.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dsi upsert-file <dir>` | Upload every file under a directory |
//! | `dsi upsert <id> <text>` | Upload one text document |
//! | `dsi query "<prompt>"` | Return the top-k matching documents as JSON |
//! | `dsi check` | Validate the configuration |
//!
//! ## Examples
//!
//! ```bash
//! # Upload a notes directory as chat transcripts by ada, logging to a file
//! dsi upsert-file ./notes --source chat --author ada --log-file ~/.dsi/watcher.log
//!
//! # Ask a question
//! dsi query "where is the deploy runbook?" --top-k 5
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docstore_ingest::config;
use docstore_ingest::ingest::{self, UploadOptions};
use docstore_ingest::logging;
use docstore_ingest::models::{Source, UploadOutcome};
use docstore_ingest::progress::ProgressMode;
use docstore_ingest::DocstoreClient;

/// dsi: ingest local files and text into a remote vector document store.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with the server URL and bearer token.
#[derive(Parser)]
#[command(
    name = "dsi",
    about = "Ingest local files and text into a remote vector document store",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dsi.toml")]
    config: PathBuf,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Progress output on stderr: `human`, `json`, or `off`.
    /// Defaults to `human` when stderr is a terminal.
    #[arg(long, global = true)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload every file under a directory, with metadata.
    ///
    /// Symlinks are followed unless `[upload] follow_symlinks = false`.
    /// A failed file does not stop the rest; the command exits non-zero
    /// if any file failed.
    UpsertFile {
        /// Directory to upload.
        directory: PathBuf,

        /// Where the documents came from: `email`, `file`, or `chat`.
        #[arg(long, default_value = "file")]
        source: Source,

        /// Author recorded in each file's metadata.
        #[arg(long)]
        author: Option<String>,
    },

    /// Upload one piece of text under an explicit id.
    Upsert {
        /// Document id (re-using an id replaces the document).
        id: String,
        /// Document text.
        text: String,
    },

    /// Query the store and print the JSON response.
    Query {
        /// The query prompt.
        prompt: String,

        /// Number of results to request. Defaults to `[query] top_k`.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Validate the configuration and print the effective settings.
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_file.as_deref())?;

    let cfg = config::load_config(&cli.config)?;
    let client = DocstoreClient::new(&cfg).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::UpsertFile {
            directory,
            source,
            author,
        } => {
            let mode = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
            let reporter = mode.reporter();

            let mut options =
                UploadOptions::new(source).follow_symlinks(cfg.upload.follow_symlinks);
            if let Some(author) = author {
                options = options.author(author);
            }

            let report = ingest::upsert_file(&client, &directory, &options, reporter.as_ref())
                .with_context(|| format!("Failed to upload {}", directory.display()))?;

            println!(
                "{}: uploaded: {}, failed: {}",
                report.root.display(),
                report.uploaded(),
                report.failed()
            );
            for failure in report.failures() {
                if let UploadOutcome::Failed(error) = &failure.outcome {
                    eprintln!("  failed {}: {}", failure.relative_path, error);
                }
            }
            if !report.is_success() {
                bail!(
                    "{} of {} files failed to upload",
                    report.failed(),
                    report.files.len()
                );
            }
        }
        Commands::Upsert { id, text } => {
            client
                .upsert(&id, &text)
                .with_context(|| format!("Failed to upsert document '{}'", id))?;
            println!("uploaded {}", id);
        }
        Commands::Query { prompt, top_k } => {
            let top_k = top_k.unwrap_or(cfg.query.top_k);
            if top_k == 0 {
                bail!("--top-k must be >= 1");
            }
            let result = client
                .query_with_top_k(&prompt, top_k)
                .context("Query failed")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Check => {
            println!("config:       {}", cli.config.display());
            println!("server:       {}", client.base_url());
            println!("timeout_secs: {}", cfg.server.timeout_secs);
            println!("top_k:        {}", cfg.query.top_k);
            println!("symlinks:     {}", cfg.upload.follow_symlinks);
            println!("ok");
        }
    }

    Ok(())
}
