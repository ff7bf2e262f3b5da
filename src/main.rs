//! # Document Registry CLI (`docreg`)
//!
//! The `docreg` binary is the primary interface for the registry. It
//! provides commands for store initialization, record ingestion, lookup,
//! keyword search, compliance alerting, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! docreg --config ./config/registry.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docreg init` | Create the backing store file |
//! | `docreg ingest <payload.json>` | Submit a record payload (use `-` for stdin) |
//! | `docreg get <id>` | Retrieve a stored record by id |
//! | `docreg list` | List the current snapshot |
//! | `docreg search "<query>"` | Rank records against a free-text query |
//! | `docreg alerts` | Evaluate compliance rules over the snapshot |
//! | `docreg serve http` | Start the JSON HTTP server |

mod codec;
mod compliance;
mod config;
mod error;
mod models;
mod search;
mod server;
mod store;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::store::DocumentStore;

/// Document registry CLI — durable metadata ingestion, keyword search with
/// citations, and rule-based compliance alerting over one collection.
#[derive(Parser)]
#[command(
    name = "docreg",
    about = "Document-metadata registry with keyword search and compliance alerting",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/registry.toml`; built-in defaults apply when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/registry.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the backing store file.
    ///
    /// Writes an empty collection (and the data directory) if nothing is
    /// there yet. Idempotent: an existing collection is left as is.
    Init,

    /// Submit a record payload.
    ///
    /// Reads a JSON payload from the given file (or stdin with `-`),
    /// validates it, persists it durably, and prints the stored record
    /// including the assigned id, version, and ingestion timestamp.
    Ingest {
        /// Path to the JSON payload, or `-` for stdin.
        payload: PathBuf,
    },

    /// Retrieve a stored record by its id.
    Get {
        /// Document identifier.
        id: String,
    },

    /// List all current records, ordered by id.
    List,

    /// Rank records against a free-text query.
    ///
    /// Prints matches ordered by score, recency, then id, with the
    /// matched field/value citations under each.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Evaluate compliance rules over the current snapshot.
    Alerts,

    /// Start the JSON HTTP server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Serve the registry API over HTTP.
    ///
    /// Binds to the address configured in `[server].bind`.
    Http,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::minimal()
    };

    let store = DocumentStore::load(&cfg.store.path)?;

    match cli.command {
        Commands::Init => {
            store.flush()?;
            println!(
                "store initialized at {} ({} record(s))",
                cfg.store.path.display(),
                store.len()
            );
        }
        Commands::Ingest { payload } => {
            let raw = read_payload(&payload)?;
            let value: serde_json::Value =
                serde_json::from_str(&raw).context("payload is not valid JSON")?;
            let record = codec::decode(&value)?;
            let stored = store.put(record)?;
            println!("document_id:  {}", stored.document_id);
            println!("version:      {}", stored.version);
            println!("status:       {:?}", stored.status);
            println!("ingested_at:  {}", stored.ingested_at.to_rfc3339());
        }
        Commands::Get { id } => {
            let record = store.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::List => {
            let snapshot = store.snapshot();
            for record in &snapshot {
                println!(
                    "{}  v{}  {}  {}",
                    record.document_id,
                    record.version,
                    record.document_type,
                    record.issuer.as_deref().unwrap_or("-")
                );
            }
            println!("{} record(s)", snapshot.len());
        }
        Commands::Search { query, limit } => {
            let snapshot = store.snapshot();
            search::run_search(
                &snapshot,
                &query,
                limit.unwrap_or(cfg.search.final_limit),
            )?;
        }
        Commands::Alerts => {
            let snapshot = store.snapshot();
            compliance::run_alerts(&snapshot, &cfg.compliance)?;
        }
        Commands::Serve { service } => match service {
            ServeService::Http => {
                server::run_server(&cfg, Arc::new(store)).await?;
            }
        },
    }

    Ok(())
}

fn read_payload(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload file: {}", path.display()))
    }
}
