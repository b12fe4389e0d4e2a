//! # Haven CLI (`haven`)
//!
//! Command-line entry point for the mentor-matching pipeline: database
//! setup, mentor import, embedding refresh, live matching, and the HTTP
//! server.
//!
//! ## Usage
//!
//! ```bash
//! haven --config ./config/haven.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `haven init` | Create the SQLite database and run schema migrations |
//! | `haven import <file.json>` | Upsert mentors from a JSON array |
//! | `haven match "<query>"` | Print the match outcome as JSON |
//! | `haven embed mentor <id>` | Refresh one mentor's embedding |
//! | `haven embed all` | Refresh every mentor, pausing between calls |
//! | `haven embed pending` | Refresh only missing or stale embeddings |
//! | `haven summarize "<bio>"` | Print a one-line bio summary |
//! | `haven serve` | Start the HTTP server |
//!
//! Logs go to stderr (`--verbose` for debug, or `RUST_LOG`); command
//! results go to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use haven_match::config::{self, Config};
use haven_match::gemini::create_model;
use haven_match::matcher::Matcher;
use haven_match::refresh::Refresher;
use haven_match::sqlite_store::SqliteStore;
use haven_match::{db, import, migrate, server};
use haven_match_core::model::GenerativeModel;

/// Haven: match students with the mentors best placed to help them.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/haven.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "haven",
    about = "Haven: mentor matching for campus peer support",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/haven.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// Import mentors from a JSON file.
    ///
    /// The file holds an array of mentor objects. Mentors are upserted by
    /// ID; objects without an ID reuse the ID of a stored mentor with the
    /// same name, or get a fresh UUID.
    Import {
        /// Path to the JSON file.
        file: PathBuf,
    },

    /// Find the best mentors for a free-text query.
    Match {
        /// What the student needs help with.
        query: String,
    },

    /// Manage mentor embeddings.
    Embed {
        #[command(subcommand)]
        action: EmbedAction,
    },

    /// Summarize a mentor bio in one short sentence.
    Summarize {
        bio: String,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum EmbedAction {
    /// Refresh a single mentor's embedding.
    Mentor {
        /// Mentor ID.
        id: String,
    },

    /// Refresh every mentor, one at a time with `[refresh].delay_ms` between calls.
    All,

    /// Refresh mentors whose embedding is missing or stale.
    Pending {
        /// Show which mentors are pending without embedding anything.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Store and model handles built once per process.
struct Services {
    store: Arc<SqliteStore>,
    model: Arc<dyn GenerativeModel>,
}

impl Services {
    async fn open(cfg: &Config) -> Result<Self> {
        let pool = db::connect(cfg).await?;
        Ok(Self {
            store: Arc::new(SqliteStore::new(pool)),
            model: create_model(&cfg.model)?,
        })
    }

    fn matcher(&self, cfg: &Config) -> Matcher {
        Matcher::from_config(cfg, self.store.clone(), self.model.clone())
    }

    fn refresher(&self, cfg: &Config) -> Refresher {
        Refresher::from_config(cfg, self.store.clone(), self.model.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { file } => {
            let services = Services::open(&cfg).await?;
            let count = import::import_file(services.store.as_ref(), &file).await?;
            println!("imported {} mentors", count);
        }
        Commands::Match { query } => {
            let services = Services::open(&cfg).await?;
            let outcome = services.matcher(&cfg).find_best_mentor(&query).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Embed { action } => {
            let services = Services::open(&cfg).await?;
            let refresher = services.refresher(&cfg);

            match action {
                EmbedAction::Mentor { id } => {
                    let outcome = refresher.update_mentor_embedding(&id).await;
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
                EmbedAction::All => {
                    let report = refresher.refresh_all().await;
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                EmbedAction::Pending { dry_run: true } => {
                    let pending = refresher.find_pending().await?;
                    println!("embed pending (dry-run)");
                    println!("  mentors needing embeddings: {}", pending.len());
                    for mentor in &pending {
                        println!("  - {} ({})", mentor.name, mentor.id);
                    }
                }
                EmbedAction::Pending { dry_run: false } => {
                    let report = refresher.refresh_pending().await;
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
        }
        Commands::Summarize { bio } => {
            let services = Services::open(&cfg).await?;
            let summary = services.matcher(&cfg).generate_bio_summary(&bio).await;
            println!("{}", summary);
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
