//! # Memlight CLI (`memlight`)
//!
//! Command-line interface for the Memlight note search engine.
//!
//! ## Usage
//!
//! ```bash
//! memlight --config ./memlight.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `memlight build` | Rebuild the index from scratch |
//! | `memlight update` | Incrementally reindex changed files |
//! | `memlight search "<query>"` | Search indexed notes |
//! | `memlight stats` | Show index statistics |
//! | `memlight check` | Run one change-detection pass |
//! | `memlight serve` | Start the HTTP server with the background watcher |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use memlight::config::load_config;
use memlight::engine::Engine;
use memlight::server::run_server;

/// Memlight — lightweight BM25 search over markdown memory notes.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file; a missing file falls back to built-in defaults
/// with the workspace taken from `MEMLIGHT_WORKSPACE` or the current
/// directory.
#[derive(Parser)]
#[command(
    name = "memlight",
    about = "Lightweight BM25 search over markdown memory notes",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./memlight.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from scratch.
    ///
    /// Discards any existing index, re-chunks and re-extracts keywords
    /// for every note in the corpus, and persists the result.
    Build,

    /// Incrementally reindex changed files.
    ///
    /// Files whose modification time is unchanged are skipped; removed
    /// files are pruned from the index.
    Update,

    /// Search indexed notes.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        top_k: Option<usize>,

        /// Skip the hot-memory fast path and always rank with BM25.
        #[arg(long)]
        no_hot: bool,
    },

    /// Show index statistics.
    Stats,

    /// Run one change-detection pass and report whether files changed.
    Check,

    /// Start the HTTP server with the background watcher.
    Serve {
        /// Override the configured bind address.
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Commands::Serve { bind: Some(bind) } = &cli.command {
        config.server.bind = bind.clone();
    }
    let engine = Engine::open(&config)?;

    match cli.command {
        Commands::Build => {
            let report = engine.build(false).await?;
            let stats = engine.stats().await;
            println!("build");
            println!("  indexed: {}", report.indexed);
            println!("  deleted: {}", report.deleted);
            print_stats_lines(&stats);
            println!("ok");
        }
        Commands::Update => {
            let report = engine.build(true).await?;
            let stats = engine.stats().await;
            println!("update");
            println!("  indexed: {}", report.indexed);
            println!("  skipped: {}", report.skipped);
            println!("  deleted: {}", report.deleted);
            print_stats_lines(&stats);
            println!("ok");
        }
        Commands::Search {
            query,
            top_k,
            no_hot,
        } => {
            let hot_first = if no_hot { Some(false) } else { None };
            let hits = engine.search(&query, top_k, hot_first).await;
            if hits.is_empty() {
                println!("no results");
            }
            for (rank, hit) in hits.iter().enumerate() {
                let tag = if hit.is_hot { " [hot]" } else { "" };
                println!(
                    "{}. {}:{}-{} (score {:.4}){}",
                    rank + 1,
                    hit.path,
                    hit.start_line,
                    hit.end_line,
                    hit.score,
                    tag
                );
                println!("   matched: {}", hit.matched_keywords.join(", "));
                println!("   {}", hit.preview.replace('\n', " "));
            }
        }
        Commands::Stats => {
            let stats = engine.stats().await;
            println!("index version: {}", stats.version);
            println!("created: {}", stats.created_at.to_rfc3339());
            println!("updated: {}", stats.updated_at.to_rfc3339());
            print_stats_lines(&stats);
        }
        Commands::Check => {
            let changed = engine.check_for_changes().await?;
            println!("{}", if changed { "changes detected" } else { "no changes" });
        }
        Commands::Serve { .. } => {
            run_server(&config, engine).await?;
        }
    }

    Ok(())
}

fn print_stats_lines(stats: &memlight::store::StatsSnapshot) {
    println!("  files: {}", stats.total_files);
    println!("  chunks: {}", stats.total_chunks);
    println!("  keywords: {}", stats.total_keywords);
}
