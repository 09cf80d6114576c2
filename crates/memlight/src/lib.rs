//! # Memlight
//!
//! A lightweight, embedding-free search engine over a workspace of
//! markdown memory notes. Maintains a persisted inverted index with
//! BM25 scoring, incremental reindexing driven by file modification
//! times, synonym-expanded queries, and a hot-memory fast path that
//! favors recently-dated notes.
//!
//! The crate exposes:
//! - [`engine::Engine`] — the shared, lock-guarded index handle used by
//!   the CLI, HTTP server, and background watcher alike.
//! - [`watcher`] — a polling task that reindexes when files change.
//! - [`server`] — the JSON HTTP API (`/search`, `/update`, `/stats`,
//!   `/health`).

pub mod config;
pub mod corpus;
pub mod engine;
pub mod server;
pub mod store;
pub mod watcher;
