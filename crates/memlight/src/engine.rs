//! Shared engine handle: one index store behind a reader/writer lock.
//!
//! Searches and stats take the read lock; builds, updates, and change
//! checks take the write lock. The same handle is cloned into the CLI
//! path, every HTTP handler, and the background watcher, so foreground
//! queries and background reindexing never race.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

use memlight_core::search::{SearchHit, SearchOptions};

use crate::config::Config;
use crate::store::{BuildReport, IndexStore, StatsSnapshot};

#[derive(Clone)]
pub struct Engine {
    store: Arc<RwLock<IndexStore>>,
    defaults: SearchOptions,
}

impl Engine {
    /// Open the engine for the configured workspace, loading persisted
    /// state if present.
    pub fn open(config: &Config) -> Result<Self> {
        let store = IndexStore::open(&config.workspace, &config.index.dir)?;
        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            defaults: SearchOptions {
                top_k: config.index.top_k,
                hot_first: config.index.hot_first,
            },
        })
    }

    /// Rank the index against a query. `top_k` and `hot_first` fall
    /// back to the configured defaults when unset.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        hot_first: Option<bool>,
    ) -> Vec<SearchHit> {
        let opts = SearchOptions {
            top_k: top_k.unwrap_or(self.defaults.top_k),
            hot_first: hot_first.unwrap_or(self.defaults.hot_first),
        };
        self.store.read().await.search(query, &opts)
    }

    /// Full rebuild or incremental update; see [`IndexStore::build`].
    pub async fn build(&self, incremental: bool) -> Result<BuildReport> {
        self.store.write().await.build(incremental)
    }

    /// One change-detection pass; see [`IndexStore::check_for_changes`].
    pub async fn check_for_changes(&self) -> Result<bool> {
        self.store.write().await.check_for_changes()
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.store.read().await.stats_snapshot()
    }
}
