//! The persisted index store: build, incremental update, change
//! detection, and on-disk (de)serialization.
//!
//! The store owns the in-memory [`MemoryIndex`] and its watcher-state
//! companion, mirroring both to JSON files after every mutating
//! operation. Writes go through a temp file plus rename so a crash
//! never leaves a half-written record.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use memlight_core::indexer::index_document;
use memlight_core::models::{MemoryIndex, WatcherState};
use memlight_core::search::{self, HotWindow, SearchHit, SearchOptions};

use crate::corpus;

const INDEX_FILE: &str = "index.json";
const WATCHER_FILE: &str = "watcher.json";

/// Counts reported by a build or incremental update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Files (re)indexed in this pass.
    pub indexed: usize,
    /// Unchanged files left untouched.
    pub skipped: usize,
    /// Indexed documents removed because their file disappeared.
    pub deleted: usize,
}

/// Point-in-time summary exposed by the `stats` command and endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub version: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub total_files: usize,
    pub total_chunks: usize,
    pub total_keywords: usize,
}

pub struct IndexStore {
    workspace: PathBuf,
    index_dir: PathBuf,
    index: MemoryIndex,
    watcher_state: WatcherState,
}

impl IndexStore {
    /// Open the store rooted at `workspace`, loading any persisted
    /// records from `index_dir_name` beneath it.
    ///
    /// Missing records initialize empty state. A record that fails to
    /// parse (corrupt, or an unsupported schema version) is logged and
    /// replaced with empty state; the next full build regenerates it.
    pub fn open(workspace: &Path, index_dir_name: &str) -> Result<Self> {
        let index_dir = workspace.join(index_dir_name);
        std::fs::create_dir_all(&index_dir)
            .with_context(|| format!("Failed to create: {}", index_dir.display()))?;

        let index = match load_record(&index_dir.join(INDEX_FILE))? {
            Some(raw) => match MemoryIndex::from_json(&raw) {
                Ok(index) => index,
                Err(e) => {
                    warn!("discarding persisted index: {e:#}");
                    MemoryIndex::empty()
                }
            },
            None => MemoryIndex::empty(),
        };

        let watcher_state = match load_record(&index_dir.join(WATCHER_FILE))? {
            Some(raw) => match WatcherState::from_json(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!("discarding persisted watcher state: {e:#}");
                    WatcherState::empty()
                }
            },
            None => WatcherState::empty(),
        };

        Ok(Self {
            workspace: workspace.to_path_buf(),
            index_dir,
            index,
            watcher_state,
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Build the index: full rebuild from scratch, or an incremental
    /// pass that reindexes only files whose mtime changed and prunes
    /// documents whose files disappeared.
    ///
    /// A single file failing to read is logged and skipped; it aborts
    /// neither the batch nor the final persist.
    pub fn build(&mut self, incremental: bool) -> Result<BuildReport> {
        let files = corpus::enumerate(&self.workspace)?;
        if !incremental {
            self.index = MemoryIndex::empty();
        }

        let mut report = BuildReport::default();

        for file in &files {
            if incremental {
                let unchanged = self
                    .index
                    .files
                    .get(&file.rel_path)
                    .is_some_and(|doc| doc.mtime == file.mtime);
                if unchanged {
                    report.skipped += 1;
                    continue;
                }
            }

            let text = match std::fs::read_to_string(&file.abs_path) {
                Ok(text) => text,
                Err(e) => {
                    warn!("skipping {}: {e}", file.rel_path);
                    continue;
                }
            };

            let (doc, postings) = index_document(&file.rel_path, file.mtime, file.size, &text);
            debug!("indexed {} ({} chunks)", file.rel_path, doc.chunks.len());
            self.index.insert_document(doc, postings);
            report.indexed += 1;
        }

        // Prune documents whose files no longer exist
        let live: Vec<&str> = files.iter().map(|f| f.rel_path.as_str()).collect();
        let stale: Vec<String> = self
            .index
            .files
            .keys()
            .filter(|path| !live.contains(&path.as_str()))
            .cloned()
            .collect();
        for path in stale {
            self.index.remove_document(&path);
            report.deleted += 1;
        }

        self.index.recompute_stats();
        self.index.touch();
        self.persist_index()?;

        info!(
            "index built: {} indexed, {} skipped, {} deleted ({} files, {} chunks, {} keywords)",
            report.indexed,
            report.skipped,
            report.deleted,
            self.index.stats.total_files,
            self.index.stats.total_chunks,
            self.index.stats.total_keywords,
        );
        Ok(report)
    }

    /// Compare current file mtimes against the recorded watcher state.
    ///
    /// Returns whether anything changed (modified, added, or removed).
    /// The recorded state is overwritten and persisted on every call,
    /// changed or not.
    pub fn check_for_changes(&mut self) -> Result<bool> {
        let files = corpus::enumerate(&self.workspace)?;
        let observed: BTreeMap<String, i64> = files
            .iter()
            .map(|f| (f.rel_path.clone(), f.mtime))
            .collect();

        let changed = observed != self.watcher_state.file_mtimes;

        self.watcher_state.file_mtimes = observed;
        self.watcher_state.last_check = Utc::now();
        self.persist_watcher_state()?;

        Ok(changed)
    }

    /// Rank the index against a query. Read-only.
    pub fn search(&self, query: &str, opts: &SearchOptions) -> Vec<SearchHit> {
        search::search(&self.index, query, opts, &HotWindow::current())
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            version: self.index.version.clone(),
            created_at: self.index.created_at,
            updated_at: self.index.updated_at,
            total_files: self.index.stats.total_files,
            total_chunks: self.index.stats.total_chunks,
            total_keywords: self.index.stats.total_keywords,
        }
    }

    #[cfg(test)]
    pub fn index(&self) -> &MemoryIndex {
        &self.index
    }

    fn persist_index(&self) -> Result<()> {
        write_atomic(&self.index_dir.join(INDEX_FILE), &self.index.to_json()?)
    }

    fn persist_watcher_state(&self) -> Result<()> {
        write_atomic(
            &self.index_dir.join(WATCHER_FILE),
            &self.watcher_state.to_json()?,
        )
    }
}

fn load_record(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    Ok(Some(raw))
}

/// Whole-file write via temp file + rename. Write failures propagate;
/// there is no partial-write mode.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).with_context(|| format!("Failed to write: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace: {}", path.display()))?;
    Ok(())
}
