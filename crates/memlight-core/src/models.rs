//! Core data models for the persisted memory index.
//!
//! The index is a single JSON record: per-file documents with their
//! chunks, an inverted keyword map (term → postings), and derived
//! stats. Postings reference chunks by `(file path, content hash)`
//! rather than holding the chunk itself — chunk lists are replaced
//! wholesale whenever their document is reindexed, so a posting must
//! re-resolve its chunk at read time.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written to every persisted index record.
///
/// Loading rejects any other version rather than guessing at the
/// layout; the operator reruns a full build to regenerate.
pub const SCHEMA_VERSION: &str = "2.0";

/// One entry in a term's postings list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Relative path of the owning document.
    pub file: String,
    /// Content hash of the chunk this posting annotates.
    pub hash: String,
    /// Occurrences of the term within the chunk text.
    pub freq: u64,
}

/// A heading-delimited slice of a document, the unit BM25 scores against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Short content hash, the chunk's identity within its document.
    pub hash: String,
    /// 1-based first source line (inclusive).
    pub start_line: usize,
    /// 1-based last source line (inclusive).
    pub end_line: usize,
    /// The chunk's raw text. Retained so the hot-memory path can do
    /// literal substring matching against the full text.
    pub text: String,
    /// Text length in characters.
    pub length: usize,
    /// First 200 characters, with a `...` marker when truncated.
    pub preview: String,
    /// Deduplicated keywords extracted from the text.
    pub keywords: Vec<String>,
    /// Occurrence count per keyword within the chunk text.
    pub keyword_freq: BTreeMap<String, u64>,
}

/// Per-file index entry. Replaced wholesale whenever the file is
/// reindexed; chunks are never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Workspace-relative path, the document's unique key.
    pub path: String,
    /// Last-modified time in epoch milliseconds.
    pub mtime: i64,
    /// File size in bytes.
    pub size: u64,
    /// Ordered, contiguous, non-overlapping chunks.
    pub chunks: Vec<Chunk>,
}

/// Derived corpus totals, recomputed after every build or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_files: usize,
    pub total_chunks: usize,
    pub total_keywords: usize,
}

/// The whole persisted index: documents, inverted keyword map, stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryIndex {
    /// Schema version marker, checked on load.
    pub version: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Documents keyed by relative path.
    pub files: BTreeMap<String, IndexDocument>,
    /// Inverted index: term → postings.
    pub keywords: BTreeMap<String, Vec<Posting>>,
    pub stats: IndexStats,
}

impl MemoryIndex {
    /// A fresh, empty index stamped with the current time.
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            version: SCHEMA_VERSION.to_string(),
            created_at: now,
            updated_at: now,
            files: BTreeMap::new(),
            keywords: BTreeMap::new(),
            stats: IndexStats::default(),
        }
    }

    /// Insert (or replace) a document and its postings.
    ///
    /// Any postings referencing the document's previous chunks are
    /// removed first, so reindexing a changed file never leaves stale
    /// or duplicate entries. Postings arriving with a `(term, hash)`
    /// pair already present for this document are dropped — identical
    /// chunk text within one file hashes to the same identity, and the
    /// first chunk encountered wins.
    pub fn insert_document(&mut self, doc: IndexDocument, postings: Vec<(String, Posting)>) {
        self.remove_postings_for(&doc.path);
        let path = doc.path.clone();
        self.files.insert(path, doc);

        for (term, posting) in postings {
            let list = self.keywords.entry(term).or_default();
            let duplicate = list
                .iter()
                .any(|p| p.file == posting.file && p.hash == posting.hash);
            if !duplicate {
                list.push(posting);
            }
        }
    }

    /// Remove a document and prune every posting that referenced it.
    ///
    /// Returns `true` if the document existed.
    pub fn remove_document(&mut self, path: &str) -> bool {
        let existed = self.files.remove(path).is_some();
        if existed {
            self.remove_postings_for(path);
        }
        existed
    }

    fn remove_postings_for(&mut self, path: &str) {
        self.keywords.retain(|_, postings| {
            postings.retain(|p| p.file != path);
            !postings.is_empty()
        });
    }

    /// Re-resolve a posting's chunk by content hash.
    ///
    /// Hash collisions within a document are tolerated: the first
    /// chunk in document order wins.
    pub fn resolve_chunk(&self, path: &str, hash: &str) -> Option<&Chunk> {
        self.files
            .get(path)?
            .chunks
            .iter()
            .find(|c| c.hash == hash)
    }

    /// Recompute the derived totals from the current documents.
    pub fn recompute_stats(&mut self) {
        self.stats = IndexStats {
            total_files: self.files.len(),
            total_chunks: self.files.values().map(|d| d.chunks.len()).sum(),
            total_keywords: self.keywords.len(),
        };
    }

    /// Sum of all chunk text lengths (characters) across the corpus.
    pub fn total_chunk_length(&self) -> usize {
        self.files
            .values()
            .flat_map(|d| d.chunks.iter())
            .map(|c| c.length)
            .sum()
    }

    /// Mean chunk length, used for BM25 length normalization.
    pub fn avg_chunk_length(&self) -> f64 {
        if self.stats.total_chunks == 0 {
            return 1.0;
        }
        self.total_chunk_length() as f64 / self.stats.total_chunks as f64
    }

    /// Stamp the index as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize index")
    }

    /// Parse a persisted index record, rejecting unknown schema versions.
    pub fn from_json(raw: &str) -> Result<Self> {
        let index: MemoryIndex =
            serde_json::from_str(raw).context("failed to parse index record")?;
        if index.version != SCHEMA_VERSION {
            bail!(
                "unsupported index version '{}' (expected '{}'); run a full build to regenerate",
                index.version,
                SCHEMA_VERSION
            );
        }
        Ok(index)
    }
}

/// Change-detection state: last observed mtime per corpus file.
///
/// Owned exclusively by the change detector; never consulted for
/// ranking. Overwritten and persisted after every check, whether or
/// not a change was found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherState {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_check: DateTime<Utc>,
    /// Relative path → last observed mtime (epoch milliseconds).
    pub file_mtimes: BTreeMap<String, i64>,
}

impl WatcherState {
    pub fn empty() -> Self {
        Self {
            last_check: DateTime::<Utc>::UNIX_EPOCH,
            file_mtimes: BTreeMap::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize watcher state")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("failed to parse watcher state")
    }
}
