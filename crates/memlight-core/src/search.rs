//! Query ranking: the hot-memory fast path and the full BM25 pass.
//!
//! Hot documents (dated today or yesterday, or the root summary file)
//! are scored first with a cheap literal-occurrence rule. If the top
//! hot score clears the threshold the BM25 pass is skipped entirely.

use std::collections::HashMap;

use serde::Serialize;

use crate::keywords::{extract_keywords, occurrence_count};
use crate::models::MemoryIndex;
use crate::synonyms;

pub const BM25_K1: f64 = 1.5;
pub const BM25_B: f64 = 0.75;
pub const HOT_SCORE_WEIGHT: f64 = 2.0;
pub const HOT_SCORE_THRESHOLD: f64 = 1.0;

/// Name of the always-hot summary file at the workspace root.
pub const SUMMARY_FILE: &str = "MEMORY.md";

/// One ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub preview: String,
    /// Accumulated score, rounded to four decimal places.
    pub score: f64,
    /// Query terms (post-expansion) that contributed, deduplicated,
    /// in match order.
    pub matched_keywords: Vec<String>,
    pub is_hot: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub top_k: usize,
    pub hot_first: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            hot_first: true,
        }
    }
}

/// The two calendar dates whose presence in a path marks a document hot.
#[derive(Debug, Clone)]
pub struct HotWindow {
    pub today: String,
    pub yesterday: String,
}

impl HotWindow {
    /// Window for the current local date.
    pub fn current() -> Self {
        let today = chrono::Local::now().date_naive();
        let yesterday = today - chrono::Days::new(1);
        Self {
            today: today.format("%Y-%m-%d").to_string(),
            yesterday: yesterday.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Whether a document path qualifies for the hot fast path.
pub fn is_hot_path(path: &str, window: &HotWindow) -> bool {
    path.contains(&window.today) || path.contains(&window.yesterday) || path.contains(SUMMARY_FILE)
}

/// Score accumulator keyed by `(path, chunk hash)`, preserving first-hit
/// insertion order so equal scores rank deterministically.
struct Accumulator {
    entries: Vec<Accum>,
    by_key: HashMap<(String, String), usize>,
}

struct Accum {
    path: String,
    hash: String,
    score: f64,
    matched: Vec<String>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    fn add(&mut self, path: &str, hash: &str, term: &str, score: f64) {
        let key = (path.to_string(), hash.to_string());
        let idx = match self.by_key.get(&key) {
            Some(&idx) => idx,
            None => {
                self.entries.push(Accum {
                    path: path.to_string(),
                    hash: hash.to_string(),
                    score: 0.0,
                    matched: Vec::new(),
                });
                let idx = self.entries.len() - 1;
                self.by_key.insert(key, idx);
                idx
            }
        };
        let entry = &mut self.entries[idx];
        entry.score += score;
        if !entry.matched.iter().any(|t| t == term) {
            entry.matched.push(term.to_string());
        }
    }

    fn top_score(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.score)
            .fold(0.0, f64::max)
    }

    /// Sort descending by score (stable, so insertion order breaks
    /// ties), truncate, and materialize hits.
    fn into_hits(mut self, index: &MemoryIndex, top_k: usize, is_hot: bool) -> Vec<SearchHit> {
        self.entries
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        self.entries.truncate(top_k);
        self.entries
            .into_iter()
            .filter_map(|e| {
                let chunk = index.resolve_chunk(&e.path, &e.hash)?;
                Some(SearchHit {
                    path: e.path,
                    start_line: chunk.start_line,
                    end_line: chunk.end_line,
                    preview: chunk.preview.clone(),
                    score: round4(e.score),
                    matched_keywords: e.matched,
                    is_hot,
                })
            })
            .collect()
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Rank the index against a query.
///
/// Returns an empty list for an empty corpus or a query from which no
/// keywords survive extraction. When `hot_first` is set and the best
/// hot-path score exceeds [`HOT_SCORE_THRESHOLD`], only hot results are
/// returned and the BM25 pass never runs.
pub fn search(
    index: &MemoryIndex,
    query: &str,
    opts: &SearchOptions,
    window: &HotWindow,
) -> Vec<SearchHit> {
    if index.files.is_empty() {
        return Vec::new();
    }
    let terms = extract_keywords(query);
    if terms.is_empty() {
        return Vec::new();
    }
    let expanded = synonyms::expand(&terms);

    if opts.hot_first {
        let hot = score_hot(index, &expanded, window);
        if hot.top_score() > HOT_SCORE_THRESHOLD {
            return hot.into_hits(index, opts.top_k, true);
        }
    }

    score_bm25(index, &expanded).into_hits(index, opts.top_k, false)
}

/// Literal-occurrence scoring over hot documents only: each occurrence
/// of an expanded term in a chunk's lower-cased text contributes the
/// fixed hot weight. No IDF, no length normalization.
fn score_hot(index: &MemoryIndex, expanded: &[String], window: &HotWindow) -> Accumulator {
    let mut acc = Accumulator::new();
    for (path, doc) in &index.files {
        if !is_hot_path(path, window) {
            continue;
        }
        for chunk in &doc.chunks {
            let lower = chunk.text.to_lowercase();
            for term in expanded {
                let count = occurrence_count(&lower, term);
                if count > 0 {
                    acc.add(path, &chunk.hash, term, count as f64 * HOT_SCORE_WEIGHT);
                }
            }
        }
    }
    acc
}

/// Full BM25 pass over the inverted index. The scoring unit is the
/// chunk: document frequency counts postings, document length is the
/// chunk's character length.
fn score_bm25(index: &MemoryIndex, expanded: &[String]) -> Accumulator {
    let total_chunks = index.stats.total_chunks as f64;
    let avg_len = index.avg_chunk_length();
    let mut acc = Accumulator::new();

    for term in expanded {
        let Some(postings) = index.keywords.get(term) else {
            continue;
        };
        let doc_freq = postings.len() as f64;
        let idf = ((total_chunks - doc_freq + 0.5) / (doc_freq + 0.5) + 1.0).ln();

        for posting in postings {
            let Some(chunk) = index.resolve_chunk(&posting.file, &posting.hash) else {
                continue;
            };
            let tf = posting.freq as f64;
            let len_norm = 1.0 - BM25_B + BM25_B * chunk.length as f64 / avg_len;
            let score = idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * len_norm);
            acc.add(&posting.file, &posting.hash, term, score);
        }
    }
    acc
}
