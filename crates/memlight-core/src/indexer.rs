//! Turns a document's text into its index entry and postings.

use std::collections::BTreeMap;

use crate::chunk::chunk_text;
use crate::keywords::{extract_keywords, occurrence_count};
use crate::models::{Chunk, IndexDocument, Posting};

const PREVIEW_CHARS: usize = 200;

fn preview_of(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// Index a single document: chunk it, extract keywords, and count
/// per-chunk term occurrences.
///
/// Returns the document entry plus the `(term, posting)` pairs to merge
/// into the inverted map. The caller owns merge semantics (replacement
/// of stale postings, duplicate suppression).
pub fn index_document(
    path: &str,
    mtime: i64,
    size: u64,
    text: &str,
) -> (IndexDocument, Vec<(String, Posting)>) {
    let mut chunks = Vec::new();
    let mut postings = Vec::new();

    for raw in chunk_text(text) {
        let lower = raw.text.to_lowercase();
        let keywords = extract_keywords(&raw.text);

        let mut keyword_freq = BTreeMap::new();
        for term in &keywords {
            let freq = occurrence_count(&lower, term).max(1);
            keyword_freq.insert(term.clone(), freq);
            postings.push((
                term.clone(),
                Posting {
                    file: path.to_string(),
                    hash: raw.hash.clone(),
                    freq,
                },
            ));
        }

        chunks.push(Chunk {
            hash: raw.hash,
            start_line: raw.start_line,
            end_line: raw.end_line,
            length: raw.text.chars().count(),
            preview: preview_of(&raw.text),
            text: raw.text,
            keywords,
            keyword_freq,
        });
    }

    let doc = IndexDocument {
        path: path.to_string(),
        mtime,
        size,
        chunks,
    };
    (doc, postings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_fields_populated() {
        let (doc, _) = index_document("memory/a.md", 1_700_000_000_000, 42, "hello world");
        assert_eq!(doc.path, "memory/a.md");
        assert_eq!(doc.mtime, 1_700_000_000_000);
        assert_eq!(doc.size, 42);
        assert_eq!(doc.chunks.len(), 1);
        assert_eq!(doc.chunks[0].text, "hello world");
        assert_eq!(doc.chunks[0].length, 11);
    }

    #[test]
    fn test_postings_carry_occurrence_counts() {
        let (doc, postings) = index_document("memory/a.md", 0, 0, "user said user again");
        let user = postings
            .iter()
            .find(|(term, _)| term == "user")
            .map(|(_, p)| p)
            .unwrap();
        assert_eq!(user.freq, 2);
        assert_eq!(user.hash, doc.chunks[0].hash);
        assert_eq!(doc.chunks[0].keyword_freq["user"], 2);
    }

    #[test]
    fn test_one_posting_per_keyword_per_chunk() {
        let (_, postings) = index_document("memory/a.md", 0, 0, "alpha\n# Two\nalpha beta");
        let alpha: Vec<_> = postings.iter().filter(|(t, _)| t == "alpha").collect();
        assert_eq!(alpha.len(), 2, "one posting per chunk containing the term");
        let beta: Vec<_> = postings.iter().filter(|(t, _)| t == "beta").collect();
        assert_eq!(beta.len(), 1);
    }

    #[test]
    fn test_preview_truncated_at_200_chars() {
        let text = "x".repeat(250);
        let (doc, _) = index_document("memory/long.md", 0, 0, &text);
        let preview = &doc.chunks[0].preview;
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));

        let (short, _) = index_document("memory/short.md", 0, 0, "tiny");
        assert_eq!(short.chunks[0].preview, "tiny");
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let (doc, _) = index_document("memory/cjk.md", 0, 0, "记忆文档");
        assert_eq!(doc.chunks[0].length, 4);
    }

    #[test]
    fn test_empty_document_indexes_cleanly() {
        let (doc, postings) = index_document("memory/empty.md", 0, 0, "");
        assert_eq!(doc.chunks.len(), 1);
        assert!(doc.chunks[0].keywords.is_empty());
        assert!(postings.is_empty());
    }
}
