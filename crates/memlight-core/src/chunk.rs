//! Heading-based chunking for markdown notes.

use sha2::{Digest, Sha256};

/// A contiguous slice of a source document, split at markdown headings.
///
/// Line numbers are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChunk {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
    pub hash: String,
}

/// Truncated SHA-256 digest used to identify chunk content.
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let hex = format!("{digest:x}");
    hex[..8].to_string()
}

/// Split a document into chunks at markdown heading lines.
///
/// A line starting with `#` opens a new chunk, but only if the chunk
/// in progress has accumulated at least one line; leading headings and
/// consecutive headings therefore never produce empty chunks. The
/// final chunk runs to end of file. An empty document yields a single
/// empty chunk covering line 1.
pub fn chunk_text(text: &str) -> Vec<RawChunk> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start_line = 1usize;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        if line.starts_with('#') && !current.is_empty() {
            let body = current.join("\n");
            chunks.push(RawChunk {
                hash: content_hash(&body),
                text: body,
                start_line,
                end_line: line_no - 1,
            });
            current.clear();
            start_line = line_no;
        }
        current.push(line);
    }

    let body = current.join("\n");
    chunks.push(RawChunk {
        hash: content_hash(&body),
        text: body,
        start_line,
        end_line: lines.len(),
    });
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_without_headings() {
        let chunks = chunk_text("line one\nline two\nline three");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks[0].end_line, 3);
        assert_eq!(chunks[0].text, "line one\nline two\nline three");
    }

    #[test]
    fn test_heading_opens_new_chunk() {
        let chunks = chunk_text("intro\n# First\nbody a\n## Second\nbody b");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "intro");
        assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 1));
        assert_eq!(chunks[1].text, "# First\nbody a");
        assert_eq!((chunks[1].start_line, chunks[1].end_line), (2, 3));
        assert_eq!(chunks[2].text, "## Second\nbody b");
        assert_eq!((chunks[2].start_line, chunks[2].end_line), (4, 5));
    }

    #[test]
    fn test_leading_heading_does_not_create_empty_chunk() {
        let chunks = chunk_text("# Title\nbody");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "# Title\nbody");
    }

    #[test]
    fn test_consecutive_headings_each_start_chunks() {
        let chunks = chunk_text("# One\n# Two\nbody");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "# One");
        assert_eq!(chunks[1].text, "# Two\nbody");
    }

    #[test]
    fn test_empty_document_yields_one_chunk() {
        let chunks = chunk_text("");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "");
        assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 1));
    }

    #[test]
    fn test_hash_is_stable_and_truncated() {
        let a = content_hash("hello");
        let b = content_hash("hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert_ne!(a, content_hash("world"));
    }

    #[test]
    fn test_chunk_hash_matches_content() {
        let chunks = chunk_text("intro\n# Next\nbody");
        assert_eq!(chunks[0].hash, content_hash("intro"));
        assert_eq!(chunks[1].hash, content_hash("# Next\nbody"));
    }
}
