//! Corpus discovery: which files are eligible for indexing.
//!
//! The corpus is every `*.md` file directly inside the workspace's
//! `memory/` directory (no recursion), plus the top-level `MEMORY.md`
//! summary file when present. Paths are reported workspace-relative
//! with forward slashes so index keys stay portable.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use memlight_core::search::SUMMARY_FILE;

/// Subdirectory of the workspace that holds dated note files.
pub const MEMORY_DIR: &str = "memory";

/// One eligible source file with the metadata change detection needs.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    /// Workspace-relative path, the index key.
    pub rel_path: String,
    pub abs_path: PathBuf,
    /// Last-modified time in epoch milliseconds.
    pub mtime: i64,
    /// Size in bytes.
    pub size: u64,
}

fn mtime_millis(path: &Path) -> Result<i64> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat: {}", path.display()))?;
    let modified = metadata
        .modified()
        .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
    let millis = modified
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    Ok(millis)
}

/// Enumerate every eligible corpus file in deterministic order.
///
/// Creates the `memory/` directory if it does not exist yet, so a
/// fresh workspace indexes cleanly to an empty corpus.
pub fn enumerate(workspace: &Path) -> Result<Vec<CorpusFile>> {
    let memory_dir = workspace.join(MEMORY_DIR);
    if !memory_dir.exists() {
        std::fs::create_dir_all(&memory_dir)
            .with_context(|| format!("Failed to create: {}", memory_dir.display()))?;
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(&memory_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let metadata = entry.metadata()?;
        files.push(CorpusFile {
            rel_path: format!("{MEMORY_DIR}/{name}"),
            abs_path: path.to_path_buf(),
            mtime: mtime_millis(path)?,
            size: metadata.len(),
        });
    }

    let summary = workspace.join(SUMMARY_FILE);
    if summary.is_file() {
        let metadata = std::fs::metadata(&summary)?;
        files.push(CorpusFile {
            rel_path: SUMMARY_FILE.to_string(),
            abs_path: summary.clone(),
            mtime: mtime_millis(&summary)?,
            size: metadata.len(),
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_memory_dir_created_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = enumerate(dir.path()).unwrap();
        assert!(files.is_empty());
        assert!(dir.path().join(MEMORY_DIR).is_dir());
    }

    #[test]
    fn test_enumerates_md_files_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let memory = dir.path().join(MEMORY_DIR);
        std::fs::create_dir(&memory).unwrap();
        std::fs::write(memory.join("2024-01-01.md"), "note").unwrap();
        std::fs::write(memory.join("b.md"), "note").unwrap();
        std::fs::write(memory.join("skip.txt"), "not markdown").unwrap();
        std::fs::write(dir.path().join("MEMORY.md"), "summary").unwrap();

        let files = enumerate(dir.path()).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(paths, vec!["MEMORY.md", "memory/2024-01-01.md", "memory/b.md"]);
        assert!(files.iter().all(|f| f.mtime > 0 && f.size > 0));
    }

    #[test]
    fn test_nested_directories_not_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join(MEMORY_DIR).join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("deep.md"), "hidden").unwrap();

        let files = enumerate(dir.path()).unwrap();
        assert!(files.is_empty());
    }
}
