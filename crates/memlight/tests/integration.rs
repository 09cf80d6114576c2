//! End-to-end tests against a real temporary workspace: build, search,
//! incremental update, change detection, and persistence across
//! reopen.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use memlight::config::Config;
use memlight::engine::Engine;

fn setup_workspace() -> (TempDir, Config) {
    let tmp = TempDir::new().unwrap();
    let memory = tmp.path().join("memory");
    fs::create_dir_all(&memory).unwrap();

    fs::write(
        memory.join("2024-01-01.md"),
        "# Standup\nuser asked about the deploy pipeline\n# Notes\nkubernetes cluster upgraded",
    )
    .unwrap();
    fs::write(
        memory.join("2024-01-02.md"),
        "# Review\nuser reported a search regression",
    )
    .unwrap();
    fs::write(
        tmp.path().join("MEMORY.md"),
        "# Summary\nlong-running project notes about deploy automation",
    )
    .unwrap();

    let config = Config {
        workspace: PathBuf::from(tmp.path()),
        ..Config::default()
    };
    (tmp, config)
}

fn bump_mtime(path: &Path) {
    let bumped = std::time::SystemTime::now() + std::time::Duration::from_secs(2);
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(bumped).unwrap();
}

#[tokio::test]
async fn test_build_then_search() {
    let (_tmp, config) = setup_workspace();
    let engine = Engine::open(&config).unwrap();

    let report = engine.build(false).await.unwrap();
    assert_eq!(report.indexed, 3);

    let stats = engine.stats().await;
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.total_chunks, 4);

    let hits = engine.search("kubernetes", None, Some(false)).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "memory/2024-01-01.md");
    assert!(hits[0].matched_keywords.contains(&"kubernetes".to_string()));

    // Every document mentioning the term is ranked
    let hits = engine.search("deploy", None, Some(false)).await;
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_search_synonym_expansion() {
    let (tmp, config) = setup_workspace();
    fs::write(
        tmp.path().join("memory/team.md"),
        "# Team\nthe assistant handled the rollout",
    )
    .unwrap();

    let engine = Engine::open(&config).unwrap();
    engine.build(false).await.unwrap();

    // "ai" expands to "assistant"
    let hits = engine.search("ai rollout", None, Some(false)).await;
    assert!(!hits.is_empty());
    assert_eq!(hits[0].path, "memory/team.md");
    assert!(hits[0]
        .matched_keywords
        .contains(&"assistant".to_string()));
}

#[tokio::test]
async fn test_incremental_update_cycle() {
    let (tmp, config) = setup_workspace();
    let engine = Engine::open(&config).unwrap();
    engine.build(false).await.unwrap();

    // No-op incremental pass
    let report = engine.build(true).await.unwrap();
    assert_eq!(report.indexed, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.deleted, 0);

    // Mutate the corpus
    let changed = tmp.path().join("memory/2024-01-02.md");
    fs::write(&changed, "# Review\nissue fixed, added telemetry").unwrap();
    bump_mtime(&changed);
    fs::remove_file(tmp.path().join("MEMORY.md")).unwrap();
    fs::write(tmp.path().join("memory/2024-01-03.md"), "# New\nfresh note").unwrap();

    let report = engine.build(true).await.unwrap();
    assert_eq!(report.indexed, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.deleted, 1);

    // Old content of the changed file is gone from the index
    let hits = engine.search("regression", None, Some(false)).await;
    assert!(hits.is_empty());
    let hits = engine.search("telemetry", None, Some(false)).await;
    assert_eq!(hits.len(), 1);

    // Deleted file no longer matches
    let hits = engine.search("automation", None, Some(false)).await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_check_for_changes_roundtrip() {
    let (tmp, config) = setup_workspace();
    let engine = Engine::open(&config).unwrap();

    assert!(engine.check_for_changes().await.unwrap());
    assert!(!engine.check_for_changes().await.unwrap());

    fs::write(tmp.path().join("memory/extra.md"), "more notes").unwrap();
    assert!(engine.check_for_changes().await.unwrap());
    assert!(!engine.check_for_changes().await.unwrap());
}

#[tokio::test]
async fn test_index_persists_across_reopen() {
    let (_tmp, config) = setup_workspace();
    {
        let engine = Engine::open(&config).unwrap();
        engine.build(false).await.unwrap();
    }

    // A reopened engine serves searches without rebuilding
    let engine = Engine::open(&config).unwrap();
    assert_eq!(engine.stats().await.total_files, 3);
    let hits = engine.search("kubernetes", None, Some(false)).await;
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_empty_workspace() {
    let tmp = TempDir::new().unwrap();
    let config = Config {
        workspace: PathBuf::from(tmp.path()),
        ..Config::default()
    };

    let engine = Engine::open(&config).unwrap();
    let report = engine.build(false).await.unwrap();
    assert_eq!(report.indexed, 0);

    let hits = engine.search("anything", None, None).await;
    assert!(hits.is_empty());
    assert_eq!(engine.stats().await.total_files, 0);
}
