use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted for the workspace root when the
/// config file does not set one.
pub const WORKSPACE_ENV: &str = "MEMLIGHT_WORKSPACE";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Workspace root containing the `memory/` note directory and the
    /// optional top-level `MEMORY.md` summary file.
    pub workspace: PathBuf,
    pub index: IndexConfig,
    pub watcher: WatcherConfig,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            index: IndexConfig::default(),
            watcher: WatcherConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn default_workspace() -> PathBuf {
    std::env::var(WORKSPACE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory (relative to the workspace) holding the persisted
    /// index and watcher-state records.
    pub dir: String,
    /// Default result count for searches that do not specify one.
    pub top_k: usize,
    /// Whether searches try the hot-memory fast path first.
    pub hot_first: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: ".memory-index".to_string(),
            top_k: 5,
            hot_first: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WatcherConfig {
    /// Seconds between change-detection polls.
    pub interval_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

/// Load configuration from a TOML file.
///
/// A missing file is not an error: every setting has a default, so the
/// tool works out of the box in a workspace with a `memory/` directory
/// (the workspace root falls back to `MEMLIGHT_WORKSPACE`, then `.`).
pub fn load_config(path: &Path) -> Result<Config> {
    let config: Config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    if config.index.top_k == 0 {
        anyhow::bail!("index.top_k must be >= 1");
    }
    if config.watcher.interval_secs == 0 {
        anyhow::bail!("watcher.interval_secs must be >= 1");
    }

    Ok(config)
}
