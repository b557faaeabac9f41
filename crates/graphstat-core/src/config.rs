//! Configuration: `graphstat.toml` plus environment overrides

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "graphstat.toml";

/// How average path length computes its pairwise distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathStrategy {
    /// Repeated BFS, sharing the cached all-pairs matrix.
    #[default]
    Bfs,
    /// Floyd–Warshall over the adjacency structure.
    FloydWarshall,
}

impl std::str::FromStr for PathStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "bfs" => Ok(PathStrategy::Bfs),
            "floyd-warshall" => Ok(PathStrategy::FloydWarshall),
            other => anyhow::bail!("unknown path strategy: {other}"),
        }
    }
}

/// Settings consumed by the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Refuse all-pairs computation above this many nodes.
    pub max_apsp_nodes: Option<usize>,
    pub path_strategy: PathStrategy,
}

/// Settings for the file watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period after a change event before the file is re-read.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig { debounce_ms: 250 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// Reads `path` if given (it must exist), otherwise `./graphstat.toml` if
    /// present, otherwise defaults. `.env` is then loaded and `GRAPHSTAT_*`
    /// variables override file values.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Config::default()
                }
            }
        };

        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", env_file.display());
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!("Config loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `GRAPHSTAT_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = lookup("GRAPHSTAT_MAX_APSP_NODES") {
            self.engine.max_apsp_nodes = if v.trim().is_empty() {
                None
            } else {
                Some(v.trim().parse().context("GRAPHSTAT_MAX_APSP_NODES")?)
            };
        }
        if let Some(v) = lookup("GRAPHSTAT_PATH_STRATEGY") {
            self.engine.path_strategy = v.trim().parse()?;
        }
        if let Some(v) = lookup("GRAPHSTAT_WATCH_DEBOUNCE_MS") {
            self.watch.debounce_ms = v.trim().parse().context("GRAPHSTAT_WATCH_DEBOUNCE_MS")?;
        }
        Ok(())
    }
}
