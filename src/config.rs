use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "sdwebdav.yaml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub bus: BusConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Per-read timeout for the request head and body, in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:80".to_string(),
            read_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// How PUT bodies are written to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteStrategy {
    /// Write every block as it arrives.
    Incremental,
    /// Reserve the whole file first, write whole blocks, truncate at the end.
    #[default]
    Contiguous,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub write_strategy: WriteStrategy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/mnt/sd"),
            write_strategy: WriteStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// How long a chip-select edge from the other master blocks the bus
    pub blockout_ms: u64,
    /// Start blocked out for one window
    pub settle_on_start: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            blockout_ms: 20_000,
            settle_on_start: true,
        }
    }
}

impl BusConfig {
    pub fn blockout(&self) -> Duration {
        Duration::from_millis(self.blockout_ms)
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// The file named by `SDWEBDAV_CONFIG` is read if set, otherwise
    /// `sdwebdav.yaml` if it exists, otherwise defaults are used. `LISTEN`
    /// and `SD_ROOT` override the listen address and the storage root.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var_os("SDWEBDAV_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }
        if let Some(root) = std::env::var_os("SD_ROOT") {
            cfg.storage.root = PathBuf::from(root);
        }
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
