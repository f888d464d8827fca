//! Configuration management
//!
//! Loads configuration from config.toml with support for:
//! - Session storage key and simulated latencies
//! - Session store backend and location

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::session::{SessionSettings, DEFAULT_STORAGE_KEY};
use crate::storage::{MemoryStore, SessionStore, SqliteStore};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key the identity snapshot is stored under
    pub storage_key: String,
    /// Simulated sign-in / sign-up round trip in milliseconds
    pub latency_ms: u64,
    /// Simulated password reset round trip in milliseconds
    pub reset_latency_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

/// Where the session snapshot lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: PathBuf::from("bounty-session.db"),
        }
    }
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            latency: Duration::from_millis(config.latency_ms),
            reset_latency: Duration::from_millis(config.reset_latency_ms),
        }
    }
}

impl Config {
    /// Load from config.toml or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load from specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            toml::from_str(DEFAULT_CONFIG).context("Failed to parse default config")
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings::from(&self.session)
    }

    /// Store path (BOUNTY_SESSION_DB env var takes precedence)
    pub fn store_path(&self) -> PathBuf {
        match std::env::var("BOUNTY_SESSION_DB") {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => self.storage.path.clone(),
        }
    }

    /// Open the configured session store
    pub fn open_store(&self) -> Result<Arc<dyn SessionStore>> {
        match self.storage.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StorageBackend::Sqlite => {
                let path = self.store_path();
                let store = SqliteStore::new(&path).with_context(|| {
                    format!("Failed to open session store at {}", path.display())
                })?;
                Ok(Arc::new(store))
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            session: SessionConfig {
                storage_key: DEFAULT_STORAGE_KEY.to_string(),
                latency_ms: 1000,
                reset_latency_ms: 2000,
            },
            storage: StorageConfig::default(),
        })
    }
}
