//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Crewdeck configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub mutation: MutationConfig,
}

/// Simulated latency of the in-memory store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub agents_latency_ms: u64,
    pub configs_latency_ms: u64,
    pub logs_latency_ms: u64,
    /// Create, update and status toggles
    pub write_latency_ms: u64,
    pub delete_latency_ms: u64,
    /// Upper bound of random extra delay added to every call
    pub jitter_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Periodic refetch of the live agent list while it has subscribers
    pub agents_refetch_interval_ms: u64,
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            agents_latency_ms: 500,
            configs_latency_ms: 500,
            logs_latency_ms: 300,
            write_latency_ms: 1000,
            delete_latency_ms: 500,
            jitter_ms: 0,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            agents_refetch_interval_ms: 5000,
            fetch_timeout_ms: 10_000,
        }
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

impl StoreConfig {
    /// Zero-latency store, used by tests and headless tooling
    pub fn instant() -> Self {
        Self {
            agents_latency_ms: 0,
            configs_latency_ms: 0,
            logs_latency_ms: 0,
            write_latency_ms: 0,
            delete_latency_ms: 0,
            jitter_ms: 0,
        }
    }
}

impl CacheConfig {
    pub fn agents_refetch_interval(&self) -> Option<Duration> {
        (self.agents_refetch_interval_ms > 0)
            .then(|| Duration::from_millis(self.agents_refetch_interval_ms))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl MutationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Keys listed by `list`; `get` also accepts the read-only `config_path`
const KEYS: [&str; 9] = [
    "store.agents_latency_ms",
    "store.configs_latency_ms",
    "store.logs_latency_ms",
    "store.write_latency_ms",
    "store.delete_latency_ms",
    "store.jitter_ms",
    "cache.agents_refetch_interval_ms",
    "cache.fetch_timeout_ms",
    "mutation.timeout_ms",
];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("CREWDECK_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("crewdeck")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or use defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(Self::config_path()?)
    }

    pub fn save_to(&self, path: impl Into<PathBuf>) -> anyhow::Result<()> {
        self.validate()?;

        let path = path.into();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache.fetch_timeout_ms == 0 {
            return Err(anyhow!("cache.fetch_timeout_ms must be greater than zero"));
        }
        if self.mutation.timeout_ms == 0 {
            return Err(anyhow!("mutation.timeout_ms must be greater than zero"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        let value = match key {
            "store.agents_latency_ms" => self.store.agents_latency_ms,
            "store.configs_latency_ms" => self.store.configs_latency_ms,
            "store.logs_latency_ms" => self.store.logs_latency_ms,
            "store.write_latency_ms" => self.store.write_latency_ms,
            "store.delete_latency_ms" => self.store.delete_latency_ms,
            "store.jitter_ms" => self.store.jitter_ms,
            "cache.agents_refetch_interval_ms" => self.cache.agents_refetch_interval_ms,
            "cache.fetch_timeout_ms" => self.cache.fetch_timeout_ms,
            "mutation.timeout_ms" => self.mutation.timeout_ms,
            "config_path" => return Ok(Self::config_path()?.display().to_string()),
            _ => return Err(anyhow!("Unknown configuration key: {}", key)),
        };
        Ok(value.to_string())
    }

    /// Set a configuration value by key
    ///
    /// The configuration is left unchanged when the new value fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let parsed: u64 = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, value))?;

        let mut updated = self.clone();
        *updated.slot_mut(key)? = parsed;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> anyhow::Result<&mut u64> {
        let slot = match key {
            "store.agents_latency_ms" => &mut self.store.agents_latency_ms,
            "store.configs_latency_ms" => &mut self.store.configs_latency_ms,
            "store.logs_latency_ms" => &mut self.store.logs_latency_ms,
            "store.write_latency_ms" => &mut self.store.write_latency_ms,
            "store.delete_latency_ms" => &mut self.store.delete_latency_ms,
            "store.jitter_ms" => &mut self.store.jitter_ms,
            "cache.agents_refetch_interval_ms" => &mut self.cache.agents_refetch_interval_ms,
            "cache.fetch_timeout_ms" => &mut self.cache.fetch_timeout_ms,
            "mutation.timeout_ms" => &mut self.mutation.timeout_ms,
            "config_path" => return Err(anyhow!("config_path is read-only")),
            _ => return Err(anyhow!("Unknown configuration key: {}", key)),
        };
        Ok(slot)
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        KEYS.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
