/// Engine configuration file: load, save, and sanitize.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::triggers::TriggerConfig;

/// Default maximum number of undo units kept in history.
pub const DEFAULT_HISTORY_BOUND: usize = 100;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "RETRACE_CONFIG";

const CONFIG_FILE_NAME: &str = "retrace.json";

/// Top-level engine configuration, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Max counted units retained in `past`; a group counts as one.
    pub history_bound: usize,
    pub triggers: TriggerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_bound: DEFAULT_HISTORY_BOUND,
            triggers: TriggerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `RETRACE_CONFIG` environment variable
    /// 2. `retrace/retrace.json` under the platform config directory
    /// 3. `retrace.json` in the working directory
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .map(|d| d.join("retrace").join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any read or parse error.
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match Self::load(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{e:#}"),
            }
            // Don't overwrite a broken file
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            config
        }
    }

    /// Reads and sanitizes config from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let mut config: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config at {}", path.display()))
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        if self.history_bound == 0 {
            tracing::warn!("history_bound must be positive; using 1");
            self.history_bound = 1;
        }
        self.triggers.sanitize();
    }
}
