use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub meeting: MeetingConfig,
    pub transcription: TranscriptionConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    /// How often the meeting timer is updated.
    pub tick_interval_ms: u64,
    /// Play a sound when the speaker changes.
    pub chime: bool,
    /// Shell command used as the chime instead of the terminal bell.
    pub chime_command: String,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            chime: true,
            chime_command: String::new(),
        }
    }
}

impl MeetingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Shell command that prints the transcript on stdout until it is
    /// killed. Empty disables transcription.
    pub command: String,
    pub enabled: bool,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            enabled: true,
        }
    }
}

impl TranscriptionConfig {
    pub fn active_command(&self) -> Option<&str> {
        let command = self.command.trim();
        (self.enabled && !command.is_empty()).then_some(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Save the meeting to history when every speaker has finished.
    pub save_on_completion: bool,
    /// Default number of entries shown by `history`.
    pub history_limit: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            save_on_completion: true,
            history_limit: 20,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
