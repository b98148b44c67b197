use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use ttrunc_core::{EncodingRef, ModelLimits, Strategy};

/// Simple configuration for ttrunc
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Encoding used when neither a model nor an encoding is given
    #[serde(default = "default_encoding")]
    pub default_encoding: String,

    #[serde(default)]
    pub strategy: Strategy,

    /// Model limits added to or overriding the built-in table
    #[serde(default)]
    pub models: BTreeMap<String, usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_encoding: default_encoding(),
            strategy: Strategy::default(),
            models: BTreeMap::new(),
        }
    }
}

fn default_encoding() -> String {
    "cl100k_base".to_string()
}

impl Config {
    /// Load config from default location or create default if not found.
    /// An unreadable or unwritable config location only costs a warning.
    pub fn load_or_default() -> Self {
        Self::load_or_default_at(&Self::config_path())
    }

    pub fn load_or_default_at(path: &Path) -> Self {
        Self::load_or_create(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "Failed to load config, using defaults");
            Config::default()
        })
    }

    fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            debug!(path = %path.display(), "Wrote default config");
            Ok(config)
        }
    }

    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "ttrunc", "ttrunc") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.ttrunc/config.toml")
        }
    }

    pub fn default_encoding(&self) -> anyhow::Result<EncodingRef> {
        Ok(self.default_encoding.parse()?)
    }

    /// Built-in model limits with this config's overrides applied
    pub fn model_limits(&self) -> ModelLimits {
        let mut limits = ModelLimits::builtin();
        limits.extend(self.models.iter().map(|(model, &max)| (model.clone(), max)));
        limits
    }
}
