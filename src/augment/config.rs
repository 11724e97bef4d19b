use crate::error::{AugmentError, Result};
use crate::layout::PathLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

const DEFAULT_NAME: &str = "Nest Augment";
const DEFAULT_VERSION: &str = "1.0.0";

/// Configuration for the augment, stored in config/augment.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AugmentConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub features: Features,

    /// Watcher timings. Older configs without this section use the defaults.
    #[serde(default)]
    pub dropbox: DropboxSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Features {
    #[serde(default = "enabled")]
    pub monitoring: bool,
    #[serde(default = "enabled")]
    pub auto_process: bool,
    #[serde(default = "enabled")]
    pub flare_deployment: bool,
    #[serde(default = "enabled")]
    pub probe_control: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DropboxSettings {
    pub poll_interval_secs: u64,
    pub backoff_secs: u64,
    pub processing_delay_ms: u64,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn enabled() -> bool {
    true
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            features: Features::default(),
            dropbox: DropboxSettings::default(),
        }
    }
}

impl Default for Features {
    fn default() -> Self {
        Self {
            monitoring: true,
            auto_process: true,
            flare_deployment: true,
            probe_control: true,
        }
    }
}

impl Default for DropboxSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            backoff_secs: 10,
            processing_delay_ms: 1000,
        }
    }
}

impl DropboxSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

impl Features {
    /// Names of the enabled features, in declaration order.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("monitoring", self.monitoring),
            ("auto_process", self.auto_process),
            ("flare_deployment", self.flare_deployment),
            ("probe_control", self.probe_control),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

impl AugmentConfig {
    /// Load config for the nest, writing the defaults out if none exists yet.
    pub fn load(layout: &PathLayout) -> Result<Self> {
        let config_path = layout.config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save(layout)?;
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path).map_err(AugmentError::Io)?;
        let config: AugmentConfig =
            serde_json::from_str(&content).map_err(AugmentError::Serialization)?;
        Ok(config)
    }

    pub fn save(&self, layout: &PathLayout) -> Result<()> {
        let config_dir = layout.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(AugmentError::Io)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(AugmentError::Serialization)?;
        fs::write(layout.config_path(), content).map_err(AugmentError::Io)?;
        Ok(())
    }

    pub fn enabled_features(&self) -> Vec<&'static str> {
        self.features.enabled()
    }
}
