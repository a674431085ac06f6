//! Host configuration

use anyhow::{Context, Result};
use nvsmi_core::{ConfigItem, DEFAULT_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Host configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    /// Time between read cycles
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Host name stamped on samples, the system host name when unset
    #[serde(default)]
    pub hostname: Option<String>,
    /// Log every dispatched sample through the write_info plugin
    #[serde(default)]
    pub write_info: bool,
    /// Plugin blocks, in load order
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

/// Configuration block for one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Registered plugin name
    pub name: String,
    /// Ordered declarations handed to the plugin's configure
    #[serde(default)]
    pub children: Vec<ConfigItem>,
}

fn default_version() -> u32 {
    1
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

impl AppConfig {
    /// Load configuration from the default location, defaults if there is none
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "nvsmi-collect", "nvsmi-collect")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Read interval, never zero
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    /// A starting point for a new configuration file
    pub fn example() -> Self {
        Self {
            plugins: vec![PluginConfig {
                name: "nvsmi".to_string(),
                children: vec![
                    ConfigItem::new("bin", ["/usr/bin/nvidia-smi"]),
                    ConfigItem::new(
                        "querygpu",
                        [
                            "utilization.gpu",
                            "utilization.memory",
                            "temperature.gpu",
                            "fan.speed",
                            "pstate",
                        ],
                    ),
                    ConfigItem::new("querygpu", ["power.draw", "persistence_mode"]),
                ],
            }],
            ..Self::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            interval_ms: default_interval_ms(),
            hostname: None,
            write_info: false,
            plugins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.interval(), Duration::from_millis(DEFAULT_INTERVAL_MS));
    }

    #[test]
    fn test_plugin_block_keeps_declaration_order() {
        let json = r#"{
            "interval_ms": 5000,
            "write_info": true,
            "plugins": [
                {
                    "name": "nvsmi",
                    "children": [
                        { "key": "QueryGPU", "values": ["utilization.gpu"] },
                        { "key": "Bin", "values": ["/usr/bin/nvidia-smi"] },
                        { "key": "QueryGPU", "values": ["pstate", "fan.speed"] }
                    ]
                }
            ]
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert!(config.write_info);
        assert_eq!(config.interval(), Duration::from_secs(5));
        let keys: Vec<&str> = config.plugins[0]
            .children
            .iter()
            .map(|c| c.key.as_str())
            .collect();
        assert_eq!(keys, vec!["QueryGPU", "Bin", "QueryGPU"]);
        assert_eq!(config.plugins[0].children[2].values, vec!["pstate", "fan.speed"]);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = AppConfig {
            interval_ms: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig::example();
        config.save_to_path(&path).unwrap();

        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.json"));
    }
}
