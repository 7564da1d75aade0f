//! Application configuration

use anyhow::{Context, Result};
use iio_sens_types::HalConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    /// Discovery roots, supported-sensor table and per-sensor settings
    #[serde(default)]
    pub hal: HalConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            hal: HalConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform config directory
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            log::info!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Save configuration to the platform config directory
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "iio-sens", "iio-sens")
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use iio_sens_types::{AxisMapping, OrientationConfig, SensorConfig, SensorType};

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.hal.paths.sysfs_root = PathBuf::from("/tmp/iio");
        config.hal.sensors.insert(
            "Gyroscope".to_string(),
            SensorConfig {
                orientation: Some(OrientationConfig {
                    rotate: true,
                    x: Some(AxisMapping { map: 1, negate: false }),
                    y: Some(AxisMapping { map: 0, negate: true }),
                    z: Some(AxisMapping { map: 2, negate: false }),
                }),
                wake_up: true,
                ..Default::default()
            },
        );

        config.save_to_path(&path).unwrap();
        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let content = r#"{
            "hal": {
                "supported_sensors": [{"name": "bmi160_accel", "type": "accelerometer"}]
            }
        }"#;
        std::fs::write(&path, content).unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.hal.paths.sysfs_root, PathBuf::from("/sys/bus/iio/devices"));
        assert_eq!(config.hal.supported_sensors.len(), 1);
        assert_eq!(config.hal.supported_sensors[0].sensor_type, SensorType::Accelerometer);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
