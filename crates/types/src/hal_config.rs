//! Configuration consumed by discovery and the sensor runtimes.

use super::iio::SupportedSensor;
use super::orientation::OrientationConfig;
use super::sensor::SensorType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys/bus/iio/devices")
}

fn default_dev_root() -> PathBuf {
    PathBuf::from("/dev")
}

/// Filesystem roots of the IIO subsystem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IioPaths {
    /// Directory holding the `iio:deviceN` control entries
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
    /// Directory holding the `iio:deviceN` character devices
    #[serde(default = "default_dev_root")]
    pub dev_root: PathBuf,
}

impl Default for IioPaths {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            dev_root: default_dev_root(),
        }
    }
}

/// Per-sensor settings, keyed by device name in [`HalConfig::sensors`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SensorConfig {
    #[serde(default)]
    pub orientation: Option<OrientationConfig>,
    /// Full-scale range override in event units
    #[serde(default)]
    pub max_range: Option<f32>,
    /// Supply current override in mA
    #[serde(default)]
    pub power_ma: Option<f32>,
    /// Declare the data injection capability
    #[serde(default)]
    pub data_injection: bool,
    /// Deliver events as wake-up events
    #[serde(default)]
    pub wake_up: bool,
}

/// Matching table used when none is configured
///
/// Names are the `name` attributes reported by the virtual IIO motion drivers.
pub fn default_supported_sensors() -> Vec<SupportedSensor> {
    vec![
        SupportedSensor::new("Acclerometer", SensorType::Accelerometer),
        SupportedSensor::new("Gyroscope", SensorType::Gyroscope),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HalConfig {
    #[serde(default)]
    pub paths: IioPaths,
    #[serde(default = "default_supported_sensors")]
    pub supported_sensors: Vec<SupportedSensor>,
    #[serde(default)]
    pub sensors: HashMap<String, SensorConfig>,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            paths: IioPaths::default(),
            supported_sensors: default_supported_sensors(),
            sensors: HashMap::new(),
        }
    }
}

impl HalConfig {
    pub fn sensor_config(&self, name: &str) -> Option<&SensorConfig> {
        self.sensors.get(name)
    }
}
