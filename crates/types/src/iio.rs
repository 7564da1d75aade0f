//! Descriptors of discovered IIO devices and their scan channels.

use super::sensor::SensorType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Entry of the supported-sensor matching table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupportedSensor {
    /// Value of the device's `name` attribute
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
}

impl SupportedSensor {
    pub fn new(name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            name: name.into(),
            sensor_type,
        }
    }
}

/// Binary encoding of one channel within a scan record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Channel name without the `_en` suffix (e.g. `in_accel_x`)
    pub name: String,
    /// Position within the packed scan record
    pub index: u8,
    pub is_signed: bool,
    pub is_big_endian: bool,
    pub bits_used: u8,
    pub shift: u8,
    pub storage_bytes: u8,
}

impl ChannelDescriptor {
    pub fn byte_offset(&self) -> usize {
        self.index as usize * self.storage_bytes as usize
    }

    /// One past the last byte this channel occupies
    pub fn byte_end(&self) -> usize {
        self.byte_offset() + self.storage_bytes as usize
    }
}

/// A matched IIO device
///
/// Built once at discovery. `channels` is filled in by scan layout resolution
/// before the device is bound to a sensor runtime and is never changed after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub name: String,
    pub sensor_type: SensorType,
    /// Control directory, e.g. `/sys/bus/iio/devices/iio:device0`
    pub sysfs_path: PathBuf,
    /// Scan buffer character device, e.g. `/dev/iio:device0`
    pub dev_path: PathBuf,
    /// Available sampling frequencies in Hz, ascending
    pub sampling_frequencies: Vec<f64>,
    /// Physical units per raw LSB
    pub scale: f32,
    pub device_index: u32,
    /// Enabled channels ordered by scan index
    #[serde(default)]
    pub channels: Vec<ChannelDescriptor>,
}

impl DeviceDescriptor {
    pub fn min_frequency(&self) -> Option<f64> {
        self.sampling_frequencies.first().copied()
    }

    pub fn max_frequency(&self) -> Option<f64> {
        self.sampling_frequencies.last().copied()
    }

    /// Length of one scan record as implied by the channel layout
    pub fn record_len(&self) -> usize {
        self.channels
            .iter()
            .map(ChannelDescriptor::byte_end)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(index: u8, storage_bytes: u8) -> ChannelDescriptor {
        ChannelDescriptor {
            name: format!("ch{}", index),
            index,
            is_signed: true,
            is_big_endian: false,
            bits_used: storage_bytes * 8,
            shift: 0,
            storage_bytes,
        }
    }

    #[test]
    fn test_record_len_covers_every_channel() {
        let device = DeviceDescriptor {
            name: "Gyroscope".to_string(),
            sensor_type: SensorType::Gyroscope,
            sysfs_path: PathBuf::from("/sys/bus/iio/devices/iio:device1"),
            dev_path: PathBuf::from("/dev/iio:device1"),
            sampling_frequencies: vec![10.0, 100.0],
            scale: 0.5,
            device_index: 1,
            channels: vec![channel(0, 8), channel(1, 8), channel(2, 8), channel(3, 8)],
        };
        assert_eq!(device.record_len(), 32);
        assert_eq!(device.channels[3].byte_offset(), 24);
        assert_eq!(device.min_frequency(), Some(10.0));
        assert_eq!(device.max_frequency(), Some(100.0));
    }
}
