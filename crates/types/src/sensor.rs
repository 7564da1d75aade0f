//! Sensor descriptors, flags and result codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical sensor type
///
/// Only the motion sensors backed by IIO devices carry a physical layout.
/// `MetaData` and `AdditionalInfo` are event-only types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    MetaData,
    Accelerometer,
    Gyroscope,
    AdditionalInfo,
}

impl SensorType {
    /// Number of data axes a device of this type must expose
    pub fn axis_count(&self) -> Option<usize> {
        match self {
            SensorType::Accelerometer | SensorType::Gyroscope => Some(3),
            SensorType::MetaData | SensorType::AdditionalInfo => None,
        }
    }

    /// Number of scan channels expected for a device of this type (axes plus timestamp)
    pub fn expected_channels(&self) -> Option<usize> {
        self.axis_count().map(|axes| axes + 1)
    }

    pub fn as_type_string(&self) -> &'static str {
        match self {
            SensorType::MetaData => "android.sensor.meta_data",
            SensorType::Accelerometer => "android.sensor.accelerometer",
            SensorType::Gyroscope => "android.sensor.gyroscope",
            SensorType::AdditionalInfo => "android.sensor.additional_info",
        }
    }

    /// Full-scale range of the physical sensor in its event unit
    pub fn default_max_range(&self) -> f32 {
        match self {
            // +/- 8g in m/s^2
            SensorType::Accelerometer => 78.4,
            // 1000 deg/s in rad/s
            SensorType::Gyroscope => 1000.0 * std::f32::consts::PI / 180.0,
            SensorType::MetaData | SensorType::AdditionalInfo => 0.0,
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorType::MetaData => "meta_data",
            SensorType::Accelerometer => "accelerometer",
            SensorType::Gyroscope => "gyroscope",
            SensorType::AdditionalInfo => "additional_info",
        };
        f.write_str(name)
    }
}

/// Reporting mode encoded in bits 1..3 of the sensor flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingMode {
    Continuous,
    OnChange,
    OneShot,
    Special,
}

bitflags::bitflags! {
    /// Capability flags of a sensor
    ///
    /// Bits 1..3 hold the reporting mode, so `CONTINUOUS_MODE` is the empty
    /// value and the mode constants overlap. Read the mode through
    /// [`SensorFlags::reporting_mode`] rather than `contains`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SensorFlags: u32 {
        const WAKE_UP = 0x1;
        const CONTINUOUS_MODE = 0x0;
        const ON_CHANGE_MODE = 0x2;
        const ONE_SHOT_MODE = 0x4;
        const SPECIAL_REPORTING_MODE = 0x6;
        const DATA_INJECTION = 0x10;
        const DYNAMIC_SENSOR = 0x20;
        const ADDITIONAL_INFO = 0x40;
        const DIRECT_CHANNEL_ASHMEM = 0x400;
        const DIRECT_CHANNEL_GRALLOC = 0x800;
        const MASK_REPORTING_MODE = 0xE;
        const MASK_DIRECT_REPORT = 0x380;
        const MASK_DIRECT_CHANNEL = 0xC00;
    }
}

impl SensorFlags {
    pub fn reporting_mode(&self) -> ReportingMode {
        match (*self & Self::MASK_REPORTING_MODE).bits() {
            0x0 => ReportingMode::Continuous,
            0x2 => ReportingMode::OnChange,
            0x4 => ReportingMode::OneShot,
            _ => ReportingMode::Special,
        }
    }
}

/// Public description of a logical sensor, as returned by enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorInfo {
    pub sensor_handle: i32,
    pub name: String,
    pub vendor: String,
    pub version: i32,
    pub sensor_type: SensorType,
    pub type_as_string: String,
    /// Full-scale range in event units
    pub max_range: f32,
    /// Event units per raw LSB
    pub resolution: f32,
    /// Supply current in mA
    pub power: f32,
    /// Shortest sampling period in microseconds
    pub min_delay: i32,
    pub fifo_reserved_event_count: u32,
    pub fifo_max_event_count: u32,
    pub required_permission: String,
    /// Longest sampling period in microseconds
    pub max_delay: i32,
    pub flags: SensorFlags,
}

impl SensorInfo {
    pub fn is_wake_up(&self) -> bool {
        self.flags.contains(SensorFlags::WAKE_UP)
    }

    pub fn is_one_shot(&self) -> bool {
        self.flags.reporting_mode() == ReportingMode::OneShot
    }

    pub fn supports_data_injection(&self) -> bool {
        self.flags.contains(SensorFlags::DATA_INJECTION)
    }
}

/// Operation mode shared by every sensor of the HAL
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    #[default]
    Normal,
    DataInjection,
    /// Reserved; acquisition is suspended while in this mode
    Diagnostic,
}

/// Discrete result code handed back to the HAL shim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    BadValue,
    InvalidOperation,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}
