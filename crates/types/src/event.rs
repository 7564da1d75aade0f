//! Sensor events delivered to the event sink.

use super::sensor::SensorType;
use serde::{Deserialize, Serialize};

/// Accuracy reported with a vector sample
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SensorStatus {
    NoContact,
    Unreliable,
    AccuracyLow,
    AccuracyMedium,
    #[default]
    AccuracyHigh,
}

/// Three-axis sample in physical units
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub status: SensorStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MetaDataEventType {
    FlushComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EventPayload {
    Vec3(Vec3),
    Meta(MetaDataEventType),
    /// Free-form values (additional info frames, injected non-vector data)
    Data(Vec<f32>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorEvent {
    pub sensor_handle: i32,
    pub sensor_type: SensorType,
    /// Nanoseconds, as stamped by the kernel for hardware samples
    pub timestamp: i64,
    pub payload: EventPayload,
}

impl SensorEvent {
    pub fn flush_complete(sensor_handle: i32) -> Self {
        Self {
            sensor_handle,
            sensor_type: SensorType::MetaData,
            timestamp: 0,
            payload: EventPayload::Meta(MetaDataEventType::FlushComplete),
        }
    }

    pub fn vec3(&self) -> Option<&Vec3> {
        match &self.payload {
            EventPayload::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_flush_complete(&self) -> bool {
        self.sensor_type == SensorType::MetaData
            && self.payload == EventPayload::Meta(MetaDataEventType::FlushComplete)
    }
}
