//! iio-sens: Motion sensor acquisition for Linux Industrial I/O devices
//!
//! This library ties the workspace crates together for applications:
//! - Application configuration (discovery roots, sensor table, per-sensor settings)
//! - Stock event sinks
//! - Re-exports of the sensor registry and its data types

pub mod config;
pub mod sinks;

// Re-export commonly used types
pub use config::AppConfig;
pub use iio_sens_core::{EventSink, HalError, SharedEventSink};
pub use iio_sens_sources::{HwSensor, SensorsHal};
pub use iio_sens_types::{HalConfig, OperationMode, SensorEvent, SensorInfo, SensorType, Status};
pub use sinks::{ChannelSink, EventBatch, LogSink};
