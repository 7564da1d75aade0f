//! iio-sens-types: Shared data types for iio-sens.
//!
//! This crate contains pure data types (sensor descriptors, events, device
//! and channel descriptors, configuration records) that are shared across
//! all iio-sens crates. It performs no I/O.

pub mod event;
pub mod hal_config;
pub mod iio;
pub mod orientation;
pub mod sensor;

// Re-export commonly used types at the crate root for convenience
pub use event::{EventPayload, MetaDataEventType, SensorEvent, SensorStatus, Vec3};
pub use hal_config::{default_supported_sensors, HalConfig, IioPaths, SensorConfig};
pub use iio::{ChannelDescriptor, DeviceDescriptor, SupportedSensor};
pub use orientation::{
    AxisMapping, AxisSource, InvalidOrientation, OrientationConfig, OrientationTransform,
    ORIENTATION_AXES,
};
pub use sensor::{OperationMode, ReportingMode, SensorFlags, SensorInfo, SensorType, Status};
