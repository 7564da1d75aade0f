//! iio-sens-core: Core traits, errors and sysfs access for iio-sens.
//!
//! This crate contains the event sink trait, the shared error type and its
//! mapping onto HAL result codes, the IIO layout constants, and the sysfs
//! attribute helpers used by discovery and the sensor runtimes.

pub mod constants;
mod error;
mod event_sink;
pub mod sysfs;

pub use constants::{
    IIO_DEVICE_PREFIX, MAX_SCAN_CHANNELS, MIN_POLL_TIMEOUT, SUSPENDED_WAIT_INTERVAL,
};
pub use error::{status_of, HalError, Result};
pub use event_sink::{EventSink, SharedEventSink};

// Re-export types used in trait signatures for convenience
pub use iio_sens_types::{SensorEvent, Status};
