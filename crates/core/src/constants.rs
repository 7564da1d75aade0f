//! Shared constants for the IIO sysfs layout and sensor runtimes

use std::time::Duration;

/// Prefix of IIO device entries (`iio:device0`, `iio:device1`, ...)
pub const IIO_DEVICE_PREFIX: &str = "iio:device";

/// Device name attribute
pub const IIO_NAME_FILE: &str = "name";

/// Space or comma separated list of supported sampling frequencies (Hz)
pub const IIO_SFA_FILENAME: &str = "sampling_frequency_available";

/// Suffix of the per-channel or shared scale attributes
pub const IIO_SCALE_SUFFIX: &str = "_scale";

/// Suffix of the writable sampling frequency attributes
pub const IIO_SAMPLING_FREQUENCY_SUFFIX: &str = "_sampling_frequency";

/// Buffer enable control, relative to the device directory
pub const IIO_BUFFER_ENABLE: &str = "buffer/enable";

/// Channel descriptions live in this subdirectory
pub const IIO_SCAN_ELEMENTS_DIR: &str = "scan_elements";

pub const IIO_SCAN_ELEMENTS_EN_SUFFIX: &str = "_en";
pub const IIO_SCAN_ELEMENTS_INDEX_SUFFIX: &str = "_index";
pub const IIO_SCAN_ELEMENTS_TYPE_SUFFIX: &str = "_type";

/// Highest number of channels (data axes plus timestamp) a scan record may carry
pub const MAX_SCAN_CHANNELS: usize = 4;

/// Vendor reported for every hardware sensor
pub const SENSOR_VENDOR: &str = "iio-sens";

/// Default supply current of a hardware sensor in mA
pub const DEFAULT_SENSOR_POWER_MA: f32 = 0.001;

/// Name reported by the sub-HAL
pub const SUB_HAL_NAME: &str = "IioSensorSubHal";

/// Lower bound for a single poll on the scan device
pub const MIN_POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Upper bound for one suspended wait of an acquisition loop
///
/// State changes wake the loop immediately; this only bounds how long a
/// missed notification could go unnoticed.
pub const SUSPENDED_WAIT_INTERVAL: Duration = Duration::from_millis(500);

pub const NANOS_PER_MICRO: i64 = 1_000;
pub const NANOS_PER_SECOND: f64 = 1e9;
pub const MICROS_PER_SECOND: f64 = 1e6;
