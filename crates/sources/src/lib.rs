//! iio-sens-sources: IIO-backed sensor implementations for iio-sens.
//!
//! Discovery and scan layout resolution live in [`iio`]; [`HwSensor`] runs
//! one acquisition thread per device and [`SensorsHal`] owns them all.

mod acquisition;
mod hal;
pub mod iio;
mod relay;
mod runtime;

#[cfg(test)]
mod test_support;

pub use hal::{RateLevel, SensorsHal};
pub use iio::{BoxedScanSource, ScanSource};
pub use relay::EventRelay;
pub use runtime::{build_sensor_info, select_sampling_frequency, HwSensor};
