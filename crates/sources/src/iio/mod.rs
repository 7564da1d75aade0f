//! IIO subsystem access: discovery, scan layout, decoding and control

mod control;
mod decode;
mod device;
mod loader;
mod scan;

pub use control::{enable_buffer, set_sampling_frequency};
pub use decode::{read_raw, ScanDecoder};
pub use device::{open_char_device, BoxedScanSource, IioCharDevice, ScanSource};
pub use loader::{load_iio_devices, parse_device_index, parse_sampling_frequencies};
pub use scan::{parse_scan_type, resolve_scan_layout};
