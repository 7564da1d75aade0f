//! Hardware control writes: buffer enable and sampling frequency

use iio_sens_core::constants::{IIO_BUFFER_ENABLE, IIO_SAMPLING_FREQUENCY_SUFFIX};
use iio_sens_core::{sysfs, HalError, Result};
use std::path::Path;

pub fn enable_buffer(device_dir: &Path, enable: bool) -> Result<()> {
    sysfs::write_value(&device_dir.join(IIO_BUFFER_ENABLE), u8::from(enable))
}

/// Write `frequency` to every `*_sampling_frequency` attribute of the device
///
/// Returns how many attributes were written. Fails if the device has none,
/// or on the first attribute that cannot be written.
pub fn set_sampling_frequency(device_dir: &Path, frequency: f64) -> Result<usize> {
    let targets = sysfs::entries_with_suffix(device_dir, IIO_SAMPLING_FREQUENCY_SUFFIX)?;
    if targets.is_empty() {
        return Err(HalError::BadValue(format!(
            "{} has no sampling frequency attribute",
            device_dir.display()
        )));
    }
    for path in &targets {
        sysfs::write_value(path, frequency)?;
        log::trace!("{} <- {}", path.display(), frequency);
    }
    Ok(targets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_enable_buffer_writes_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("buffer")).unwrap();
        fs::write(dir.path().join("buffer/enable"), "0\n").unwrap();

        enable_buffer(dir.path(), true).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("buffer/enable")).unwrap(), "1");
        enable_buffer(dir.path(), false).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("buffer/enable")).unwrap(), "0");
    }

    #[test]
    fn test_frequency_written_to_every_attribute() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("in_accel_sampling_frequency"), "10").unwrap();
        fs::write(dir.path().join("in_anglvel_sampling_frequency"), "10").unwrap();
        fs::write(dir.path().join("sampling_frequency_available"), "10 50").unwrap();

        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();

        assert_eq!(set_sampling_frequency(dir.path(), 50.0).unwrap(), 2);
        assert_eq!(read("in_accel_sampling_frequency"), "50");
        assert_eq!(read("in_anglvel_sampling_frequency"), "50");
        assert_eq!(read("sampling_frequency_available"), "10 50");
    }

    #[test]
    fn test_no_frequency_attribute_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(set_sampling_frequency(dir.path(), 50.0).is_err());
    }
}
