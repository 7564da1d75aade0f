//! IIO device discovery
//!
//! Walks the IIO sysfs root, matches every `iio:deviceN` entry against the
//! supported-sensor table and reads the metadata needed to drive it.

use iio_sens_core::constants::{IIO_NAME_FILE, IIO_SCALE_SUFFIX, IIO_SFA_FILENAME};
use iio_sens_core::{sysfs, HalError, Result, IIO_DEVICE_PREFIX};
use iio_sens_types::{DeviceDescriptor, IioPaths, SupportedSensor};
use std::path::Path;

/// Discover every supported IIO device under `paths.sysfs_root`
///
/// Devices are returned in ascending device index. A device whose
/// frequency table or scale cannot be read is logged and skipped; only an
/// unreadable root directory is an error.
pub fn load_iio_devices(
    paths: &IioPaths,
    supported: &[SupportedSensor],
) -> Result<Vec<DeviceDescriptor>> {
    let root = &paths.sysfs_root;
    log::warn!("=== Scanning {} for IIO devices ===", root.display());

    let mut candidates: Vec<(u32, String)> = sysfs::list_entries(root)?
        .into_iter()
        .filter_map(|entry| parse_device_index(&entry).map(|index| (index, entry)))
        .collect();
    candidates.sort_by_key(|(index, _)| *index);

    let mut devices = Vec::new();
    for (index, entry) in candidates {
        let device_dir = root.join(&entry);
        let Some(sensor) = match_supported(&device_dir, supported) else {
            log::debug!("  {} is not a supported sensor", device_dir.display());
            continue;
        };

        match load_device(paths, &device_dir, index, sensor) {
            Ok(device) => {
                log::info!(
                    "  [{}] {} ({}) at {} - {:?} Hz, scale {}",
                    device.device_index,
                    device.name,
                    device.sensor_type,
                    device.sysfs_path.display(),
                    device.sampling_frequencies,
                    device.scale
                );
                devices.push(device);
            }
            Err(e) => {
                log::error!("  Skipping {} ({}): {}", device_dir.display(), sensor.name, e);
            }
        }
    }

    log::warn!("IIO discovery complete: {} supported devices found", devices.len());
    Ok(devices)
}

/// Numeric suffix of an `iio:deviceN` entry name
pub fn parse_device_index(entry: &str) -> Option<u32> {
    entry.strip_prefix(IIO_DEVICE_PREFIX)?.parse().ok()
}

fn match_supported<'a>(
    device_dir: &Path,
    supported: &'a [SupportedSensor],
) -> Option<&'a SupportedSensor> {
    let name = sysfs::read_string(&device_dir.join(IIO_NAME_FILE)).ok()?;
    supported.iter().find(|candidate| candidate.name == name)
}

fn load_device(
    paths: &IioPaths,
    device_dir: &Path,
    index: u32,
    sensor: &SupportedSensor,
) -> Result<DeviceDescriptor> {
    let sampling_frequencies = read_sampling_frequencies(device_dir)?;
    let scale = read_scale(device_dir)?;

    Ok(DeviceDescriptor {
        name: sensor.name.clone(),
        sensor_type: sensor.sensor_type,
        sysfs_path: device_dir.to_path_buf(),
        dev_path: paths.dev_root.join(format!("{}{}", IIO_DEVICE_PREFIX, index)),
        sampling_frequencies,
        scale,
        device_index: index,
        channels: Vec::new(),
    })
}

/// Parse a `sampling_frequency_available` line into ascending frequencies
pub fn parse_sampling_frequencies(line: &str) -> Option<Vec<f64>> {
    let mut frequencies = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok().filter(|f| f.is_finite() && *f > 0.0))
        .collect::<Option<Vec<f64>>>()?;
    frequencies.sort_by(|a, b| a.total_cmp(b));
    Some(frequencies)
}

fn read_sampling_frequencies(device_dir: &Path) -> Result<Vec<f64>> {
    let path = device_dir.join(IIO_SFA_FILENAME);
    let line = sysfs::read_string(&path)?;
    match parse_sampling_frequencies(&line) {
        Some(frequencies) if !frequencies.is_empty() => Ok(frequencies),
        Some(_) => Err(HalError::NoSamplingFrequencies(path)),
        None => Err(HalError::Parse {
            what: "sampling frequencies",
            path,
            value: line,
        }),
    }
}

/// Scale of the first `*_scale` attribute in name order
fn read_scale(device_dir: &Path) -> Result<f32> {
    let path = sysfs::entries_with_suffix(device_dir, IIO_SCALE_SUFFIX)?
        .into_iter()
        .next()
        .ok_or_else(|| HalError::NoScale(device_dir.to_path_buf()))?;
    sysfs::read_value(&path, "scale")
}
