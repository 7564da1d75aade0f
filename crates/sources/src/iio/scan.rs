//! Scan layout resolution
//!
//! Enables the channels of a device's `scan_elements` directory and parses
//! their binary encoding.

use iio_sens_core::constants::{
    IIO_SCAN_ELEMENTS_DIR, IIO_SCAN_ELEMENTS_EN_SUFFIX, IIO_SCAN_ELEMENTS_INDEX_SUFFIX,
    IIO_SCAN_ELEMENTS_TYPE_SUFFIX,
};
use iio_sens_core::{sysfs, HalError, Result, MAX_SCAN_CHANNELS};
use iio_sens_types::{ChannelDescriptor, DeviceDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// `<endian>e:<sign><bits_used>/<storage_bits>[X<repeat>]>><shift>`, e.g. `be:s16/16>>0`
static SCAN_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<endian>[bl])e:(?P<sign>[su])(?P<bits>\d+)",
        r"/(?P<storage>\d+)(?:X\d+)?>>(?P<shift>\d+)$",
    ))
    .expect("scan type pattern is valid")
});

/// Parse a channel's `_type` attribute into its descriptor
pub fn parse_scan_type(channel: &str, index: u8, value: &str) -> Result<ChannelDescriptor> {
    let invalid = || HalError::InvalidScanType {
        channel: channel.to_string(),
        value: value.to_string(),
    };

    let caps = SCAN_TYPE_RE.captures(value.trim()).ok_or_else(invalid)?;
    let bits_used: u8 = caps["bits"].parse().map_err(|_| invalid())?;
    let storage_bits: u8 = caps["storage"].parse().map_err(|_| invalid())?;
    let shift: u8 = caps["shift"].parse().map_err(|_| invalid())?;

    let storage_ok = storage_bits >= 8 && storage_bits <= 64 && storage_bits % 8 == 0;
    let bits_ok = bits_used >= 1 && bits_used as u16 + shift as u16 <= storage_bits as u16;
    if !storage_ok || !bits_ok {
        return Err(invalid());
    }

    Ok(ChannelDescriptor {
        name: channel.to_string(),
        index,
        is_signed: &caps["sign"] == "s",
        is_big_endian: &caps["endian"] == "b",
        bits_used,
        shift,
        storage_bytes: storage_bits / 8,
    })
}

/// Enable and describe every scan channel of `device`
///
/// On success `device.channels` holds the enabled channels ordered by scan
/// index. Channels that refuse to enable are left out; the device is
/// rejected if the remaining set does not match its sensor type.
pub fn resolve_scan_layout(device: &mut DeviceDescriptor) -> Result<()> {
    let expected = device
        .sensor_type
        .expected_channels()
        .ok_or_else(|| HalError::UnsupportedSensorType {
            device: device.name.clone(),
            sensor_type: device.sensor_type.to_string(),
        })?;

    let scan_dir = device.sysfs_path.join(IIO_SCAN_ELEMENTS_DIR);
    let mut channels = Vec::with_capacity(expected);

    for enable_path in sysfs::entries_with_suffix(&scan_dir, IIO_SCAN_ELEMENTS_EN_SUFFIX)? {
        let Some(channel) = enable_path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(IIO_SCAN_ELEMENTS_EN_SUFFIX))
        else {
            continue;
        };

        if !enable_channel(&enable_path) {
            log::warn!("{}: channel {} did not enable, leaving it out", device.name, channel);
            continue;
        }

        let index: u8 = sysfs::read_value(
            &scan_dir.join(format!("{}{}", channel, IIO_SCAN_ELEMENTS_INDEX_SUFFIX)),
            "channel index",
        )?;
        let type_path = scan_dir.join(format!("{}{}", channel, IIO_SCAN_ELEMENTS_TYPE_SUFFIX));
        let scan_type = sysfs::read_string(&type_path)?;
        let descriptor = parse_scan_type(channel, index, &scan_type)?;
        log::debug!("{}: channel {:?}", device.name, descriptor);
        channels.push(descriptor);
    }

    validate_channels(&device.name, expected, &channels)?;
    channels.sort_by_key(|c| c.index);
    device.channels = channels;
    Ok(())
}

/// Write "1" to a channel's enable attribute and confirm it stuck
fn enable_channel(enable_path: &Path) -> bool {
    if let Err(e) = sysfs::write_value(enable_path, 1) {
        log::debug!("enable write failed: {}", e);
        return false;
    }
    matches!(sysfs::read_value::<u8>(enable_path, "channel enable"), Ok(1))
}

fn validate_channels(device: &str, expected: usize, channels: &[ChannelDescriptor]) -> Result<()> {
    if channels.len() != expected {
        return Err(HalError::ChannelCountMismatch {
            device: device.to_string(),
            expected,
            found: channels.len(),
        });
    }

    let mut seen = HashSet::new();
    for channel in channels {
        if channel.index as usize >= MAX_SCAN_CHANNELS {
            return Err(HalError::ChannelIndexOutOfRange {
                device: device.to_string(),
                channel: channel.name.clone(),
                index: channel.index,
                max: MAX_SCAN_CHANNELS - 1,
            });
        }
        if !seen.insert(channel.index) {
            return Err(HalError::DuplicateChannelIndex {
                device: device.to_string(),
                index: channel.index,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iio::load_iio_devices;
    use crate::test_support::{motion_channels, IioFixture};
    use iio_sens_types::default_supported_sensors;
    use std::fs;

    fn load_single(fixture: &IioFixture) -> DeviceDescriptor {
        let mut devices = load_iio_devices(&fixture.paths(), &default_supported_sensors()).unwrap();
        assert_eq!(devices.len(), 1);
        devices.remove(0)
    }

    #[test]
    fn test_parse_scan_type() {
        let channel = parse_scan_type("in_accel_x", 0, "be:s16/16>>0").unwrap();
        assert!(channel.is_big_endian);
        assert!(channel.is_signed);
        assert_eq!(channel.bits_used, 16);
        assert_eq!(channel.storage_bytes, 2);
        assert_eq!(channel.shift, 0);

        let channel = parse_scan_type("in_anglvel_z", 2, "le:u12/16>>4\n").unwrap();
        assert!(!channel.is_big_endian);
        assert!(!channel.is_signed);
        assert_eq!(channel.bits_used, 12);
        assert_eq!(channel.shift, 4);
        assert_eq!(channel.index, 2);

        let timestamp = parse_scan_type("in_timestamp", 3, "le:s64/64>>0").unwrap();
        assert_eq!(timestamp.storage_bytes, 8);
    }

    #[test]
    fn test_parse_scan_type_rejects_malformed() {
        let malformed = [
            "",
            "xe:s16/16>>0",
            "le:s16/12>>0",
            "le:s16/16",
            "le:s0/8>>0",
            "le:s12/16>>8",
            "le:s16/72>>0",
        ];
        for bad in malformed {
            assert!(parse_scan_type("in_accel_x", 0, bad).is_err(), "{:?} accepted", bad);
        }
    }

    #[test]
    fn test_resolves_and_enables_all_channels() {
        let fixture = IioFixture::new();
        let dir = fixture.add_device(0, "Acclerometer", "10 100", "0.5", &motion_channels("accel"));
        let mut device = load_single(&fixture);

        resolve_scan_layout(&mut device).unwrap();

        let names: Vec<&str> = device.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["in_accel_x", "in_accel_y", "in_accel_z", "in_timestamp"]);
        let indices: Vec<u8> = device.channels.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(device.record_len(), 32);

        let enabled = fs::read_to_string(dir.join("scan_elements/in_accel_y_en")).unwrap();
        assert_eq!(enabled.trim(), "1");
    }

    #[test]
    fn test_channel_failing_to_enable_rejects_device() {
        let fixture = IioFixture::new();
        let dir = fixture.add_device(0, "Gyroscope", "10", "1", &motion_channels("anglvel"));
        // A directory in place of the enable attribute cannot be written
        let enable = dir.join("scan_elements/in_anglvel_z_en");
        fs::remove_file(&enable).unwrap();
        fs::create_dir(&enable).unwrap();
        let mut device = load_single(&fixture);

        let err = resolve_scan_layout(&mut device).unwrap_err();
        assert!(matches!(
            err,
            HalError::ChannelCountMismatch { expected: 4, found: 3, .. }
        ));
    }

    #[test]
    fn test_channel_index_out_of_range_rejected() {
        let fixture = IioFixture::new();
        let channels = [
            ("in_accel_x", 0, "le:s64/64>>0"),
            ("in_accel_y", 1, "le:s64/64>>0"),
            ("in_accel_z", 2, "le:s64/64>>0"),
            ("in_timestamp", 4, "le:s64/64>>0"),
        ];
        fixture.add_device(0, "Acclerometer", "10", "1", &channels);
        let mut device = load_single(&fixture);

        let err = resolve_scan_layout(&mut device).unwrap_err();
        assert!(matches!(err, HalError::ChannelIndexOutOfRange { index: 4, .. }));
    }

    #[test]
    fn test_duplicate_channel_index_rejected() {
        let fixture = IioFixture::new();
        let channels = [
            ("in_accel_x", 0, "le:s64/64>>0"),
            ("in_accel_y", 0, "le:s64/64>>0"),
            ("in_accel_z", 2, "le:s64/64>>0"),
            ("in_timestamp", 3, "le:s64/64>>0"),
        ];
        fixture.add_device(0, "Acclerometer", "10", "1", &channels);
        let mut device = load_single(&fixture);

        let err = resolve_scan_layout(&mut device).unwrap_err();
        assert!(matches!(err, HalError::DuplicateChannelIndex { index: 0, .. }));
    }
}
