//! Scan record decoding
//!
//! Every channel is read with explicit, bounds-checked byte assembly; the
//! record buffer is never reinterpreted in place.

use iio_sens_core::{HalError, Result};
use iio_sens_types::{
    ChannelDescriptor, DeviceDescriptor, EventPayload, OrientationTransform, SensorEvent,
    SensorStatus, SensorType, Vec3, ORIENTATION_AXES,
};

/// Read one channel's raw integer from a scan record
///
/// The storage word at `index * storage_bytes` is assembled in the
/// channel's byte order, shifted right, masked to the used bits and
/// sign-extended for signed channels.
pub fn read_raw(channel: &ChannelDescriptor, record: &[u8]) -> Result<i64> {
    let start = channel.byte_offset();
    let end = channel.byte_end();
    let bytes = record.get(start..end).ok_or_else(|| HalError::RecordTooShort {
        channel: channel.name.clone(),
        start,
        end,
        len: record.len(),
    })?;

    let word = if channel.is_big_endian {
        bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    } else {
        bytes.iter().rev().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    };

    let bits = u32::from(channel.bits_used);
    let mut value = word >> channel.shift;
    if bits == 0 {
        return Ok(0);
    }
    if bits < 64 {
        value &= (1u64 << bits) - 1;
        if channel.is_signed && value & (1u64 << (bits - 1)) != 0 {
            value |= !((1u64 << bits) - 1);
        }
    }
    Ok(value as i64)
}

/// Turns raw scan records of one device into sensor events
#[derive(Debug, Clone)]
pub struct ScanDecoder {
    handle: i32,
    sensor_type: SensorType,
    scale: f32,
    channels: Vec<ChannelDescriptor>,
    /// Scan index of the timestamp channel (always the last one)
    timestamp_index: u8,
    orientation: OrientationTransform,
    record_len: usize,
}

impl ScanDecoder {
    pub fn new(handle: i32, device: &DeviceDescriptor, orientation: OrientationTransform) -> Self {
        let timestamp_index = device.channels.len().saturating_sub(1) as u8;
        Self {
            handle,
            sensor_type: device.sensor_type,
            scale: device.scale,
            channels: device.channels.clone(),
            timestamp_index,
            orientation,
            record_len: device.record_len(),
        }
    }

    /// Bytes one scan record occupies
    pub fn record_len(&self) -> usize {
        self.record_len
    }

    pub fn decode(&self, record: &[u8]) -> Result<SensorEvent> {
        let mut data = [0.0f32; ORIENTATION_AXES];
        let mut timestamp = 0i64;

        for channel in &self.channels {
            let raw = read_raw(channel, record)?;
            if channel.index == self.timestamp_index {
                timestamp = raw;
            } else if let Some(slot) = data.get_mut(channel.index as usize) {
                *slot = raw as f32 * self.scale;
            }
        }

        let [x, y, z] = self.orientation.apply(&data);
        Ok(SensorEvent {
            sensor_handle: self.handle,
            sensor_type: self.sensor_type,
            timestamp,
            payload: EventPayload::Vec3(Vec3 {
                x,
                y,
                z,
                status: SensorStatus::AccuracyHigh,
            }),
        })
    }
}
