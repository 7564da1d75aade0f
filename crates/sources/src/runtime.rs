//! Hardware sensor runtime
//!
//! A [`HwSensor`] binds one resolved IIO device to its acquisition thread
//! and implements the per-sensor operations: activation, rate negotiation,
//! flush, operation mode and event injection.

use crate::acquisition::{AcquisitionLoop, RunState, SensorShared};
use crate::iio::{enable_buffer, set_sampling_frequency, BoxedScanSource, ScanDecoder};
use iio_sens_core::constants::{
    DEFAULT_SENSOR_POWER_MA, MICROS_PER_SECOND, NANOS_PER_MICRO, SENSOR_VENDOR,
};
use iio_sens_core::{HalError, Result, SharedEventSink};
use iio_sens_types::{
    DeviceDescriptor, OperationMode, OrientationTransform, SensorConfig, SensorEvent, SensorFlags,
    SensorInfo, SensorType,
};
use std::sync::{Arc, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct HwSensor {
    info: SensorInfo,
    device: DeviceDescriptor,
    shared: Arc<SensorShared>,
    worker: Option<JoinHandle<()>>,
}

impl HwSensor {
    /// Build the sensor and start its acquisition thread
    ///
    /// `device` must have its scan layout resolved. The sensor starts
    /// disabled, in NORMAL mode, with no sampling period set.
    pub fn new(
        handle: i32,
        device: DeviceDescriptor,
        config: Option<&SensorConfig>,
        source: BoxedScanSource,
        sink: SharedEventSink,
    ) -> Result<Self> {
        let info = build_sensor_info(handle, &device, config)?;
        let orientation = OrientationTransform::resolve(
            config.and_then(|c| c.orientation.as_ref()),
            &device.name,
        );
        let decoder = ScanDecoder::new(handle, &device, orientation);
        if decoder.record_len() == 0 {
            return Err(HalError::BadValue(format!(
                "{} has no resolved scan channels",
                device.name
            )));
        }

        let shared = Arc::new(SensorShared::new(&device.name, sink, info.is_wake_up()));
        let idle_timeout = Duration::from_micros(info.max_delay.max(0) as u64);
        let acquisition = AcquisitionLoop::new(shared.clone(), decoder, source, idle_timeout);
        let worker = thread::Builder::new()
            .name(format!("iio-sens-{}", handle))
            .spawn(move || acquisition.run())
            .map_err(|e| HalError::io(&device.dev_path, e))?;

        Ok(Self {
            info,
            device,
            shared,
            worker: Some(worker),
        })
    }

    pub fn info(&self) -> &SensorInfo {
        &self.info
    }

    pub fn handle(&self) -> i32 {
        self.info.sensor_handle
    }

    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    pub fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    pub fn sampling_period_ns(&self) -> i64 {
        self.state().sampling_period_ns
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.state().mode
    }

    fn state(&self) -> MutexGuard<'_, RunState> {
        self.shared.lock_state()
    }

    /// Enable or disable the sensor
    ///
    /// Repeating the current state does nothing. A failed buffer-enable
    /// write is logged; the logical state still changes.
    pub fn activate(&self, enable: bool) -> Result<()> {
        let mut state = self.state();
        if state.enabled == enable {
            return Ok(());
        }

        if let Err(e) = enable_buffer(&self.device.sysfs_path, enable) {
            log::error!("{}: failed to set buffer enable to {}: {}", self.info.name, enable, e);
        }
        state.enabled = enable;
        drop(state);

        let verb = if enable { "enabled" } else { "disabled" };
        log::info!("{} (handle {}) {}", self.info.name, self.handle(), verb);
        self.shared.notify();
        Ok(())
    }

    /// Request a sampling period
    ///
    /// The period is clamped to `[min_delay, max_delay]` and snapped to the
    /// lowest available hardware frequency at or above the requested rate.
    pub fn batch(&self, sampling_period_ns: i64) -> Result<()> {
        let min_ns = i64::from(self.info.min_delay) * NANOS_PER_MICRO;
        let max_ns = i64::from(self.info.max_delay) * NANOS_PER_MICRO;
        let period = sampling_period_ns.clamp(min_ns, max_ns);

        let mut state = self.state();
        if state.sampling_period_ns == period {
            return Ok(());
        }

        let frequency = select_sampling_frequency(&self.device.sampling_frequencies, period)
            .ok_or_else(|| HalError::BadValue(format!("no usable rate for period {} ns", period)))?;
        if let Err(e) = set_sampling_frequency(&self.device.sysfs_path, frequency) {
            log::error!(
                "{}: failed to set sampling frequency {}: {}",
                self.info.name,
                frequency,
                e
            );
        }
        state.sampling_period_ns = period;
        drop(state);

        log::debug!("{}: period {} ns, hardware rate {} Hz", self.info.name, period, frequency);
        self.shared.notify();
        Ok(())
    }

    /// Emit a flush-complete event after anything already delivered
    pub fn flush(&self) -> Result<()> {
        if !self.is_enabled() {
            return Err(HalError::BadValue(format!("{} is not enabled", self.info.name)));
        }
        if self.info.is_one_shot() {
            return Err(HalError::BadValue(format!("{} is a one-shot sensor", self.info.name)));
        }
        self.shared.post(vec![SensorEvent::flush_complete(self.handle())]);
        Ok(())
    }

    pub fn set_operation_mode(&self, mode: OperationMode) {
        let mut state = self.state();
        if state.mode == mode {
            return;
        }
        state.mode = mode;
        drop(state);

        log::debug!("{}: operation mode {:?}", self.info.name, mode);
        self.shared.notify();
    }

    /// Accept an externally supplied event
    ///
    /// Additional-info frames are accepted in any mode and consumed here.
    /// Other events need the data injection capability and DATA_INJECTION
    /// mode, and are delivered as if acquired.
    pub fn inject_event(&self, event: SensorEvent) -> Result<()> {
        if event.sensor_type == SensorType::AdditionalInfo {
            log::debug!("{}: additional info frame accepted", self.info.name);
            return Ok(());
        }
        if !self.info.supports_data_injection() {
            return Err(HalError::InvalidOperation(format!(
                "{} does not support data injection",
                self.info.name
            )));
        }
        if self.operation_mode() != OperationMode::DataInjection {
            return Err(HalError::BadValue(format!(
                "{} is not in data injection mode",
                self.info.name
            )));
        }
        self.shared.post(vec![event]);
        Ok(())
    }
}

impl Drop for HwSensor {
    fn drop(&mut self) {
        self.shared.request_stop();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.join() {
                log::warn!("{}: acquisition thread panicked: {:?}", self.info.name, e);
            }
        }
    }
}

/// Lowest available frequency whose period fits within `period_ns`
///
/// Periods are compared in whole microseconds, truncated the same way as
/// `min_delay` and `max_delay`, so a period clamped to either bound selects
/// the frequency that produced it. Falls back to the highest available
/// frequency when none fits. `frequencies` must be ascending.
pub fn select_sampling_frequency(frequencies: &[f64], period_ns: i64) -> Option<f64> {
    if period_ns <= 0 {
        return None;
    }
    let requested_us = period_ns / NANOS_PER_MICRO;
    let i = frequencies.partition_point(|f| period_us(*f) > requested_us);
    frequencies.get(i).or(frequencies.last()).copied()
}

fn period_us(frequency: f64) -> i64 {
    (MICROS_PER_SECOND / frequency) as i64
}

/// Public descriptor of a hardware sensor
pub fn build_sensor_info(
    handle: i32,
    device: &DeviceDescriptor,
    config: Option<&SensorConfig>,
) -> Result<SensorInfo> {
    let (Some(min_freq), Some(max_freq)) = (device.min_frequency(), device.max_frequency()) else {
        return Err(HalError::NoSamplingFrequencies(device.sysfs_path.clone()));
    };

    let mut flags = SensorFlags::CONTINUOUS_MODE;
    if config.is_some_and(|c| c.wake_up) {
        flags |= SensorFlags::WAKE_UP;
    }
    if config.is_some_and(|c| c.data_injection) {
        flags |= SensorFlags::DATA_INJECTION;
    }

    Ok(SensorInfo {
        sensor_handle: handle,
        name: device.name.clone(),
        vendor: SENSOR_VENDOR.to_string(),
        version: 1,
        sensor_type: device.sensor_type,
        type_as_string: device.sensor_type.as_type_string().to_string(),
        max_range: config
            .and_then(|c| c.max_range)
            .unwrap_or_else(|| device.sensor_type.default_max_range()),
        resolution: device.scale,
        power: config.and_then(|c| c.power_ma).unwrap_or(DEFAULT_SENSOR_POWER_MA),
        min_delay: period_us(max_freq) as i32,
        fifo_reserved_event_count: 0,
        fifo_max_event_count: 0,
        required_permission: String::new(),
        max_delay: period_us(min_freq) as i32,
        flags,
    })
}
