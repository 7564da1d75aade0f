//! Sensor registry
//!
//! [`SensorsHal`] discovers the IIO devices once at construction, binds a
//! [`HwSensor`] to each usable one and dispatches the sub-HAL operations to
//! them by handle.

use crate::iio::{
    enable_buffer, load_iio_devices, open_char_device, resolve_scan_layout, BoxedScanSource,
};
use crate::relay::EventRelay;
use crate::runtime::HwSensor;
use iio_sens_core::constants::SUB_HAL_NAME;
use iio_sens_core::{HalError, Result, SharedEventSink};
use iio_sens_types::{
    DeviceDescriptor, HalConfig, OperationMode, SensorEvent, SensorFlags, SensorInfo,
};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Reporting rate of a direct channel (unsupported, accepted for signature parity)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLevel {
    Stop,
    Normal,
    Fast,
    VeryFast,
}

pub struct SensorsHal {
    sensors: BTreeMap<i32, HwSensor>,
    relay: Arc<EventRelay>,
    mode: Mutex<OperationMode>,
}

impl SensorsHal {
    /// Discover sensors and open their character devices
    pub fn new(config: &HalConfig) -> Result<Self> {
        Self::with_source_factory(config, open_char_device)
    }

    /// Discover sensors, obtaining each scan source from `open_source`
    ///
    /// Devices whose scan layout, buffer reset or scan source fails are
    /// logged and skipped; they do not consume a handle.
    pub fn with_source_factory<F>(config: &HalConfig, open_source: F) -> Result<Self>
    where
        F: Fn(&DeviceDescriptor) -> io::Result<BoxedScanSource>,
    {
        let relay = Arc::new(EventRelay::new());
        let devices = load_iio_devices(&config.paths, &config.supported_sensors)?;

        let mut sensors = BTreeMap::new();
        let mut next_handle = 1;
        for mut device in devices {
            if let Err(e) = prepare_device(&mut device) {
                log::error!("Skipping {} at {}: {}", device.name, device.sysfs_path.display(), e);
                continue;
            }

            let source = match open_source(&device) {
                Ok(source) => source,
                Err(e) => {
                    log::error!("Failed to open {}: {}", device.dev_path.display(), e);
                    continue;
                }
            };

            let sensor_config = config.sensor_config(&device.name);
            let sink: SharedEventSink = relay.clone();
            match HwSensor::new(next_handle, device, sensor_config, source, sink) {
                Ok(sensor) => {
                    log::info!("Registered {} as handle {}", sensor.info().name, next_handle);
                    sensors.insert(next_handle, sensor);
                    next_handle += 1;
                }
                Err(e) => log::error!("Failed to start sensor: {}", e),
            }
        }

        log::warn!("=== {} sensors registered ===", sensors.len());
        Ok(Self {
            sensors,
            relay,
            mode: Mutex::new(OperationMode::Normal),
        })
    }

    pub fn name(&self) -> &'static str {
        SUB_HAL_NAME
    }

    /// Install the event sink and return every sensor to NORMAL mode
    pub fn initialize(&self, sink: SharedEventSink) -> Result<()> {
        self.relay.install(sink);
        self.set_operation_mode(OperationMode::Normal)
    }

    pub fn sensor(&self, handle: i32) -> Result<&HwSensor> {
        self.sensors
            .get(&handle)
            .ok_or_else(|| HalError::BadValue(format!("unknown sensor handle {}", handle)))
    }

    pub fn sensors(&self) -> impl Iterator<Item = &HwSensor> {
        self.sensors.values()
    }

    /// Descriptors of every sensor, without direct report capabilities
    pub fn sensors_list(&self) -> Vec<SensorInfo> {
        self.sensors
            .values()
            .map(|sensor| {
                let mut info = sensor.info().clone();
                info.flags.remove(SensorFlags::MASK_DIRECT_CHANNEL);
                info.flags.remove(SensorFlags::MASK_DIRECT_REPORT);
                info
            })
            .collect()
    }

    pub fn set_operation_mode(&self, mode: OperationMode) -> Result<()> {
        let mut current = self.mode.lock().unwrap_or_else(|e| e.into_inner());
        for sensor in self.sensors.values() {
            sensor.set_operation_mode(mode);
        }
        *current = mode;
        Ok(())
    }

    pub fn operation_mode(&self) -> OperationMode {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn activate(&self, handle: i32, enable: bool) -> Result<()> {
        self.sensor(handle)?.activate(enable)
    }

    /// Set the sampling period of a sensor; the report latency is ignored
    pub fn batch(
        &self,
        handle: i32,
        sampling_period_ns: i64,
        _max_report_latency_ns: i64,
    ) -> Result<()> {
        self.sensor(handle)?.batch(sampling_period_ns)
    }

    pub fn flush(&self, handle: i32) -> Result<()> {
        self.sensor(handle)?.flush()
    }

    /// Route an injected event to the sensor named by its handle
    pub fn inject_sensor_data(&self, event: SensorEvent) -> Result<()> {
        self.sensor(event.sensor_handle)?.inject_event(event)
    }

    pub fn register_direct_channel(&self) -> Result<i32> {
        Err(HalError::InvalidOperation("direct channels are not supported".into()))
    }

    pub fn unregister_direct_channel(&self, _channel_handle: i32) -> Result<()> {
        Err(HalError::InvalidOperation("direct channels are not supported".into()))
    }

    pub fn config_direct_report(
        &self,
        _handle: i32,
        _channel_handle: i32,
        _rate: RateLevel,
    ) -> Result<i32> {
        Err(HalError::InvalidOperation("direct channels are not supported".into()))
    }

    /// Write a text snapshot of every sensor
    pub fn debug_dump(&self, out: &mut impl Write, args: &[String]) -> io::Result<()> {
        if !args.is_empty() {
            writeln!(
                out,
                "Note: sub-HAL {} currently does not support args. Input arguments are ignored.",
                self.name()
            )?;
        }
        writeln!(out, "Available sensors:")?;
        for sensor in self.sensors.values() {
            let info = sensor.info();
            writeln!(out, "Name: {}", info.name)?;
            writeln!(out, "handle: {}", info.sensor_handle)?;
            writeln!(
                out,
                "resolution: {} minDelay: {} maxDelay: {}",
                info.resolution, info.min_delay, info.max_delay
            )?;
            writeln!(out, "iio path: {}", sensor.device().sysfs_path.display())?;
        }
        writeln!(out)
    }
}

/// Resolve the scan layout and leave the buffer disabled
fn prepare_device(device: &mut DeviceDescriptor) -> Result<()> {
    resolve_scan_layout(device)?;
    enable_buffer(&device.sysfs_path, false)
}
