//! Per-sensor acquisition loop
//!
//! One background thread per hardware sensor. The thread sleeps on the
//! sensor's condition variable while the sensor is not streaming and polls
//! its scan source otherwise.

use crate::iio::{BoxedScanSource, ScanDecoder};
use iio_sens_core::{SharedEventSink, MIN_POLL_TIMEOUT, SUSPENDED_WAIT_INTERVAL};
use iio_sens_types::{OperationMode, SensorEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Mutable state of a sensor, guarded by [`SensorShared::state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunState {
    pub enabled: bool,
    pub mode: OperationMode,
    /// Current sampling period; 0 until the first batch call
    pub sampling_period_ns: i64,
}

impl RunState {
    pub fn streaming(&self) -> bool {
        self.enabled && self.mode == OperationMode::Normal
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: OperationMode::Normal,
            sampling_period_ns: 0,
        }
    }
}

/// State shared between a sensor's callers and its acquisition thread
pub(crate) struct SensorShared {
    name: String,
    state: Mutex<RunState>,
    wake: Condvar,
    stop: AtomicBool,
    /// Serializes deliveries so a flush lands after any event already handed over
    delivery: Mutex<()>,
    sink: SharedEventSink,
    wake_up: bool,
}

impl SensorShared {
    pub fn new(name: &str, sink: SharedEventSink, wake_up: bool) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(RunState::default()),
            wake: Condvar::new(),
            stop: AtomicBool::new(false),
            delivery: Mutex::new(()),
            sink,
            wake_up,
        }
    }

    pub fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(|e| {
            log::warn!("{}: state lock poisoned, recovering", self.name);
            e.into_inner()
        })
    }

    /// Wake the acquisition thread after a state change
    pub fn notify(&self) {
        self.wake.notify_all();
    }

    pub fn post(&self, events: Vec<SensorEvent>) {
        let _delivery = self.delivery.lock().unwrap_or_else(|e| e.into_inner());
        self.sink.post_events(events, self.wake_up);
    }

    pub fn stopping(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn request_stop(&self) {
        // Set under the state lock so a thread about to wait cannot miss it
        let _state = self.lock_state();
        self.stop.store(true, Ordering::Release);
        self.wake.notify_all();
    }
}

pub(crate) struct AcquisitionLoop {
    shared: Arc<SensorShared>,
    decoder: ScanDecoder,
    source: BoxedScanSource,
    /// Poll bound used before any sampling period has been set
    idle_timeout: Duration,
}

impl AcquisitionLoop {
    pub fn new(
        shared: Arc<SensorShared>,
        decoder: ScanDecoder,
        source: BoxedScanSource,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            shared,
            decoder,
            source,
            idle_timeout,
        }
    }

    pub fn run(mut self) {
        let name = self.shared.name.clone();
        log::debug!("{}: acquisition loop started", name);
        let mut record = vec![0u8; self.decoder.record_len()];

        while !self.shared.stopping() {
            let Some(timeout) = self.wait_until_streaming() else {
                continue;
            };

            match self.source.wait_readable(timeout) {
                Ok(true) => {}
                Ok(false) => {
                    log::trace!("{}: poll timed out after {:?}", name, timeout);
                    continue;
                }
                Err(e) => {
                    log::error!("{}: poll failed: {}", name, e);
                    self.back_off(timeout);
                    continue;
                }
            }

            match self.source.read_record(&mut record) {
                Ok(n) if n == record.len() => {}
                Ok(n) => {
                    log::error!("{}: short read of {} bytes, expected {}", name, n, record.len());
                    self.back_off(timeout);
                    continue;
                }
                Err(e) => {
                    log::error!("{}: failed to read scan record: {}", name, e);
                    self.back_off(timeout);
                    continue;
                }
            }

            match self.decoder.decode(&record) {
                Ok(event) => self.shared.post(vec![event]),
                Err(e) => log::error!("{}: {}", name, e),
            }
        }

        log::debug!("{}: acquisition loop stopped", name);
    }

    /// Poll bound for the current state, or `None` after a suspended wait
    fn wait_until_streaming(&self) -> Option<Duration> {
        let shared = &self.shared;
        let state = shared.lock_state();
        if state.streaming() {
            return Some(self.poll_timeout(state.sampling_period_ns));
        }

        let _ = shared.wake.wait_timeout_while(state, SUSPENDED_WAIT_INTERVAL, |state| {
            !state.streaming() && !shared.stopping()
        });
        None
    }

    fn poll_timeout(&self, sampling_period_ns: i64) -> Duration {
        let timeout = if sampling_period_ns > 0 {
            Duration::from_nanos(sampling_period_ns as u64)
        } else {
            self.idle_timeout
        };
        timeout.max(MIN_POLL_TIMEOUT)
    }

    /// Pause after a failed cycle; state changes and shutdown cut the pause short
    fn back_off(&self, timeout: Duration) {
        let state = self.shared.lock_state();
        if self.shared.stopping() {
            return;
        }
        let _ = self.shared.wake.wait_timeout(state, timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_requires_enabled_and_normal() {
        let mut state = RunState::default();
        assert!(!state.streaming());
        state.enabled = true;
        assert!(state.streaming());
        state.mode = OperationMode::DataInjection;
        assert!(!state.streaming());
        state.mode = OperationMode::Diagnostic;
        assert!(!state.streaming());
    }
}
