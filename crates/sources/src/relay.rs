//! Replaceable event sink shared by every sensor runtime

use arc_swap::ArcSwapOption;
use iio_sens_core::{EventSink, SharedEventSink};
use iio_sens_types::SensorEvent;
use std::sync::Arc;

/// Forwards events to whichever sink is currently installed
///
/// Runtimes hold the relay from construction on; the HAL installs or
/// replaces the real sink later. Events posted while no sink is installed
/// are dropped.
#[derive(Default)]
pub struct EventRelay {
    target: ArcSwapOption<SharedEventSink>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, sink: SharedEventSink) {
        self.target.store(Some(Arc::new(sink)));
    }
}

impl EventSink for EventRelay {
    fn post_events(&self, events: Vec<SensorEvent>, wake_up: bool) {
        match self.target.load_full() {
            Some(sink) => sink.post_events(events, wake_up),
            None => log::debug!("No event sink installed, dropping {} events", events.len()),
        }
    }
}
