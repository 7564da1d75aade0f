//! Stock event sinks

use crossbeam::channel::{self, Receiver, Sender};
use iio_sens_core::EventSink;
use iio_sens_types::{EventPayload, SensorEvent};

/// One `post_events` call
#[derive(Debug, Clone, PartialEq)]
pub struct EventBatch {
    pub events: Vec<SensorEvent>,
    pub wake_up: bool,
}

/// Forwards every batch over a crossbeam channel
pub struct ChannelSink {
    tx: Sender<EventBatch>,
}

impl ChannelSink {
    /// Unbounded sink and the receiving end
    pub fn new() -> (Self, Receiver<EventBatch>) {
        let (tx, rx) = channel::unbounded();
        (Self { tx }, rx)
    }

    /// Sink that drops batches once `capacity` are waiting
    pub fn bounded(capacity: usize) -> (Self, Receiver<EventBatch>) {
        let (tx, rx) = channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn post_events(&self, events: Vec<SensorEvent>, wake_up: bool) {
        if let Err(e) = self.tx.try_send(EventBatch { events, wake_up }) {
            log::debug!("Dropping event batch: {}", e);
        }
    }
}

/// Logs every event at info level
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    fn line(event: &SensorEvent, wake_up: bool) -> String {
        let suffix = if wake_up { " (wake-up)" } else { "" };
        format!("{}{}", describe_event(event), suffix)
    }
}

impl EventSink for LogSink {
    fn post_events(&self, events: Vec<SensorEvent>, wake_up: bool) {
        for event in &events {
            log::info!("{}", Self::line(event, wake_up));
        }
    }
}

/// Single-line rendering of an event
pub fn describe_event(event: &SensorEvent) -> String {
    let payload = match &event.payload {
        EventPayload::Vec3(v) => format!("x={:.4} y={:.4} z={:.4}", v.x, v.y, v.z),
        EventPayload::Meta(what) => format!("{:?}", what),
        EventPayload::Data(values) => format!("{:?}", values),
    };
    format!(
        "[{}] {} t={} {}",
        event.sensor_handle, event.sensor_type, event.timestamp, payload
    )
}
