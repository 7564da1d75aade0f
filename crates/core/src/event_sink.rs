//! Event sink trait

use iio_sens_types::SensorEvent;
use std::sync::Arc;

/// Consumer of sensor events
///
/// Delivery is fire-and-forget: implementations must not block for long,
/// since they are called from the acquisition loops. Events of one sensor
/// arrive in the order they were produced.
pub trait EventSink: Send + Sync {
    fn post_events(&self, events: Vec<SensorEvent>, wake_up: bool);
}

/// Shared event sink
pub type SharedEventSink = Arc<dyn EventSink>;
