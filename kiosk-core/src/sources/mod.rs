//! Poll sources: adapters from raw input lines to typed events.
//!
//! Each source is sampled once per tick by the `EventGenerator` and yields at
//! most one event per sample. Sources own their state; nothing outside the
//! generator task touches it.

mod edge;
mod pulse;
mod timeout;

pub use edge::EdgeDetector;
pub use pulse::PulseCounter;
pub use timeout::{TimeoutHandle, TimeoutWatch};

use crate::events::Event;
use tokio::time::Instant;

/// Any input the generator can sample.
///
/// Adding a new kind of input means adding a variant here; the generator
/// itself does not change.
pub enum PollSource {
    Edge(EdgeDetector),
    Pulse(PulseCounter),
    Timeout(TimeoutWatch),
}

impl PollSource {
    /// Sample the source at `now`, yielding the events for this tick.
    pub fn sample(&mut self, now: Instant) -> Option<Event> {
        match self {
            PollSource::Edge(source) => source.sample(now).map(Event::from),
            PollSource::Pulse(source) => source.sample(now).map(Event::from),
            PollSource::Timeout(source) => source.sample(now).map(Event::from),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PollSource::Edge(source) => source.label(),
            PollSource::Pulse(source) => source.label(),
            PollSource::Timeout(_) => "timeout",
        }
    }
}

impl From<EdgeDetector> for PollSource {
    fn from(source: EdgeDetector) -> Self {
        PollSource::Edge(source)
    }
}

impl From<PulseCounter> for PollSource {
    fn from(source: PulseCounter) -> Self {
        PollSource::Pulse(source)
    }
}

impl From<TimeoutWatch> for PollSource {
    fn from(source: TimeoutWatch) -> Self {
        PollSource::Timeout(source)
    }
}
