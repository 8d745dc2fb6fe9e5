//! Event type definitions.
//!
//! Events are immutable once created. They are produced by the poll sources
//! on the generator task and consumed, one at a time, by the vending state
//! machine.

use compact_str::CompactString;
use tokio::time::Instant;

/// A change observed on an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// When the change was sampled.
    pub at: Instant,
    /// The new level (0 or 1) for buttons, or the number of pulses in a
    /// burst for pulse counters.
    pub state: u32,
    /// Stable label of the input, e.g. `"green"` or `"coin"`.
    pub source: CompactString,
}

/// An armed timeout has expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutEvent {
    pub at: Instant,
}

/// Everything the generator can publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    Timeout(TimeoutEvent),
}

impl Event {
    /// When the event was sampled.
    pub fn at(&self) -> Instant {
        match self {
            Event::Input(input) => input.at,
            Event::Timeout(timeout) => timeout.at,
        }
    }
}

impl From<InputEvent> for Event {
    fn from(event: InputEvent) -> Self {
        Event::Input(event)
    }
}

impl From<TimeoutEvent> for Event {
    fn from(event: TimeoutEvent) -> Self {
        Event::Timeout(event)
    }
}
