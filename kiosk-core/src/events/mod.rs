//! Event system for the kiosk.
//!
//! # Event Flow
//!
//! 1. Poll sources sample input lines and emit `InputEvent`/`TimeoutEvent`
//! 2. `EventGenerator` pushes them, in tick order, onto the event queue
//! 3. `VendingMachine` pops them one at a time and drives the display,
//!    the wisdom generator and the printer

pub mod channels;
pub mod types;

pub use channels::{EventReceiver, EventSender, event_channel};
pub use types::{Event, InputEvent, TimeoutEvent};
