//! Event queue factory and handles.
//!
//! The generator and the state machine share exactly one queue. It is
//! unbounded, so sending never blocks the sampling loop.

use super::types::Event;
use tokio::sync::mpsc;

/// Sender handle for the event queue.
pub type EventSender = mpsc::UnboundedSender<Event>;
/// Receiver handle for the event queue.
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Create the event queue.
///
/// Returns a (sender, receiver) pair. Events are received in the order they
/// were sent.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
