//! Event processors for the event-driven architecture.
//!
//! - `EventGenerator`: Samples poll sources, emits `InputEvent`/`TimeoutEvent`
//! - `VendingMachine`: Receives events, drives the display and the printer
//! - `DonationMenu`: Sub-menu the `VendingMachine` delegates to while a
//!   donation is being chosen

pub mod donation;
pub mod event_generator;
pub mod vending_machine;

pub use donation::{DonationLedger, DonationMenu};
pub use event_generator::{EventGenerator, GeneratorHandle};
pub use vending_machine::{VendingError, VendingMachine, VendingState};
