//! Configuration types for the wisdom kiosk.
//!
//! These types represent the runtime configuration shared by the core and the
//! daemon. Loading and validating the config file is handled by the daemon.

mod coins;
mod controls;
mod fortunes;
mod vending;

pub use coins::{CoinTable, CoinValue};
pub use controls::ControlsConfig;
pub use fortunes::{FortuneConfig, TierConfig};
pub use vending::VendingConfig;
