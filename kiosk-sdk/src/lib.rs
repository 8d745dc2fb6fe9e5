//! Shared building blocks for the wisdom kiosk.
//!
//! - [`devices`]: the traits hardware collaborators implement
//! - [`config`]: validated runtime configuration shared by the core and the daemon
//! - [`money`]: display formatting for balances held in minor currency units

pub mod config;
pub mod devices;
pub mod money;
