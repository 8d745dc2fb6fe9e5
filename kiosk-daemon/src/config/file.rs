//! TOML file configuration structures.
//!
//! These structs directly map to the `kiosk.toml` file format. Every section
//! is optional and defaults to the deployed kiosk's wiring.

use kiosk_sdk::config::{FortuneConfig, VendingConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub inputs: InputsConfig,
    pub vending: VendingConfig,
    pub fortunes: FortuneConfig,
    pub printer: PrinterConfig,
}

/// Input lines section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    /// Sampling interval of the event generator.
    pub poll_interval_ms: u64,
    /// Root of the sysfs GPIO tree.
    pub gpio_root: PathBuf,
    pub buttons: Vec<ButtonConfig>,
    pub coin: CoinInputConfig,
}

impl Default for InputsConfig {
    fn default() -> Self {
        let buttons = [
            ("black", 23),
            ("white", 18),
            ("green", 25),
            ("red", 24),
            ("blue", 11),
        ];
        Self {
            poll_interval_ms: 10,
            gpio_root: PathBuf::from("/sys/class/gpio"),
            buttons: buttons
                .into_iter()
                .map(|(name, gpio)| ButtonConfig {
                    name: name.to_string(),
                    gpio,
                })
                .collect(),
            coin: CoinInputConfig::default(),
        }
    }
}

/// A push button wired to a GPIO line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// Label carried by the button's events.
    pub name: String,
    /// Kernel GPIO number.
    pub gpio: u32,
}

/// The coin acceptor's pulse output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinInputConfig {
    pub gpio: u32,
    /// Level of the line between pulses.
    pub rest_level: bool,
    /// Quiet time after the last pulse that closes a burst.
    pub interpulse_delay_ms: u64,
}

impl Default for CoinInputConfig {
    fn default() -> Self {
        Self {
            gpio: 7,
            rest_level: true,
            interpulse_delay_ms: 100,
        }
    }
}

/// Thermal printer section.
///
/// The serial line speed is set outside the daemon (e.g. `stty -F
/// /dev/ttyAMA0 19200 raw`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Serial device of the printer. Without one, wisdom goes to stdout.
    pub device: Option<PathBuf>,
    /// Bytes written once after opening the device. The default turns on
    /// upside-down printing.
    pub init_sequence: String,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            device: Some(PathBuf::from("/dev/ttyAMA0")),
            init_sequence: "\u{1b}{1".to_string(),
        }
    }
}
