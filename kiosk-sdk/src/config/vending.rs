//! Vending state machine configuration.

use super::{CoinTable, ControlsConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendingConfig {
    /// Seconds of inactivity before the backlight turns off.
    pub idle_timeout_secs: u64,
    /// Currency symbol as understood by the display's character ROM.
    pub lcd_currency_symbol: String,
    pub coins: CoinTable,
    pub controls: ControlsConfig,
    /// The donation menu is wired in but switched off on deployed kiosks.
    pub donations_enabled: bool,
    pub donation_options: Vec<String>,
}

impl VendingConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for VendingConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 10,
            lcd_currency_symbol: "£".to_string(),
            coins: CoinTable::default(),
            controls: ControlsConfig::default(),
            donations_enabled: false,
            donation_options: [
                "Hungry Orphans",
                "Lonely Kittens",
                "Lonely Orphans",
                "Mad Scientists",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
