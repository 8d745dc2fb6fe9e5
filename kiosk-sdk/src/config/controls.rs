//! Mapping of physical buttons to kiosk functions.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Which input label drives which function.
///
/// Labels refer to button names from the inputs section, plus the coin line.
/// Several functions may share one button; the active state decides which
/// meaning applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Label of the coin acceptor input.
    pub coin: CompactString,
    /// Dispense wisdom for the current balance.
    pub confirm: CompactString,
    /// Open the donation menu (only when donations are enabled).
    pub donate: CompactString,
    pub menu_up: CompactString,
    pub menu_down: CompactString,
    /// Pick the option shown on the top row of the menu.
    pub select_top: CompactString,
    /// Pick the option shown on the bottom row of the menu.
    pub select_bottom: CompactString,
    /// Level a button line reads while held down. Buttons are pulled up, so
    /// a press reads low.
    pub pressed_level: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            coin: "coin".into(),
            confirm: "green".into(),
            donate: "white".into(),
            menu_up: "black".into(),
            menu_down: "white".into(),
            select_top: "red".into(),
            select_bottom: "green".into(),
            pressed_level: false,
        }
    }
}

impl ControlsConfig {
    /// Every button label the controls refer to, excluding the coin line.
    pub fn button_labels(&self) -> [&str; 6] {
        [
            self.confirm.as_str(),
            self.donate.as_str(),
            self.menu_up.as_str(),
            self.menu_down.as_str(),
            self.select_top.as_str(),
            self.select_bottom.as_str(),
        ]
    }
}
