//! Donation menu and ledger.
//!
//! Dormant on deployed kiosks: the vending state machine only opens the menu
//! when `donations_enabled` is set in its configuration.

use kiosk_sdk::config::ControlsConfig;
use kiosk_sdk::devices::TextDisplay;
use kiosk_sdk::devices::glyph::{MENU_DOWN, MENU_UP};
use tracing::debug;

/// Width of an option label on a 16 column display, after the scroll marker.
const LABEL_WIDTH: usize = 15;

/// Two-row scrolling menu over the donation options.
#[derive(Debug, Clone)]
pub struct DonationMenu {
    options: Vec<String>,
    position: usize,
}

impl DonationMenu {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            options,
            position: 0,
        }
    }

    /// Index of the option on the top row.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn draw(&self, display: &mut dyn TextDisplay) {
        let marker = |shown: bool, glyph: char| if shown { glyph } else { ' ' };

        display.clear();
        if let Some(top) = self.options.get(self.position) {
            let up = marker(self.position > 0, MENU_UP);
            display.write_text(&format!("{up}{top:>LABEL_WIDTH$}"));
        }
        display.set_cursor(0, 1);
        if let Some(bottom) = self.options.get(self.position + 1) {
            let down = marker(self.options.len() > self.position + 2, MENU_DOWN);
            display.write_text(&format!("{down}{bottom:>LABEL_WIDTH$}"));
        }
    }

    /// Apply a button press from `source`.
    ///
    /// Scrolling redraws the menu and returns `None`; a selection returns the
    /// chosen option index.
    pub fn handle_input(
        &mut self,
        source: &str,
        controls: &ControlsConfig,
        display: &mut dyn TextDisplay,
    ) -> Option<usize> {
        if source == controls.menu_up && self.position > 0 {
            self.position -= 1;
            self.draw(display);
            None
        } else if source == controls.menu_down && self.position + 2 < self.options.len() {
            self.position += 1;
            self.draw(display);
            None
        } else if source == controls.select_top && self.position < self.options.len() {
            Some(self.position)
        } else if source == controls.select_bottom && self.position + 1 < self.options.len() {
            Some(self.position + 1)
        } else {
            debug!(source, position = self.position, "Ignored menu input");
            None
        }
    }
}

/// Running totals donated to each option, in minor units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationLedger {
    totals: Vec<u32>,
}

impl DonationLedger {
    pub fn new(options: usize) -> Self {
        Self {
            totals: vec![0; options],
        }
    }

    pub fn record(&mut self, option: usize, amount: u32) {
        if let Some(total) = self.totals.get_mut(option) {
            *total = total.saturating_add(amount);
        }
    }

    pub fn totals(&self) -> &[u32] {
        &self.totals
    }
}
