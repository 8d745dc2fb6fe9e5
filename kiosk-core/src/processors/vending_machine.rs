//! VendingMachine processor.
//!
//! The VendingMachine is responsible for:
//! - Consuming events from the event queue, one at a time, in order
//! - Crediting coins to the balance and keeping the display current
//! - Dispensing wisdom for the whole balance on confirm
//! - Switching the backlight off after a period of inactivity
//!
//! Button events only act on the press edge. Releases still count as
//! activity: they re-arm the idle timeout and wake the backlight.

use super::donation::{DonationLedger, DonationMenu};
use super::event_generator::EventGenerator;
use crate::events::{Event, EventReceiver, InputEvent};
use crate::fortunes::StoreError;
use crate::sources::{TimeoutHandle, TimeoutWatch};
use crate::wisdom::WisdomGenerator;
use kiosk_sdk::config::VendingConfig;
use kiosk_sdk::devices::glyph::ARROW_RIGHT;
use kiosk_sdk::devices::{Printer, TextDisplay};
use kiosk_sdk::money::Money;
use rand::Rng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const INSERT_COIN: &str = "   INSERT COIN  ";
const ADVISE_ME: &str = "      Advise Me";
const DISPENSING: [&str; 2] = ["   Dispensing   ", "    wisdom...   "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendingState {
    /// Waiting for the first coin.
    Idle,
    /// Holding a balance.
    InUse,
    /// Donation menu open.
    Donate,
}

/// Errors that stop the vending loop.
#[derive(Debug, Error)]
pub enum VendingError {
    /// The coin acceptor reported a burst that matches no denomination
    #[error("no coin is worth {pulses} pulses")]
    UnknownCoin { pulses: u32 },

    #[error("failed to generate wisdom: {0}")]
    Wisdom(#[from] StoreError),
}

/// Coin-operated state machine in front of the wisdom generator.
pub struct VendingMachine<R = StdRng> {
    config: VendingConfig,
    display: Box<dyn TextDisplay>,
    printer: Box<dyn Printer>,
    wisdom: WisdomGenerator<R>,
    timeout: TimeoutHandle,
    state: VendingState,
    balance: u32,
    donation_menu: Option<DonationMenu>,
    ledger: DonationLedger,
}

impl<R: Rng> VendingMachine<R> {
    /// Create the machine and register its idle timeout with `generator`.
    pub fn new(
        config: VendingConfig,
        display: Box<dyn TextDisplay>,
        printer: Box<dyn Printer>,
        wisdom: WisdomGenerator<R>,
        generator: &mut EventGenerator,
    ) -> Self {
        let (watch, timeout) = TimeoutWatch::new();
        generator.register(watch);
        Self::with_timeout(config, display, printer, wisdom, timeout)
    }

    /// Create the machine around an already registered timeout.
    pub fn with_timeout(
        config: VendingConfig,
        display: Box<dyn TextDisplay>,
        printer: Box<dyn Printer>,
        wisdom: WisdomGenerator<R>,
        timeout: TimeoutHandle,
    ) -> Self {
        let ledger = DonationLedger::new(config.donation_options.len());
        let mut machine = Self {
            config,
            display,
            printer,
            wisdom,
            timeout,
            state: VendingState::Idle,
            balance: 0,
            donation_menu: None,
            ledger,
        };
        machine.show_insert_coin();
        machine
    }

    pub fn state(&self) -> VendingState {
        self.state
    }

    /// Current balance in minor units.
    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn ledger(&self) -> &DonationLedger {
        &self.ledger
    }

    /// Apply a single event.
    pub fn handle_event(&mut self, event: Event) -> Result<(), VendingError> {
        let input = match event {
            Event::Timeout(_) => {
                debug!(state = ?self.state, "Idle timeout, backlight off");
                self.display.backlight_off();
                return Ok(());
            }
            Event::Input(input) => input,
        };

        self.timeout.arm(self.config.idle_timeout());
        self.display.backlight_on();

        if !self.is_actionable(&input) {
            return Ok(());
        }

        let next = match self.state {
            VendingState::Idle => self.on_idle(&input)?,
            VendingState::InUse => self.on_in_use(&input)?,
            VendingState::Donate => self.on_donate(&input)?,
        };
        if next != self.state {
            info!(
                from = ?self.state,
                to = ?next,
                balance = self.balance,
                "State transition"
            );
            self.state = next;
        }
        Ok(())
    }

    /// Consume events until the queue closes or `shutdown_rx` fires.
    pub async fn process_events(
        &mut self,
        mut events: EventReceiver,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(), VendingError> {
        info!("VendingMachine started");

        loop {
            // The flag may already be set before the first pass.
            if *shutdown_rx.borrow_and_update() {
                info!("VendingMachine received shutdown signal");
                break;
            }

            let event = tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        info!("Shutdown sender dropped");
                        break;
                    }
                    continue;
                }

                event = events.recv() => event,
            };

            let Some(event) = event else {
                warn!("Event queue closed");
                break;
            };

            if let Err(e) = self.handle_event(event) {
                error!(error = %e, state = ?self.state, "Vending loop aborted");
                return Err(e);
            }
        }

        Ok(())
    }

    /// Start `generator`, run until shutdown, then stop the generator and
    /// blank the display.
    ///
    /// The display is blanked on every exit path, including errors.
    pub async fn run(
        mut self,
        generator: EventGenerator,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(), VendingError> {
        let (generator, events) = generator.start();
        let result = self.process_events(events, shutdown_rx).await;
        generator.stop().await;

        self.display.clear();
        self.display.backlight_off();
        info!(balance = self.balance, "VendingMachine shutdown complete");
        result
    }

    fn is_actionable(&self, input: &InputEvent) -> bool {
        input.source == self.config.controls.coin
            || input.state == u32::from(self.config.controls.pressed_level)
    }

    fn on_idle(&mut self, input: &InputEvent) -> Result<VendingState, VendingError> {
        if input.source == self.config.controls.coin {
            self.credit(input.state)?;
            return Ok(VendingState::InUse);
        }
        Ok(VendingState::Idle)
    }

    fn on_in_use(&mut self, input: &InputEvent) -> Result<VendingState, VendingError> {
        let controls = &self.config.controls;
        if input.source == controls.coin {
            self.credit(input.state)?;
            Ok(VendingState::InUse)
        } else if input.source == controls.confirm {
            self.dispense()?;
            Ok(VendingState::Idle)
        } else if input.source == controls.donate && self.config.donations_enabled {
            let menu = DonationMenu::new(self.config.donation_options.clone());
            menu.draw(self.display.as_mut());
            self.donation_menu = Some(menu);
            Ok(VendingState::Donate)
        } else {
            Ok(VendingState::InUse)
        }
    }

    fn on_donate(&mut self, input: &InputEvent) -> Result<VendingState, VendingError> {
        if input.source == self.config.controls.coin {
            self.credit(input.state)?;
        }

        let Some(menu) = self.donation_menu.as_mut() else {
            return Ok(VendingState::InUse);
        };
        if input.source == self.config.controls.coin {
            menu.draw(self.display.as_mut());
            return Ok(VendingState::Donate);
        }

        match menu.handle_input(&input.source, &self.config.controls, self.display.as_mut()) {
            Some(option) => {
                info!(
                    option = self.config.donation_options.get(option).map(String::as_str),
                    amount = self.balance,
                    "Donation recorded"
                );
                self.ledger.record(option, self.balance);
                self.dispense()?;
                Ok(VendingState::Idle)
            }
            None => Ok(VendingState::Donate),
        }
    }

    fn credit(&mut self, pulses: u32) -> Result<(), VendingError> {
        let value = self
            .config
            .coins
            .value_of(pulses)
            .ok_or(VendingError::UnknownCoin { pulses })?;
        self.balance = self.balance.saturating_add(value);
        info!(pulses, value, balance = self.balance, "Coin accepted");
        self.show_total();
        Ok(())
    }

    /// Spend the whole balance on wisdom.
    fn dispense(&mut self) -> Result<(), VendingError> {
        let value = std::mem::take(&mut self.balance);
        self.donation_menu = None;
        self.show_dispensing();
        info!(value, "Dispensing wisdom");

        let message = self.wisdom.generate(value)?;
        if let Err(e) = self.printer.emit(&message) {
            error!(error = %e, value, "Printer failed, wisdom lost");
        }

        self.show_insert_coin();
        Ok(())
    }

    fn show_insert_coin(&mut self) {
        self.display.clear();
        self.display.write_text(INSERT_COIN);
    }

    fn show_total(&mut self) {
        let total = format!(
            "Total: {}{}",
            self.config.lcd_currency_symbol,
            Money(self.balance)
        );
        self.display.clear();
        self.display.write_text(&total);
        self.display.set_cursor(0, 1);
        self.display.write_text(&format!("{ADVISE_ME}{ARROW_RIGHT}"));
    }

    fn show_dispensing(&mut self) {
        self.display.clear();
        self.display.write_text(DISPENSING[0]);
        self.display.set_cursor(0, 1);
        self.display.write_text(DISPENSING[1]);
    }
}
