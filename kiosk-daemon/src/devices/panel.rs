//! Simulated button panel and coin acceptor, driven from stdin.
//!
//! Commands, one per line:
//!
//! ```text
//! press <button>   press and release a button
//! coin <pulses>    insert a coin reported as <pulses> pulses
//! quit             shut the kiosk down
//! ```

use crate::config::ButtonConfig;
use kiosk_sdk::devices::InputLine;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("unknown command {0:?}, expected press, coin or quit")]
    UnknownCommand(String),

    #[error("unknown button {0:?}")]
    UnknownButton(String),

    #[error("invalid pulse count {0:?}")]
    InvalidPulses(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    Press(String),
    Coin(u32),
    Quit,
}

impl PanelCommand {
    pub fn parse(line: &str) -> Result<Self, PanelError> {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("press"), Some(button), None) => Ok(PanelCommand::Press(button.to_string())),
            (Some("coin"), Some(pulses), None) => match pulses.parse() {
                Ok(count) if count > 0 => Ok(PanelCommand::Coin(count)),
                _ => Err(PanelError::InvalidPulses(pulses.to_string())),
            },
            (Some("quit"), None, None) => Ok(PanelCommand::Quit),
            _ => Err(PanelError::UnknownCommand(line.trim().to_string())),
        }
    }
}

/// A line whose level is set by the panel.
#[derive(Clone)]
pub struct PanelLine(Arc<AtomicBool>);

impl PanelLine {
    fn new(level: bool) -> Self {
        Self(Arc::new(AtomicBool::new(level)))
    }

    fn set(&self, level: bool) {
        self.0.store(level, Ordering::SeqCst);
    }
}

impl InputLine for PanelLine {
    fn read(&mut self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How long simulated signals are held.
///
/// Both must span several poll intervals, and `pulse_width` must stay well
/// below the coin acceptor's interpulse delay.
#[derive(Debug, Clone, Copy)]
pub struct PanelTiming {
    pub press_hold: Duration,
    pub pulse_width: Duration,
}

pub struct Panel {
    buttons: HashMap<String, PanelLine>,
    coin: PanelLine,
    pressed_level: bool,
    coin_rest_level: bool,
    timing: PanelTiming,
}

impl Panel {
    pub fn new(
        buttons: &[ButtonConfig],
        pressed_level: bool,
        coin_rest_level: bool,
        timing: PanelTiming,
    ) -> Self {
        Self {
            buttons: buttons
                .iter()
                .map(|button| (button.name.clone(), PanelLine::new(!pressed_level)))
                .collect(),
            coin: PanelLine::new(coin_rest_level),
            pressed_level,
            coin_rest_level,
            timing,
        }
    }

    pub fn button_line(&self, name: &str) -> Option<PanelLine> {
        self.buttons.get(name).cloned()
    }

    pub fn coin_line(&self) -> PanelLine {
        self.coin.clone()
    }

    /// Drive the lines for `command`. Returns `false` on quit.
    pub async fn apply(&self, command: PanelCommand) -> Result<bool, PanelError> {
        match command {
            PanelCommand::Press(name) => {
                let line = self
                    .buttons
                    .get(&name)
                    .ok_or(PanelError::UnknownButton(name))?;
                line.set(self.pressed_level);
                tokio::time::sleep(self.timing.press_hold).await;
                line.set(!self.pressed_level);
                tokio::time::sleep(self.timing.press_hold).await;
            }
            PanelCommand::Coin(pulses) => {
                for _ in 0..pulses {
                    self.coin.set(!self.coin_rest_level);
                    tokio::time::sleep(self.timing.pulse_width).await;
                    self.coin.set(self.coin_rest_level);
                    tokio::time::sleep(self.timing.pulse_width).await;
                }
            }
            PanelCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Read commands from stdin until EOF or `quit`.
    ///
    /// `quit` requests a shutdown; EOF only stops the panel.
    pub fn spawn(self, shutdown_tx: Arc<watch::Sender<bool>>) {
        tokio::spawn(async move {
            info!("Simulated panel ready: press <button> | coin <pulses> | quit");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Panel input closed");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read panel input");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                let result = match PanelCommand::parse(&line) {
                    Ok(command) => self.apply(command).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(true) => {}
                    Ok(false) => {
                        shutdown_tx.send_replace(true);
                        break;
                    }
                    Err(e) => warn!(error = %e, "Panel command rejected"),
                }
            }
        });
    }
}
