//! Configuration module for kiosk-daemon.
//!
//! Handles loading the TOML file and checking that the pieces fit together
//! before any hardware is touched.

pub mod file;

pub use file::{ButtonConfig, FileConfig};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Load and validate the configuration.
    ///
    /// A missing file is not an error: the kiosk runs on its built-in
    /// defaults.
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    "Config file not found, using defaults"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let invalid = |message: String| Err(ConfigError::ValidationError(message));

    if config.inputs.poll_interval_ms == 0 {
        return invalid("inputs.poll_interval_ms must be greater than zero".to_string());
    }

    let mut names = HashSet::new();
    for button in &config.inputs.buttons {
        if button.name == config.vending.controls.coin.as_str() {
            return invalid(format!(
                "button {} shares its name with the coin input",
                button.name
            ));
        }
        if !names.insert(button.name.as_str()) {
            return invalid(format!("duplicate button name {}", button.name));
        }
    }

    for label in config.vending.controls.button_labels() {
        if !names.contains(label) {
            return invalid(format!("controls refer to unknown button {label}"));
        }
    }

    let coins = config.vending.coins.denominations();
    if coins.is_empty() {
        return invalid("vending.coins must list at least one coin".to_string());
    }
    let mut pulses = HashSet::new();
    for coin in coins {
        if coin.pulses == 0 || coin.value == 0 {
            return invalid(format!(
                "coin with {} pulses worth {} is not usable",
                coin.pulses, coin.value
            ));
        }
        if !pulses.insert(coin.pulses) {
            return invalid(format!("duplicate coin for {} pulses", coin.pulses));
        }
    }

    if config.vending.donations_enabled && config.vending.donation_options.is_empty() {
        return invalid("donations are enabled but no donation options are set".to_string());
    }

    if config.fortunes.tiers.is_empty() {
        return invalid("fortunes.tiers must not be empty".to_string());
    }
    for tier in &config.fortunes.tiers {
        if tier.databases.is_empty() {
            return invalid(format!("tier {} lists no databases", tier.threshold));
        }
    }
    if config.fortunes.width == 0 {
        return invalid("fortunes.width must be greater than zero".to_string());
    }

    Ok(())
}
