//! Wisdom generator: turns a paid balance into a printable message.
//!
//! The balance is first scaled by a random factor in `[0.5, 1.5)`. Fortunes
//! are then drawn one after another, each sized for the value that remains,
//! and after each one the remaining value takes a random step down:
//!
//! ```text
//! remaining = (remaining + ln(U) / ln(1 / 0.995)) / 2,   U in (0, 1]
//! ```
//!
//! The walk ends as soon as the value drops to zero or below. Every extra
//! fortune is announced by the next banner from the bonus list.

pub mod reflow;

pub use reflow::{DEFAULT_WIDTH, unwrap, wrap};

use crate::fortunes::{FortuneStore, StoreError};
use kiosk_sdk::config::FortuneConfig;
use kiosk_sdk::money::Money;
use rand::distr::OpenClosed01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Per-step retention factor of the decay walk.
const DECAY_BASE: f64 = 0.995;

/// One step of the decay walk for a uniform draw `u` in `(0, 1]`.
pub fn decay(remaining: f64, u: f64) -> f64 {
    (remaining + u.ln() / (1.0 / DECAY_BASE).ln()) / 2.0
}

pub struct WisdomGenerator<R = StdRng> {
    store: FortuneStore,
    rng: R,
    width: usize,
    currency_symbol: String,
    bonus_messages: Vec<String>,
}

impl WisdomGenerator<StdRng> {
    /// Create a generator seeded from the operating system.
    pub fn new(store: FortuneStore, config: &FortuneConfig) -> Self {
        Self::with_rng(store, config, StdRng::from_os_rng())
    }
}

impl<R: Rng> WisdomGenerator<R> {
    pub fn with_rng(store: FortuneStore, config: &FortuneConfig, rng: R) -> Self {
        Self {
            store,
            rng,
            width: config.width.max(1),
            currency_symbol: config.currency_symbol.clone(),
            bonus_messages: config.bonus_messages.clone(),
        }
    }

    /// Build the message for a paid `value` in minor units.
    ///
    /// Lines are newline terminated and in reading order.
    pub fn generate(&mut self, value: u32) -> Result<Vec<String>, StoreError> {
        let rule = format!("{}\n", "-".repeat(self.width));
        let mut message = vec![
            "\n".to_string(),
            "\n".to_string(),
            format!("Your {}{} of wisdom:\n", self.currency_symbol, Money(value)),
            "\n".to_string(),
            "\n".to_string(),
        ];

        let mut remaining = f64::from(value) * (self.rng.random::<f64>() + 0.5);
        let mut fortunes = 0u32;
        while remaining > 0.0 {
            let entry = self.store.pick_fortune(remaining, &mut self.rng)?;
            message.push(rule.clone());
            message.extend(wrap(&unwrap(&entry), self.width));
            message.push(rule.clone());
            fortunes += 1;

            remaining = decay(remaining, self.rng.sample(OpenClosed01));
            if remaining > 0.0 {
                if let Some(banner) = self.bonus_banner(fortunes - 1) {
                    message.push("\n".to_string());
                    message.push(format!("{banner}\n"));
                    message.push("\n".to_string());
                    message.push("\n".to_string());
                }
            }
        }

        info!(value, fortunes, lines = message.len(), "Generated wisdom");
        Ok(message)
    }

    /// Banner announcing bonus number `index`; the last banner repeats.
    fn bonus_banner(&self, index: u32) -> Option<&str> {
        self.bonus_messages
            .get(index as usize)
            .or(self.bonus_messages.last())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fortunes::testing::{MemoryDb, standard_store};
    use crate::fortunes::{FortuneStore, FortuneTier};

    fn generator(seed: u64) -> WisdomGenerator<StdRng> {
        WisdomGenerator::with_rng(
            standard_store(20),
            &FortuneConfig::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn rule() -> String {
        format!("{}\n", "-".repeat(DEFAULT_WIDTH))
    }

    #[test]
    fn test_decay_formula() {
        assert_eq!(decay(100.0, 1.0), 50.0);
        // ln(0.995) / ln(1 / 0.995) is exactly one step down.
        assert!((decay(10.0, DECAY_BASE) - 4.5).abs() < 1e-9);
        assert!(decay(1.0, 0.5) < 0.0);
    }

    #[test]
    fn test_header_shows_paid_value() {
        let message = generator(1).generate(70).unwrap();
        assert_eq!(&message[..2], &["\n", "\n"]);
        assert_eq!(message[2], "Your £0.70 of wisdom:\n");
        assert_eq!(&message[3..5], &["\n", "\n"]);
    }

    #[test]
    fn test_fortunes_are_bracketed_by_rules() {
        for seed in 0..20 {
            let message = generator(seed).generate(150).unwrap();
            let body = &message[5..];
            let rules: Vec<usize> = body
                .iter()
                .enumerate()
                .filter(|(_, line)| **line == rule())
                .map(|(position, _)| position)
                .collect();
            assert!(!rules.is_empty());
            assert_eq!(rules.len() % 2, 0);
            assert_eq!(rules[0], 0);
            assert_eq!(*rules.last().unwrap(), body.len() - 1);
        }
    }

    #[test]
    fn test_lines_fit_printer() {
        for seed in 0..20 {
            for line in generator(seed).generate(500).unwrap() {
                assert!(line.ends_with('\n'));
                assert!(line.trim_end_matches('\n').chars().count() <= DEFAULT_WIDTH);
            }
        }
    }

    #[test]
    fn test_bonus_banners_are_capped() {
        let config = FortuneConfig::default();
        let mut generator = WisdomGenerator::with_rng(
            standard_store(5),
            &config,
            StdRng::seed_from_u64(7),
        );
        // A huge value survives many halvings, so the banner list runs out.
        let message = generator.generate(5_000_000).unwrap();
        let banners: Vec<&str> = message
            .iter()
            .map(|line| line.trim_end_matches('\n'))
            .filter(|line| config.bonus_messages.iter().any(|banner| banner.as_str() == *line))
            .collect();
        let fortunes = message.iter().filter(|line| **line == rule()).count() / 2;

        assert!(banners.len() > config.bonus_messages.len());
        assert_eq!(banners.len(), fortunes - 1);
        for (position, banner) in banners.iter().enumerate() {
            let expected = config
                .bonus_messages
                .get(position)
                .or(config.bonus_messages.last())
                .unwrap();
            assert_eq!(*banner, expected.as_str());
        }
    }

    #[test]
    fn test_entries_are_reflowed() {
        let store = FortuneStore::new(vec![FortuneTier::new(
            150,
            vec![MemoryDb::with_entries(
                "wisdom",
                &[&[
                    "A journey of a thousand miles",
                    "begins with a single step.",
                    "\t-- Lao Tzu",
                ]],
            )],
        )])
        .unwrap();
        let mut generator = WisdomGenerator::with_rng(
            store,
            &FortuneConfig::default(),
            StdRng::seed_from_u64(11),
        );
        let message = generator.generate(5).unwrap();
        assert_eq!(
            &message[5..12],
            &[
                rule(),
                "A journey of a thousand miles\n".to_string(),
                "begins with a single step.\n".to_string(),
                "\n".to_string(),
                "-- Lao Tzu\n".to_string(),
                "\n".to_string(),
                rule(),
            ]
        );
    }

    #[test]
    fn test_zero_value_prints_header_only() {
        let message = generator(3).generate(0).unwrap();
        assert_eq!(message.len(), 5);
    }
}
