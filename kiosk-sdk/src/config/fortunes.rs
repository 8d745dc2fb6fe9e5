//! Fortune database and message layout configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A value bracket and the databases eligible within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Highest value, in minor units, this tier serves.
    pub threshold: u32,
    /// Database names, resolved against [`FortuneConfig::base_dir`].
    pub databases: Vec<String>,
}

impl TierConfig {
    pub fn new(threshold: u32, databases: &[&str]) -> Self {
        Self {
            threshold,
            databases: databases.iter().map(|name| name.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortuneConfig {
    /// Directory holding the strfile databases (`name` and `name.dat`).
    pub base_dir: PathBuf,
    pub tiers: Vec<TierConfig>,
    /// Printer line width in characters.
    pub width: usize,
    /// Currency symbol as understood by the printer's code page.
    pub currency_symbol: String,
    /// Banners printed before each extra fortune, in order. The last one
    /// repeats once the list runs out.
    pub bonus_messages: Vec<String>,
}

impl Default for FortuneConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("/usr/share/games/fortunes"),
            tiers: vec![
                TierConfig::new(7, &["disclaimer", "miscellaneous", "riddles"]),
                TierConfig::new(15, &["platitudes", "paradoxum", "love"]),
                TierConfig::new(30, &["fortunes", "definitions"]),
                TierConfig::new(75, &["politics", "science", "humorists"]),
                TierConfig::new(150, &["literature", "wisdom", "tao"]),
            ],
            width: 32,
            currency_symbol: "£".to_string(),
            bonus_messages: [
                "BONUS! Extra fortune:",
                "BONUS! Another extra fortune:",
                "BONUS! 3 for the price of 1!",
                "Super-secret extra fortune!",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
