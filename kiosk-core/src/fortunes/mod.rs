//! Fortune store: tiered, weighted access to strfile databases.
//!
//! The store maps a monetary value to a tier of databases, then draws one
//! entry uniformly across every entry of that tier. Larger databases are
//! therefore picked more often, and every entry has the same chance.

pub mod strfile;

pub use strfile::{Strfile, StrfileHeader, build_index};

use kiosk_sdk::config::FortuneConfig;
use rand::Rng;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while opening or reading the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database file could not be opened
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The index file is not a valid strfile index
    #[error("malformed index for {name}: {reason}")]
    MalformedIndex { name: String, reason: String },

    /// Read failure in the middle of an entry
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("entry {ordinal} out of range for {name} ({count} entries)")]
    EntryOutOfRange {
        name: String,
        ordinal: u32,
        count: u32,
    },

    #[error("fortune store has no tiers")]
    NoTiers,

    /// A tier whose databases hold no entries at all
    #[error("tier {threshold} has no entries")]
    EmptyTier { threshold: u32 },
}

/// A database of entries addressable by ordinal.
pub trait FortuneSource: Send {
    fn name(&self) -> &str;

    fn entry_count(&self) -> u32;

    /// Read the raw lines of entry `ordinal`, without line terminators.
    fn read(&mut self, ordinal: u32) -> Result<Vec<String>, StoreError>;
}

/// Databases eligible for values up to `threshold`.
pub struct FortuneTier {
    threshold: u32,
    databases: Vec<Box<dyn FortuneSource>>,
}

impl FortuneTier {
    pub fn new(threshold: u32, databases: Vec<Box<dyn FortuneSource>>) -> Self {
        Self {
            threshold,
            databases,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn total_entries(&self) -> u32 {
        self.databases.iter().map(|db| db.entry_count()).sum()
    }
}

/// The complete tier table.
pub struct FortuneStore {
    /// Sorted by ascending threshold.
    tiers: Vec<FortuneTier>,
}

impl FortuneStore {
    /// Build a store from tiers in any order.
    ///
    /// Every tier must hold at least one entry.
    pub fn new(mut tiers: Vec<FortuneTier>) -> Result<Self, StoreError> {
        if tiers.is_empty() {
            return Err(StoreError::NoTiers);
        }
        if let Some(empty) = tiers.iter().find(|tier| tier.total_entries() == 0) {
            return Err(StoreError::EmptyTier {
                threshold: empty.threshold,
            });
        }
        tiers.sort_by_key(|tier| tier.threshold);
        Ok(Self { tiers })
    }

    /// Open every database named in `config`.
    pub fn open(config: &FortuneConfig) -> Result<Self, StoreError> {
        let mut tiers = Vec::with_capacity(config.tiers.len());
        for tier in &config.tiers {
            let mut databases: Vec<Box<dyn FortuneSource>> =
                Vec::with_capacity(tier.databases.len());
            for name in &tier.databases {
                let db = Strfile::open(config.base_dir.join(name))?;
                debug!(
                    database = %name,
                    entries = db.entry_count(),
                    rotated = db.header().is_rotated(),
                    "Opened fortune database"
                );
                databases.push(Box::new(db));
            }
            tiers.push(FortuneTier::new(tier.threshold, databases));
        }

        let store = Self::new(tiers)?;
        info!(
            tiers = store.tiers.len(),
            entries = store.tiers.iter().map(FortuneTier::total_entries).sum::<u32>(),
            "Fortune store ready"
        );
        Ok(store)
    }

    pub fn tiers(&self) -> &[FortuneTier] {
        &self.tiers
    }

    /// The first tier whose threshold covers `value`, or the highest tier.
    pub fn pick_tier(&self, value: f64) -> &FortuneTier {
        &self.tiers[self.tier_index(value)]
    }

    fn tier_index(&self, value: f64) -> usize {
        self.tiers
            .iter()
            .position(|tier| f64::from(tier.threshold) >= value)
            .unwrap_or(self.tiers.len() - 1)
    }

    /// Draw one entry for `value` and read its lines.
    pub fn pick_fortune<R: Rng + ?Sized>(
        &mut self,
        value: f64,
        rng: &mut R,
    ) -> Result<Vec<String>, StoreError> {
        let index = self.tier_index(value);
        let tier = &mut self.tiers[index];
        let total = tier.total_entries();
        if total == 0 {
            return Err(StoreError::EmptyTier {
                threshold: tier.threshold,
            });
        }

        let draw = rng.random_range(0..total);
        let counts: Vec<u32> = tier.databases.iter().map(|db| db.entry_count()).collect();
        let (db_index, ordinal) =
            locate_entry(&counts, draw).ok_or(StoreError::EmptyTier {
                threshold: tier.threshold,
            })?;

        let db = &mut tier.databases[db_index];
        debug!(
            tier = tier.threshold,
            database = db.name(),
            ordinal,
            "Picked fortune"
        );
        db.read(ordinal)
    }
}

/// Walk `counts` in order, subtracting each from `draw`, until `draw` falls
/// inside one. Returns that position and the ordinal within it.
pub fn locate_entry(counts: &[u32], mut draw: u32) -> Option<(usize, u32)> {
    for (position, count) in counts.iter().copied().enumerate() {
        if draw < count {
            return Some((position, draw));
        }
        draw -= count;
    }
    None
}


#[cfg(test)]
mod tests {
    use super::testing::{MemoryDb, standard_store};
    use super::*;
    use kiosk_sdk::config::TierConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn test_pick_tier() {
        let store = standard_store(1);
        assert_eq!(store.pick_tier(10.0).threshold(), 15);
        assert_eq!(store.pick_tier(999.0).threshold(), 150);
        assert_eq!(store.pick_tier(0.5).threshold(), 7);
        assert_eq!(store.pick_tier(7.0).threshold(), 7);
        assert_eq!(store.pick_tier(7.01).threshold(), 15);
        assert_eq!(store.pick_tier(150.0).threshold(), 150);
    }

    #[test]
    fn test_pick_tier_threshold_covers_value() {
        let store = standard_store(1);
        for value in 0..400u32 {
            let tier = store.pick_tier(f64::from(value));
            if value <= 150 {
                assert!(tier.threshold() >= value);
                // No lower tier would also have covered it.
                assert!(
                    store
                        .tiers()
                        .iter()
                        .filter(|t| t.threshold() < tier.threshold())
                        .all(|t| t.threshold() < value)
                );
            } else {
                assert_eq!(tier.threshold(), 150);
            }
        }
    }

    #[test]
    fn test_tiers_are_sorted() {
        let store = FortuneStore::new(vec![
            FortuneTier::new(30, vec![MemoryDb::numbered("b", 1)]),
            FortuneTier::new(7, vec![MemoryDb::numbered("a", 1)]),
        ])
        .unwrap();
        assert_eq!(store.pick_tier(1.0).threshold(), 7);
    }

    #[test]
    fn test_empty_store_rejected() {
        assert!(matches!(FortuneStore::new(vec![]), Err(StoreError::NoTiers)));
        assert!(matches!(
            FortuneStore::new(vec![FortuneTier::new(7, vec![MemoryDb::numbered("a", 0)])]),
            Err(StoreError::EmptyTier { threshold: 7 })
        ));
    }

    #[test]
    fn test_locate_entry() {
        let counts = [3, 0, 2, 5];
        assert_eq!(locate_entry(&counts, 0), Some((0, 0)));
        assert_eq!(locate_entry(&counts, 2), Some((0, 2)));
        assert_eq!(locate_entry(&counts, 3), Some((2, 0)));
        assert_eq!(locate_entry(&counts, 4), Some((2, 1)));
        assert_eq!(locate_entry(&counts, 5), Some((3, 0)));
        assert_eq!(locate_entry(&counts, 9), Some((3, 4)));
        assert_eq!(locate_entry(&counts, 10), None);
    }

    #[test]
    fn test_selection_is_uniform_per_entry() {
        // Unequal database sizes: 1, 3 and 6 entries, 10 entries in total.
        let mut store = FortuneStore::new(vec![FortuneTier::new(
            7,
            vec![
                MemoryDb::numbered("small", 1),
                MemoryDb::numbered("medium", 3),
                MemoryDb::numbered("large", 6),
            ],
        )])
        .unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let trials = 50_000;
        let mut seen: HashMap<String, u32> = HashMap::new();
        for _ in 0..trials {
            let lines = store.pick_fortune(5.0, &mut rng).unwrap();
            *seen.entry(lines[0].clone()).or_default() += 1;
        }

        assert_eq!(seen.len(), 10);
        let expected = f64::from(trials) / 10.0;
        for (entry, count) in seen {
            let deviation = (f64::from(count) - expected).abs() / expected;
            assert!(deviation < 0.05, "{entry} picked {count} times");
        }
    }

    #[test]
    fn test_pick_fortune_reads_from_chosen_tier() {
        let mut store = FortuneStore::new(vec![
            FortuneTier::new(7, vec![MemoryDb::with_entries("cheap", &[&["cheap"]])]),
            FortuneTier::new(150, vec![MemoryDb::with_entries("dear", &[&["dear"]])]),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(store.pick_fortune(3.0, &mut rng).unwrap(), vec!["cheap"]);
        assert_eq!(store.pick_fortune(80.0, &mut rng).unwrap(), vec!["dear"]);
        assert_eq!(store.pick_fortune(5000.0, &mut rng).unwrap(), vec!["dear"]);
    }

    #[test]
    fn test_open_reports_missing_database() {
        let config = FortuneConfig {
            base_dir: std::env::temp_dir().join("kiosk-core-no-such-dir"),
            tiers: vec![TierConfig::new(7, &["nothing"])],
            ..FortuneConfig::default()
        };
        assert!(matches!(
            FortuneStore::open(&config),
            Err(StoreError::Open { .. })
        ));
    }

    #[test]
    fn test_open_from_disk() {
        let dir = std::env::temp_dir().join(format!("kiosk-core-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let content = "one\n%\ntwo\n%\n";
        std::fs::write(dir.join("tiny"), content).unwrap();
        std::fs::write(
            dir.join("tiny.dat"),
            build_index(content.as_bytes(), b'%', 0),
        )
        .unwrap();

        let config = FortuneConfig {
            base_dir: dir.clone(),
            tiers: vec![TierConfig::new(7, &["tiny"])],
            ..FortuneConfig::default()
        };
        let mut store = FortuneStore::open(&config).unwrap();
        assert_eq!(store.tiers()[0].total_entries(), 2);

        let mut rng = StdRng::seed_from_u64(3);
        let lines = store.pick_fortune(1.0, &mut rng).unwrap();
        assert!(lines == vec!["one"] || lines == vec!["two"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
