//! Coin acceptor denominations.

use serde::{Deserialize, Serialize};

/// One denomination: the coin acceptor reports `pulses` pulses for a coin
/// worth `value` minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinValue {
    pub pulses: u32,
    pub value: u32,
}

/// Lookup table from pulse count to denomination.
///
/// Must cover every pulse count the deployed acceptor can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinTable {
    denominations: Vec<CoinValue>,
}

impl CoinTable {
    pub fn new(denominations: Vec<CoinValue>) -> Self {
        Self { denominations }
    }

    /// Value in minor units of a coin reported as `pulses` pulses.
    pub fn value_of(&self, pulses: u32) -> Option<u32> {
        self.denominations
            .iter()
            .find(|coin| coin.pulses == pulses)
            .map(|coin| coin.value)
    }

    pub fn denominations(&self) -> &[CoinValue] {
        &self.denominations
    }
}

impl Default for CoinTable {
    /// The six-channel acceptor: 5p, 10p, 20p, 50p, £1, £2.
    fn default() -> Self {
        let table = [(1, 5), (2, 10), (3, 20), (4, 50), (5, 100), (6, 200)];
        Self::new(
            table
                .into_iter()
                .map(|(pulses, value)| CoinValue { pulses, value })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_lookup() {
        let table = CoinTable::default();
        assert_eq!(table.value_of(1), Some(5));
        assert_eq!(table.value_of(3), Some(20));
        assert_eq!(table.value_of(6), Some(200));
        assert_eq!(table.value_of(0), None);
        assert_eq!(table.value_of(7), None);
    }
}
