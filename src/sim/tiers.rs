//! Fruit tier table
//!
//! Tiers are ordered smallest first; the next tier of `i` is `i + 1`.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// A piece size class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub radius: f32,
    /// Score credited when two pieces of this tier merge away
    pub score_value: u64,
}

impl Tier {
    pub const fn new(radius: f32, score_value: u64) -> Self {
        Self { radius, score_value }
    }
}

/// The classic ten fruits, cherry to watermelon
pub const DEFAULT_TIERS: [Tier; 10] = [
    Tier::new(15.0, 1),
    Tier::new(20.0, 2),
    Tier::new(25.0, 3),
    Tier::new(35.0, 4),
    Tier::new(40.0, 5),
    Tier::new(50.0, 6),
    Tier::new(60.0, 7),
    Tier::new(70.0, 8),
    Tier::new(80.0, 9),
    Tier::new(90.0, 10),
];

/// Validated, immutable tier list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS.to_vec(),
        }
    }
}

impl TierTable {
    /// Build a table, rejecting empty lists, bad radii and zero score values
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(GameError::InvalidTierTable("no tiers".into()));
        }

        for (i, tier) in tiers.iter().enumerate() {
            if !tier.radius.is_finite() || tier.radius <= 0.0 {
                return Err(GameError::InvalidTierTable(format!(
                    "tier {i} radius {} must be positive",
                    tier.radius
                )));
            }
            if tier.score_value == 0 {
                return Err(GameError::InvalidTierTable(format!(
                    "tier {i} score value must be positive"
                )));
            }
        }

        if let Some(i) = tiers.windows(2).position(|w| w[0].radius >= w[1].radius) {
            return Err(GameError::InvalidTierTable(format!(
                "radius of tier {} must exceed tier {i}",
                i + 1
            )));
        }

        Ok(Self { tiers })
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn tier_at(&self, index: usize) -> Result<Tier> {
        self.tiers
            .get(index)
            .copied()
            .ok_or(GameError::OutOfRange {
                index,
                count: self.tiers.len(),
            })
    }

    /// Index of the terminal tier (nothing merges beyond it)
    pub fn last_index(&self) -> usize {
        self.tiers.len() - 1
    }

    /// Tier that two pieces of `index` merge into, if any
    pub fn next(&self, index: usize) -> Option<usize> {
        (index < self.last_index()).then_some(index + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter()
    }
}
