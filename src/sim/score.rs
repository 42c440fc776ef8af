//! Running score

/// Additive score counter. There is no way to lower it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    total: u64,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a restored total
    pub fn starting_at(total: u64) -> Self {
        Self { total }
    }

    pub fn credit(&mut self, amount: u64) {
        self.total = self.total.saturating_add(amount);
    }

    pub fn current(&self) -> u64 {
        self.total
    }
}
