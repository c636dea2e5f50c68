/// Points needed per level.
pub const DEFAULT_LEVEL_THRESHOLD: u64 = 500;

/// Maps points to levels: `level = points / threshold + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRules {
    threshold: u64,
}

impl LevelRules {
    /// Returns `None` for a zero threshold.
    pub fn new(threshold: u64) -> Option<Self> {
        (threshold > 0).then_some(Self { threshold })
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn level_for(&self, points: u64) -> u32 {
        u32::try_from(points / self.threshold)
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1)
    }

    /// Points still needed to reach the next level.
    pub fn points_to_next_level(&self, points: u64) -> u64 {
        self.threshold - points % self.threshold
    }
}

impl Default for LevelRules {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LEVEL_THRESHOLD,
        }
    }
}
