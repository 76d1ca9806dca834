//! Lock-duration multiplier tiers.

use crate::error::StakingError;
use serde::{Deserialize, Serialize};
use tavern_types::{Wad, SCALE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTier {
    pub min_days: u64,
    pub multiplier: Wad,
}

/// Ordered tiers; a lock earns the multiplier of the highest tier it reaches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSchedule {
    pub tiers: Vec<LockTier>,
}

impl Default for LockSchedule {
    fn default() -> Self {
        let tier = |min_days, bps| LockTier {
            min_days,
            multiplier: Wad::from_bps(bps),
        };
        Self {
            tiers: vec![
                tier(0, 10_000),
                tier(30, 11_000),
                tier(90, 12_500),
                tier(180, 15_000),
                tier(365, 20_000),
            ],
        }
    }
}

impl LockSchedule {
    pub fn validate(&self) -> Result<(), StakingError> {
        let first = self
            .tiers
            .first()
            .ok_or_else(|| StakingError::InvalidParams("lock schedule has no tiers".into()))?;
        if first.min_days != 0 || first.multiplier != Wad::ONE {
            return Err(StakingError::InvalidParams(
                "first lock tier must be 0 days at 1.0".into(),
            ));
        }
        for pair in self.tiers.windows(2) {
            if pair[1].min_days <= pair[0].min_days {
                return Err(StakingError::InvalidParams(format!(
                    "lock tier days must increase: {} then {}",
                    pair[0].min_days, pair[1].min_days
                )));
            }
            if pair[1].multiplier < pair[0].multiplier {
                return Err(StakingError::InvalidParams(format!(
                    "lock tier multipliers must not decrease: {} then {}",
                    pair[0].multiplier, pair[1].multiplier
                )));
            }
        }
        Ok(())
    }

    /// Multiplier for a lock of `lock_days`.
    pub fn multiplier_for(&self, lock_days: u64) -> Wad {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.min_days <= lock_days)
            .map(|t| t.multiplier)
            .unwrap_or(Wad::from_raw(SCALE))
    }
}
