//! Per-account stake record.

use serde::{Deserialize, Serialize};
use tavern_types::fixed::amount_str;
use tavern_types::{MathError, Timestamp, Wad};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeInfo {
    /// Principal, in `Keep`.
    #[serde(with = "amount_str")]
    pub amount: u128,
    /// The lock no longer applies at or after this time.
    pub lock_expiry: Timestamp,
    pub lock_multiplier: Wad,
    /// `weighted × reward_per_weighted_stake / SCALE` at the last change.
    #[serde(with = "amount_str")]
    pub reward_debt: u128,
    /// Rewards settled by a stake or unstake but not yet claimed.
    #[serde(with = "amount_str")]
    pub unclaimed: u128,
}

impl Default for StakeInfo {
    fn default() -> Self {
        Self {
            amount: 0,
            lock_expiry: Timestamp::EPOCH,
            lock_multiplier: Wad::ONE,
            reward_debt: 0,
            unclaimed: 0,
        }
    }
}

impl StakeInfo {
    /// `amount × lock_multiplier / SCALE`.
    pub fn weighted(&self) -> Result<u128, MathError> {
        self.lock_multiplier.apply(self.amount)
    }

    pub fn is_locked(&self, now: Timestamp) -> bool {
        self.amount > 0 && now < self.lock_expiry
    }

    /// Seconds of lock left at `now`.
    pub fn lock_remaining(&self, now: Timestamp) -> u64 {
        self.lock_expiry.as_secs().saturating_sub(now.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavern_types::SCALE;

    #[test]
    fn weighted_multiplies_before_dividing() {
        let info = StakeInfo {
            amount: 3,
            lock_multiplier: Wad::from_raw(SCALE + SCALE / 2),
            ..StakeInfo::default()
        };
        // 3 * 1.5 = 4.5 → 4, not 3 / 1e18 * ...
        assert_eq!(info.weighted().unwrap(), 4);
    }

    #[test]
    fn empty_stake_is_never_locked() {
        let info = StakeInfo {
            lock_expiry: Timestamp::new(100),
            ..StakeInfo::default()
        };
        assert!(!info.is_locked(Timestamp::new(50)));
        assert_eq!(info.lock_remaining(Timestamp::new(50)), 50);
    }
}
