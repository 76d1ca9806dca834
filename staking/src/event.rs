use serde::{Deserialize, Serialize};
use tavern_types::fixed::amount_str;
use tavern_types::{Address, Timestamp, Wad};

/// A committed staking transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StakingEvent {
    Staked {
        account: Address,
        #[serde(with = "amount_str")]
        amount: u128,
        lock_expiry: Timestamp,
        lock_multiplier: Wad,
    },
    Unstaked {
        account: Address,
        #[serde(with = "amount_str")]
        amount: u128,
        #[serde(with = "amount_str")]
        penalty: u128,
    },
    RewardsClaimed {
        account: Address,
        #[serde(with = "amount_str")]
        amount: u128,
    },
    /// A run-out lock fell back to the base multiplier.
    LockExpired {
        account: Address,
        lock_multiplier: Wad,
    },
    RewardNotified {
        #[serde(with = "amount_str")]
        amount: u128,
        #[serde(with = "amount_str")]
        reward_per_weighted_stake: u128,
    },
    PauseChanged {
        paused: bool,
        by: Address,
    },
}

impl StakingEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            StakingEvent::Staked { .. } => "staked",
            StakingEvent::Unstaked { .. } => "unstaked",
            StakingEvent::RewardsClaimed { .. } => "staking_rewards_claimed",
            StakingEvent::LockExpired { .. } => "lock_expired",
            StakingEvent::RewardNotified { .. } => "reward_notified",
            StakingEvent::PauseChanged { .. } => "staking_pause_changed",
        }
    }
}
