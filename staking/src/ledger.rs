//! The staking ledger.
//!
//! All state changes follow the same shape: settle the account's pending
//! reward into `unclaimed` against the old weighted stake, compute the new
//! stake and totals with checked arithmetic, move value through the
//! [`Settlement`], then commit and re-checkpoint `reward_debt`.
//!
//! A lock that has run out keeps its multiplier until something pokes the
//! account. `stake`, `unstake` and `claim_rewards` poke their own account
//! first; [`StakingLedger::expire_locks`] pokes everyone and should run
//! before each distribution.

use crate::error::StakingError;
use crate::event::StakingEvent;
use crate::policy::EarlyExitPolicy;
use crate::schedule::LockSchedule;
use crate::stake::StakeInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tavern_types::fixed::amount_str;
use tavern_types::{
    bps_of, mul_div, Address, Asset, MathError, Settlement, Timestamp, Wad, BPS_DENOMINATOR,
    SCALE, SECS_PER_DAY,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    #[serde(default)]
    pub schedule: LockSchedule,
    #[serde(default = "default_max_lock_days")]
    pub max_lock_days: u64,
    #[serde(default)]
    pub early_exit: EarlyExitPolicy,
}

fn default_max_lock_days() -> u64 {
    4 * 365
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            schedule: LockSchedule::default(),
            max_lock_days: default_max_lock_days(),
            early_exit: EarlyExitPolicy::default(),
        }
    }
}

impl StakingParams {
    pub fn validate(&self) -> Result<(), StakingError> {
        self.schedule.validate()?;
        if let EarlyExitPolicy::Penalize { penalty_bps } = self.early_exit {
            if penalty_bps as u128 > BPS_DENOMINATOR {
                return Err(StakingError::InvalidParams(format!(
                    "penalty of {penalty_bps} bps exceeds {BPS_DENOMINATOR}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakingLedger {
    params: StakingParams,
    operator: Address,
    stakes: HashMap<Address, StakeInfo>,
    #[serde(with = "amount_str")]
    total_staked: u128,
    #[serde(with = "amount_str")]
    total_weighted: u128,
    /// Cumulative reward per unit of weighted stake, scaled by `SCALE`.
    #[serde(with = "amount_str")]
    reward_per_weighted: u128,
    /// Rewards not yet folded into the accumulator.
    #[serde(with = "amount_str")]
    undistributed: u128,
    #[serde(with = "amount_str")]
    penalties_collected: u128,
    paused: bool,
}

impl StakingLedger {
    pub fn new(params: StakingParams, operator: Address) -> Result<Self, StakingError> {
        params.validate()?;
        Ok(Self {
            params,
            operator,
            stakes: HashMap::new(),
            total_staked: 0,
            total_weighted: 0,
            reward_per_weighted: 0,
            undistributed: 0,
            penalties_collected: 0,
            paused: false,
        })
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    /// The account's stake; accounts that never staked read as empty.
    pub fn user_stake(&self, account: &Address) -> StakeInfo {
        self.stakes.get(account).cloned().unwrap_or_default()
    }

    pub fn stakes(&self) -> impl Iterator<Item = (&Address, &StakeInfo)> {
        self.stakes.iter()
    }

    pub fn total_weighted_stake(&self) -> u128 {
        self.total_weighted
    }

    pub fn total_staked(&self) -> u128 {
        self.total_staked
    }

    pub fn reward_per_weighted_stake(&self) -> u128 {
        self.reward_per_weighted
    }

    pub fn undistributed(&self) -> u128 {
        self.undistributed
    }

    pub fn penalties_collected(&self) -> u128 {
        self.penalties_collected
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// What `claim_rewards` would pay right now. Never fails; an account
    /// that cannot be evaluated reads as zero.
    pub fn pending_rewards(&self, account: &Address) -> u128 {
        self.stakes
            .get(account)
            .and_then(|info| self.claimable(info).ok())
            .unwrap_or(0)
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Stake `amount` of `Keep`, locking for `lock_days` (0 = unlocked).
    ///
    /// A re-stake never shortens an active lock or lowers its multiplier.
    pub fn stake(
        &mut self,
        account: Address,
        amount: u128,
        lock_days: u64,
        now: Timestamp,
        settlement: &mut dyn Settlement,
    ) -> Result<StakingEvent, StakingError> {
        if self.paused {
            return Err(StakingError::Paused);
        }
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        if lock_days > self.params.max_lock_days {
            return Err(StakingError::LockTooLong {
                requested: lock_days,
                max: self.params.max_lock_days,
            });
        }
        self.poke(account, now)?;

        let info = self.user_stake(&account);
        let unclaimed = self.claimable(&info)?;
        let still_locked = info.is_locked(now);

        let requested_expiry = now.plus_secs(lock_days * SECS_PER_DAY);
        let scheduled = self.params.schedule.multiplier_for(lock_days);
        let (lock_expiry, lock_multiplier) = if still_locked {
            (
                info.lock_expiry.max(requested_expiry),
                info.lock_multiplier.max(scheduled),
            )
        } else {
            (requested_expiry, scheduled)
        };

        let next = StakeInfo {
            amount: info.amount.checked_add(amount).ok_or(MathError::Overflow)?,
            lock_expiry,
            lock_multiplier,
            reward_debt: 0,
            unclaimed,
        };
        let (next, total_weighted) = self.rebalance(&info, next)?;
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;

        settlement.collect(Asset::Keep, &account, amount)?;

        self.stakes.insert(account, next);
        self.total_weighted = total_weighted;
        self.total_staked = total_staked;
        Ok(StakingEvent::Staked {
            account,
            amount,
            lock_expiry,
            lock_multiplier,
        })
    }

    /// Withdraw `amount` of principal.
    ///
    /// Locked principal follows the configured [`EarlyExitPolicy`]. A full
    /// withdrawal zeroes the record but keeps settled rewards claimable.
    pub fn unstake(
        &mut self,
        account: Address,
        amount: u128,
        now: Timestamp,
        settlement: &mut dyn Settlement,
    ) -> Result<StakingEvent, StakingError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        self.poke(account, now)?;
        let info = self.user_stake(&account);
        if amount > info.amount {
            return Err(StakingError::InsufficientStake {
                requested: amount,
                available: info.amount,
            });
        }
        let penalty = if info.is_locked(now) {
            match self.params.early_exit {
                EarlyExitPolicy::Reject => {
                    return Err(StakingError::LockActive {
                        remaining: info.lock_remaining(now),
                    })
                }
                EarlyExitPolicy::Penalize { penalty_bps } => bps_of(amount, penalty_bps)?,
            }
        } else {
            0
        };
        let returned = amount - penalty;

        let unclaimed = self.claimable(&info)?;
        let remaining = info.amount - amount;
        let next = if remaining == 0 {
            StakeInfo {
                unclaimed,
                ..StakeInfo::default()
            }
        } else {
            StakeInfo {
                amount: remaining,
                unclaimed,
                ..info.clone()
            }
        };
        let (next, total_weighted) = self.rebalance(&info, next)?;
        let penalties = self
            .penalties_collected
            .checked_add(penalty)
            .ok_or(MathError::Overflow)?;

        if returned > 0 {
            settlement.disburse(Asset::Keep, &account, returned)?;
        }

        self.stakes.insert(account, next);
        self.total_weighted = total_weighted;
        self.total_staked = self.total_staked.saturating_sub(amount);
        self.penalties_collected = penalties;
        Ok(StakingEvent::Unstaked {
            account,
            amount: returned,
            penalty,
        })
    }

    /// Pay out settled plus live rewards. Returns 0 when nothing is owed.
    pub fn claim_rewards(
        &mut self,
        account: Address,
        now: Timestamp,
        settlement: &mut dyn Settlement,
    ) -> Result<u128, StakingError> {
        self.poke(account, now)?;
        let info = match self.stakes.get(&account) {
            Some(info) => info.clone(),
            None => return Ok(0),
        };
        let amount = self.claimable(&info)?;
        if amount == 0 {
            return Ok(0);
        }
        let reward_debt = self.debt_for(info.weighted()?)?;

        settlement.disburse(Asset::Payment, &account, amount)?;

        if let Some(entry) = self.stakes.get_mut(&account) {
            entry.unclaimed = 0;
            entry.reward_debt = reward_debt;
        }
        Ok(amount)
    }

    /// Reset `account`'s lock multiplier to the base tier once the lock has
    /// run out, settling rewards earned at the old weight first.
    ///
    /// Anyone may call this. Returns `None` when there was nothing to reset.
    pub fn poke(
        &mut self,
        account: Address,
        now: Timestamp,
    ) -> Result<Option<StakingEvent>, StakingError> {
        let Some(info) = self.stakes.get(&account) else {
            return Ok(None);
        };
        if !self.lock_lapsed(info, now) {
            return Ok(None);
        }
        let lock_multiplier = self.base_multiplier();
        let next = StakeInfo {
            lock_multiplier,
            unclaimed: self.claimable(info)?,
            ..info.clone()
        };
        let (next, total_weighted) = self.rebalance(info, next)?;

        self.stakes.insert(account, next);
        self.total_weighted = total_weighted;
        Ok(Some(StakingEvent::LockExpired {
            account,
            lock_multiplier,
        }))
    }

    /// [`Self::poke`] every account whose lock has run out.
    pub fn expire_locks(&mut self, now: Timestamp) -> Result<Vec<StakingEvent>, StakingError> {
        let lapsed: Vec<Address> = self
            .stakes
            .iter()
            .filter(|(_, info)| self.lock_lapsed(info, now))
            .map(|(account, _)| *account)
            .collect();
        let mut events = Vec::with_capacity(lapsed.len());
        for account in lapsed {
            events.extend(self.poke(account, now)?);
        }
        Ok(events)
    }

    /// Distribute `amount` of `Payment` (already in custody) across weighted stake.
    ///
    /// With nobody staked the amount waits in `undistributed`. Division dust
    /// also stays there for the next distribution.
    pub fn notify_reward(&mut self, amount: u128) -> Result<StakingEvent, StakingError> {
        let pool = self
            .undistributed
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        if self.total_weighted == 0 {
            self.undistributed = pool;
            return Ok(StakingEvent::RewardNotified {
                amount,
                reward_per_weighted_stake: self.reward_per_weighted,
            });
        }
        let delta = mul_div(pool, SCALE, self.total_weighted)?;
        let distributed = mul_div(delta, self.total_weighted, SCALE)?;
        let reward_per_weighted = self
            .reward_per_weighted
            .checked_add(delta)
            .ok_or(MathError::Overflow)?;

        self.reward_per_weighted = reward_per_weighted;
        self.undistributed = pool - distributed;
        Ok(StakingEvent::RewardNotified {
            amount,
            reward_per_weighted_stake: reward_per_weighted,
        })
    }

    pub fn set_paused(&mut self, caller: Address, paused: bool) -> Result<StakingEvent, StakingError> {
        if caller != self.operator {
            return Err(StakingError::Unauthorized);
        }
        self.paused = paused;
        Ok(StakingEvent::PauseChanged { paused, by: caller })
    }

    /// Pay collected early-exit penalties to the operator.
    pub fn withdraw_penalties(
        &mut self,
        caller: Address,
        settlement: &mut dyn Settlement,
    ) -> Result<u128, StakingError> {
        if caller != self.operator {
            return Err(StakingError::Unauthorized);
        }
        let amount = self.penalties_collected;
        if amount == 0 {
            return Ok(0);
        }
        settlement.disburse(Asset::Keep, &caller, amount)?;
        self.penalties_collected = 0;
        Ok(amount)
    }

    // ── Internal ────────────────────────────────────────────────────────

    fn base_multiplier(&self) -> Wad {
        self.params.schedule.multiplier_for(0)
    }

    fn lock_lapsed(&self, info: &StakeInfo, now: Timestamp) -> bool {
        info.amount > 0 && !info.is_locked(now) && info.lock_multiplier != self.base_multiplier()
    }

    fn debt_for(&self, weighted: u128) -> Result<u128, MathError> {
        mul_div(weighted, self.reward_per_weighted, SCALE)
    }

    /// `unclaimed + weighted × acc / SCALE − reward_debt`.
    fn claimable(&self, info: &StakeInfo) -> Result<u128, MathError> {
        let gross = self.debt_for(info.weighted()?)?;
        info.unclaimed
            .checked_add(gross.saturating_sub(info.reward_debt))
            .ok_or(MathError::Overflow)
    }

    /// Checkpoint `next`'s debt and compute the new weighted total.
    fn rebalance(
        &self,
        prev: &StakeInfo,
        mut next: StakeInfo,
    ) -> Result<(StakeInfo, u128), MathError> {
        let old_weighted = prev.weighted()?;
        let new_weighted = next.weighted()?;
        next.reward_debt = self.debt_for(new_weighted)?;
        let total = self
            .total_weighted
            .checked_sub(old_weighted)
            .and_then(|t| t.checked_add(new_weighted))
            .ok_or(MathError::Overflow)?;
        Ok((next, total))
    }
}
