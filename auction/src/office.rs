//! The office: a held slot that pays its holder a per-second emission.
//!
//! Taking the office pays the current decayed price in `Payment`. The
//! winning bid is split between the outgoing holder, the cellar pot, the
//! staking ledger and the treasury. While holding, the holder accrues
//! `dps` units of `Keep` per second; the accrual is settled into a pull
//! credit whenever the holder leaves.
//!
//! Every mutating call validates completely, then talks to the
//! [`Settlement`], then commits. `slot0.locked` is raised for the
//! duration of the settlement call.

use crate::cooldown::CooldownBook;
use crate::error::AuctionError;
use crate::event::AuctionEvent;
use crate::params::OfficeParams;
use crate::slot::{Slot0, SlotAuction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tavern_types::fixed::amount_str;
use tavern_types::{Address, Asset, MathError, Settlement, Timestamp};

/// What the office owes a past (or current) holder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderCredit {
    /// Settled `dps` accrual, paid in `Keep`.
    #[serde(with = "amount_str")]
    pub accrued: u128,
    /// Previous-holder fee shares, paid in `Payment`.
    #[serde(with = "amount_str")]
    pub proceeds: u128,
}

/// A bid for the office.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TakeOffice {
    pub bidder: Address,
    pub epoch_id: u64,
    pub deadline: Timestamp,
    pub max_price: u128,
    pub uri: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDistribution {
    #[serde(with = "amount_str")]
    pub previous_holder: u128,
    #[serde(with = "amount_str")]
    pub pot: u128,
    #[serde(with = "amount_str")]
    pub staking: u128,
    #[serde(with = "amount_str")]
    pub treasury: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TakeReceipt {
    pub price_paid: u128,
    pub epoch_id: u64,
    pub previous_holder: Option<Address>,
    /// Accrual settled to the previous holder.
    pub settled_accrual: u128,
    pub fees: FeeDistribution,
    pub event: AuctionEvent,
}

/// Result of `check_max_hold_time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldStatus {
    pub has_exceeded: bool,
    pub time_held: u64,
    /// Seconds until eviction becomes callable; zero once it is.
    pub time_remaining: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfficeAuction {
    params: OfficeParams,
    operator: Address,
    genesis: Timestamp,
    slot: SlotAuction,
    /// Accrual for the current holder is counted from here.
    accrual_checkpoint: Timestamp,
    credits: HashMap<Address, HolderCredit>,
    cooldowns: CooldownBook,
    paused: bool,
    #[serde(with = "amount_str")]
    treasury: u128,
}

impl OfficeAuction {
    pub fn new(
        params: OfficeParams,
        operator: Address,
        genesis: Timestamp,
    ) -> Result<Self, AuctionError> {
        params.validate()?;
        let dps = params.dps.dps_at(genesis, genesis);
        let slot = SlotAuction::new(params.price.clone(), genesis, dps);
        let cooldowns = CooldownBook::new(params.cooldown_secs);
        Ok(Self {
            params,
            operator,
            genesis,
            slot,
            accrual_checkpoint: genesis,
            credits: HashMap::new(),
            cooldowns,
            paused: false,
            treasury: 0,
        })
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn slot0(&self) -> &Slot0 {
        &self.slot.slot0
    }

    pub fn params(&self) -> &OfficeParams {
        &self.params
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    pub fn price(&self, now: Timestamp) -> u128 {
        self.slot.price_at(now)
    }

    pub fn dps(&self) -> u128 {
        self.slot.slot0.dps
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn treasury_balance(&self) -> u128 {
        self.treasury
    }

    pub fn credit_of(&self, account: &Address) -> Option<&HolderCredit> {
        self.credits.get(account)
    }

    pub fn can_claim(&self, account: &Address, now: Timestamp) -> (bool, u64) {
        self.cooldowns.can_claim(account, now)
    }

    /// Addresses with a cooldown entry, expired or not.
    pub fn cooldown_entries(&self) -> usize {
        self.cooldowns.len()
    }

    /// Who takes the office on eviction; `None` leaves it vacant.
    pub fn fallback_holder(&self) -> Option<Address> {
        let fallback = self.params.fallback_holder.unwrap_or(self.operator);
        (!fallback.is_zero()).then_some(fallback)
    }

    /// Accrual the current holder has earned since the last checkpoint.
    pub fn live_accrual(&self, now: Timestamp) -> Result<u128, MathError> {
        if self.slot.slot0.holder.is_none() {
            return Ok(0);
        }
        let secs = self.accrual_checkpoint.elapsed_since(now) as u128;
        self.slot.slot0.dps.checked_mul(secs).ok_or(MathError::Overflow)
    }

    /// Settled plus live accrual `account` could claim at `now`.
    pub fn claimable_accrual(&self, account: &Address, now: Timestamp) -> Result<u128, MathError> {
        let settled = self.credits.get(account).map_or(0, |c| c.accrued);
        let live = if self.slot.slot0.holder == Some(*account) {
            self.live_accrual(now)?
        } else {
            0
        };
        settled.checked_add(live).ok_or(MathError::Overflow)
    }

    /// Eviction eligibility. A vacant office reports all zeros.
    pub fn check_max_hold_time(&self, now: Timestamp) -> HoldStatus {
        if self.slot.slot0.holder.is_none() {
            return HoldStatus {
                has_exceeded: false,
                time_held: 0,
                time_remaining: 0,
            };
        }
        let held = self.slot.slot0.start_time.elapsed_since(now);
        let max = self.params.max_hold_secs;
        let has_exceeded = held > max;
        HoldStatus {
            has_exceeded,
            time_held: held,
            time_remaining: if has_exceeded {
                0
            } else {
                max.saturating_add(1) - held
            },
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Pay the current price and take the office.
    pub fn take_office(
        &mut self,
        bid: TakeOffice,
        now: Timestamp,
        settlement: &mut dyn Settlement,
    ) -> Result<TakeReceipt, AuctionError> {
        if self.slot.slot0.locked {
            return Err(AuctionError::Reentrant);
        }
        if self.paused {
            return Err(AuctionError::Paused);
        }
        let price = self
            .slot
            .quote(bid.epoch_id, bid.deadline, bid.max_price, now)?;
        let previous = self.slot.slot0.holder;
        if previous == Some(bid.bidder) {
            return Err(AuctionError::AlreadyHolder);
        }
        self.cooldowns.check(&bid.bidder, now)?;

        let (to_previous, pot, staking, treasury) =
            self.params.fees.split(price, previous.is_some())?;
        let settled_accrual = self.live_accrual(now)?;
        let previous_credit = match previous {
            Some(holder) => Some((holder, self.credited(&holder, settled_accrual, to_previous)?)),
            None => None,
        };
        let treasury_after = self
            .treasury
            .checked_add(treasury)
            .ok_or(MathError::Overflow)?;
        let epoch_id = self.slot.next_epoch()?;
        let init_price = self.slot.params.next_init_price(price);
        let dps = self.params.dps.dps_at(self.genesis, now);

        if price > 0 {
            self.slot.slot0.locked = true;
            let paid = settlement.collect(Asset::Payment, &bid.bidder, price);
            self.slot.slot0.locked = false;
            paid?;
        }

        self.cooldowns.prune(now);
        if let Some((holder, credit)) = previous_credit {
            self.credits.insert(holder, credit);
            self.cooldowns.start(holder, now);
        }
        self.treasury = treasury_after;
        self.accrual_checkpoint = now;
        self.slot
            .restart(epoch_id, Some(bid.bidder), init_price, dps, bid.uri, now);

        Ok(TakeReceipt {
            price_paid: price,
            epoch_id,
            previous_holder: previous,
            settled_accrual: if previous.is_some() { settled_accrual } else { 0 },
            fees: FeeDistribution {
                previous_holder: to_previous,
                pot,
                staking,
                treasury,
            },
            event: AuctionEvent::OfficeTaken {
                epoch_id,
                holder: bid.bidder,
                previous_holder: previous,
                price_paid: price,
                at: now,
            },
        })
    }

    /// Pay out `caller`'s `dps` accrual, including the live window if it
    /// holds the office. Returns 0 when there is nothing left to pay.
    pub fn claim_accrued_rewards(
        &mut self,
        caller: Address,
        now: Timestamp,
        settlement: &mut dyn Settlement,
    ) -> Result<u128, AuctionError> {
        let is_holder = self.slot.slot0.holder == Some(caller);
        if !is_holder && !self.credits.contains_key(&caller) {
            return Err(AuctionError::NotEntitled);
        }
        let live = if is_holder { self.live_accrual(now)? } else { 0 };
        let settled = self.credits.get(&caller).map_or(0, |c| c.accrued);
        let amount = settled.checked_add(live).ok_or(MathError::Overflow)?;
        if amount == 0 {
            return Ok(0);
        }

        settlement.disburse(Asset::Keep, &caller, amount)?;

        self.credits.entry(caller).or_default().accrued = 0;
        if is_holder {
            self.accrual_checkpoint = now;
        }
        Ok(amount)
    }

    /// Pay out `caller`'s accumulated previous-holder fee shares.
    pub fn withdraw_proceeds(
        &mut self,
        caller: Address,
        settlement: &mut dyn Settlement,
    ) -> Result<u128, AuctionError> {
        let amount = match self.credits.get(&caller) {
            Some(credit) => credit.proceeds,
            None => return Err(AuctionError::NotEntitled),
        };
        if amount == 0 {
            return Ok(0);
        }
        settlement.disburse(Asset::Payment, &caller, amount)?;
        if let Some(credit) = self.credits.get_mut(&caller) {
            credit.proceeds = 0;
        }
        Ok(amount)
    }

    /// The holder walks away. The office opens at the current price.
    pub fn relinquish(
        &mut self,
        caller: Address,
        now: Timestamp,
    ) -> Result<AuctionEvent, AuctionError> {
        if self.slot.slot0.locked {
            return Err(AuctionError::Reentrant);
        }
        if self.slot.slot0.holder != Some(caller) {
            return Err(AuctionError::NotHolder);
        }
        let (epoch_id, init_price) = self.vacate_terms(now)?;
        let credit = self.credited(&caller, self.live_accrual(now)?, 0)?;
        let dps = self.params.dps.dps_at(self.genesis, now);

        self.credits.insert(caller, credit);
        self.cooldowns.prune(now);
        self.cooldowns.start(caller, now);
        self.accrual_checkpoint = now;
        self.slot
            .restart(epoch_id, None, init_price, dps, String::new(), now);

        Ok(AuctionEvent::OfficeRelinquished {
            epoch_id,
            holder: caller,
            at: now,
        })
    }

    /// Force out a holder that has overstayed `max_hold_secs`. Callable by anyone.
    pub fn evict(&mut self, caller: Address, now: Timestamp) -> Result<AuctionEvent, AuctionError> {
        if self.slot.slot0.locked {
            return Err(AuctionError::Reentrant);
        }
        if self.paused && self.params.eviction_pausable {
            return Err(AuctionError::Paused);
        }
        let evicted = self.slot.slot0.holder.ok_or(AuctionError::NoHolder)?;
        let status = self.check_max_hold_time(now);
        if !status.has_exceeded {
            return Err(AuctionError::HoldTimeNotExceeded {
                remaining: status.time_remaining,
            });
        }
        let (epoch_id, init_price) = self.vacate_terms(now)?;
        let credit = self.credited(&evicted, self.live_accrual(now)?, 0)?;
        let dps = self.params.dps.dps_at(self.genesis, now);
        let fallback = self.fallback_holder();

        self.credits.insert(evicted, credit);
        self.cooldowns.prune(now);
        self.cooldowns.start(evicted, now);
        self.accrual_checkpoint = now;
        self.slot
            .restart(epoch_id, fallback, init_price, dps, String::new(), now);

        Ok(AuctionEvent::OfficeEvicted {
            epoch_id,
            evicted,
            fallback,
            caller,
            at: now,
        })
    }

    pub fn set_paused(&mut self, caller: Address, paused: bool) -> Result<AuctionEvent, AuctionError> {
        if caller != self.operator {
            return Err(AuctionError::Unauthorized);
        }
        self.paused = paused;
        Ok(AuctionEvent::PauseChanged { paused, by: caller })
    }

    /// Pay the accumulated treasury share to the operator.
    pub fn withdraw_treasury(
        &mut self,
        caller: Address,
        settlement: &mut dyn Settlement,
    ) -> Result<u128, AuctionError> {
        if caller != self.operator {
            return Err(AuctionError::Unauthorized);
        }
        let amount = self.treasury;
        if amount == 0 {
            return Ok(0);
        }
        settlement.disburse(Asset::Payment, &caller, amount)?;
        self.treasury = 0;
        Ok(amount)
    }

    // ── Internal ────────────────────────────────────────────────────────

    /// `account`'s credit after adding `accrued` and `proceeds`.
    fn credited(
        &self,
        account: &Address,
        accrued: u128,
        proceeds: u128,
    ) -> Result<HolderCredit, MathError> {
        let current = self.credits.get(account).cloned().unwrap_or_default();
        Ok(HolderCredit {
            accrued: current.accrued.checked_add(accrued).ok_or(MathError::Overflow)?,
            proceeds: current.proceeds.checked_add(proceeds).ok_or(MathError::Overflow)?,
        })
    }

    /// Epoch and opening price for an unpaid hand-over.
    fn vacate_terms(&self, now: Timestamp) -> Result<(u64, u128), AuctionError> {
        let epoch_id = self.slot.next_epoch()?;
        let init_price = self
            .slot
            .price_at(now)
            .max(self.slot.params.min_init_price);
        Ok((epoch_id, init_price))
    }
}
