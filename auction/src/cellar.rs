//! The cellar: a pot of `Payment` won outright by whoever raids it.
//!
//! Raiders pay the decayed price in `Lp`. The pot fills from the office's
//! fee routing and from direct deposits. Winnings are pull-paid through
//! [`CellarAuction::harvest`].

use crate::cooldown::CooldownBook;
use crate::error::AuctionError;
use crate::event::AuctionEvent;
use crate::params::CellarParams;
use crate::slot::{Slot0, SlotAuction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tavern_types::fixed::amount_str;
use tavern_types::{Address, Asset, MathError, Settlement, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raid {
    pub raider: Address,
    pub epoch_id: u64,
    pub deadline: Timestamp,
    /// Most `Lp` the raider will pay.
    pub max_payment: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaidReceipt {
    pub price_paid: u128,
    pub pot_won: u128,
    pub epoch_id: u64,
    pub event: AuctionEvent,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CellarAuction {
    params: CellarParams,
    operator: Address,
    slot: SlotAuction,
    #[serde(with = "amount_str")]
    pot: u128,
    winnings: HashMap<Address, u128>,
    cooldowns: CooldownBook,
    paused: bool,
    /// Total `Lp` taken in by raids.
    #[serde(with = "amount_str")]
    lp_collected: u128,
}

impl CellarAuction {
    pub fn new(
        params: CellarParams,
        operator: Address,
        genesis: Timestamp,
    ) -> Result<Self, AuctionError> {
        params.validate()?;
        let slot = SlotAuction::new(params.price.clone(), genesis, 0);
        let cooldowns = CooldownBook::new(params.cooldown_secs);
        Ok(Self {
            params,
            operator,
            slot,
            pot: 0,
            winnings: HashMap::new(),
            cooldowns,
            paused: false,
            lp_collected: 0,
        })
    }

    pub fn slot0(&self) -> &Slot0 {
        &self.slot.slot0
    }

    pub fn params(&self) -> &CellarParams {
        &self.params
    }

    pub fn price(&self, now: Timestamp) -> u128 {
        self.slot.price_at(now)
    }

    pub fn pot(&self) -> u128 {
        self.pot
    }

    pub fn lp_collected(&self) -> u128 {
        self.lp_collected
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn winnings_of(&self, account: &Address) -> u128 {
        self.winnings.get(account).copied().unwrap_or(0)
    }

    pub fn can_claim(&self, account: &Address, now: Timestamp) -> (bool, u64) {
        self.cooldowns.can_claim(account, now)
    }

    pub fn cooldown_entries(&self) -> usize {
        self.cooldowns.len()
    }

    /// Add fees the caller already holds in custody.
    pub fn credit_pot(&mut self, amount: u128) -> Result<AuctionEvent, AuctionError> {
        self.pot = self.pot.checked_add(amount).ok_or(MathError::Overflow)?;
        Ok(AuctionEvent::PotDeposited {
            from: None,
            amount,
            pot: self.pot,
        })
    }

    /// Pull `amount` of `Payment` from `from` into the pot.
    pub fn deposit_to_pot(
        &mut self,
        from: Address,
        amount: u128,
        settlement: &mut dyn Settlement,
    ) -> Result<AuctionEvent, AuctionError> {
        let pot = self.pot.checked_add(amount).ok_or(MathError::Overflow)?;
        if amount > 0 {
            settlement.collect(Asset::Payment, &from, amount)?;
        }
        self.pot = pot;
        Ok(AuctionEvent::PotDeposited {
            from: Some(from),
            amount,
            pot,
        })
    }

    /// Pay the current price in `Lp` and take the whole pot.
    pub fn raid(
        &mut self,
        raid: Raid,
        now: Timestamp,
        settlement: &mut dyn Settlement,
    ) -> Result<RaidReceipt, AuctionError> {
        if self.slot.slot0.locked {
            return Err(AuctionError::Reentrant);
        }
        if self.paused {
            return Err(AuctionError::Paused);
        }
        let price = self
            .slot
            .quote(raid.epoch_id, raid.deadline, raid.max_payment, now)?;
        let previous = self.slot.slot0.holder;
        if previous == Some(raid.raider) {
            return Err(AuctionError::AlreadyHolder);
        }
        self.cooldowns.check(&raid.raider, now)?;
        if self.pot == 0 {
            return Err(AuctionError::EmptyPot);
        }

        let pot_won = self.pot;
        let winnings = self
            .winnings_of(&raid.raider)
            .checked_add(pot_won)
            .ok_or(MathError::Overflow)?;
        let lp_collected = self
            .lp_collected
            .checked_add(price)
            .ok_or(MathError::Overflow)?;
        let epoch_id = self.slot.next_epoch()?;
        let init_price = self.slot.params.next_init_price(price);

        if price > 0 {
            self.slot.slot0.locked = true;
            let paid = settlement.collect(Asset::Lp, &raid.raider, price);
            self.slot.slot0.locked = false;
            paid?;
        }

        self.cooldowns.prune(now);
        if let Some(prev) = previous {
            self.cooldowns.start(prev, now);
        }
        self.winnings.insert(raid.raider, winnings);
        self.pot = 0;
        self.lp_collected = lp_collected;
        self.slot
            .restart(epoch_id, Some(raid.raider), init_price, 0, String::new(), now);

        Ok(RaidReceipt {
            price_paid: price,
            pot_won,
            epoch_id,
            event: AuctionEvent::CellarRaided {
                epoch_id,
                raider: raid.raider,
                price_paid: price,
                pot: pot_won,
                at: now,
            },
        })
    }

    /// Pay out everything `caller` has won.
    pub fn harvest(
        &mut self,
        caller: Address,
        settlement: &mut dyn Settlement,
    ) -> Result<u128, AuctionError> {
        let amount = match self.winnings.get(&caller) {
            Some(amount) => *amount,
            None => return Err(AuctionError::NotEntitled),
        };
        if amount == 0 {
            return Ok(0);
        }
        settlement.disburse(Asset::Payment, &caller, amount)?;
        self.winnings.insert(caller, 0);
        Ok(amount)
    }

    pub fn set_paused(&mut self, caller: Address, paused: bool) -> Result<AuctionEvent, AuctionError> {
        if caller != self.operator {
            return Err(AuctionError::Unauthorized);
        }
        self.paused = paused;
        Ok(AuctionEvent::PauseChanged { paused, by: caller })
    }
}
