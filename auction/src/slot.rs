//! The slot core shared by the office and the cellar.

use crate::error::AuctionError;
use crate::params::PriceParams;
use serde::{Deserialize, Serialize};
use tavern_types::fixed::amount_str;
use tavern_types::{Address, Timestamp};

/// Contended slot state. The current price is derived, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot0 {
    /// Set while a transition is waiting on settlement.
    pub locked: bool,
    pub epoch_id: u64,
    #[serde(with = "amount_str")]
    pub init_price: u128,
    pub start_time: Timestamp,
    /// Accrual rate paid to the holder (office only; zero for the cellar).
    #[serde(with = "amount_str")]
    pub dps: u128,
    pub holder: Option<Address>,
    pub uri: String,
}

impl Slot0 {
    pub fn genesis(init_price: u128, now: Timestamp, dps: u128) -> Self {
        Self {
            locked: false,
            epoch_id: 0,
            init_price,
            start_time: now,
            dps,
            holder: None,
            uri: String::new(),
        }
    }
}

/// Price curve plus the slot it prices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAuction {
    pub params: PriceParams,
    pub slot0: Slot0,
}

impl SlotAuction {
    pub fn new(params: PriceParams, now: Timestamp, dps: u128) -> Self {
        let slot0 = Slot0::genesis(params.min_init_price, now, dps);
        Self { params, slot0 }
    }

    /// Current asking price at `now`.
    ///
    /// A vacant slot never asks less than `min_init_price`. If the curve
    /// cannot be evaluated the price stays at `init_price`.
    pub fn price_at(&self, now: Timestamp) -> u128 {
        let elapsed = self.slot0.start_time.elapsed_since(now);
        let decayed = self
            .params
            .curve
            .decayed(self.slot0.init_price, elapsed)
            .unwrap_or(self.slot0.init_price);
        let floor = if self.slot0.holder.is_none() {
            self.params.min_price.max(self.params.min_init_price)
        } else {
            self.params.min_price
        };
        decayed.max(floor)
    }

    /// Guard checks common to every paid acquisition, returning the price.
    ///
    /// Order: re-entrancy, deadline, epoch, slippage. Callers check pause
    /// and cooldown themselves since those rules differ per slot.
    pub fn quote(
        &self,
        epoch_id: u64,
        deadline: Timestamp,
        max_price: u128,
        now: Timestamp,
    ) -> Result<u128, AuctionError> {
        if self.slot0.locked {
            return Err(AuctionError::Reentrant);
        }
        if now > deadline {
            return Err(AuctionError::DeadlineExpired { deadline, now });
        }
        if epoch_id != self.slot0.epoch_id {
            return Err(AuctionError::EpochMismatch {
                expected: self.slot0.epoch_id,
                got: epoch_id,
            });
        }
        let price = self.price_at(now);
        if price > max_price {
            return Err(AuctionError::PriceExceeded { price, max_price });
        }
        Ok(price)
    }

    /// Next epoch id, or `Overflow` at the end of the range.
    pub fn next_epoch(&self) -> Result<u64, AuctionError> {
        self.slot0
            .epoch_id
            .checked_add(1)
            .ok_or(AuctionError::Math(tavern_types::MathError::Overflow))
    }

    /// Begin a new epoch. Infallible; compute `epoch_id` with [`Self::next_epoch`] first.
    ///
    /// `start_time` never moves backwards even if `now` does.
    pub fn restart(
        &mut self,
        epoch_id: u64,
        holder: Option<Address>,
        init_price: u128,
        dps: u128,
        uri: String,
        now: Timestamp,
    ) -> Slot0 {
        let next = Slot0 {
            locked: false,
            epoch_id,
            init_price,
            start_time: now.max(self.slot0.start_time),
            dps,
            holder,
            uri,
        };
        std::mem::replace(&mut self.slot0, next)
    }
}
