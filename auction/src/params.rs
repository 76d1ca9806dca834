//! Tunable auction parameters.
//!
//! Every constant that shapes the auction (curve, multiplier, floors, fee
//! split, emission schedule, hold and cooldown windows) lives here so the
//! keeper can load it from configuration.

use crate::decay::DecayCurve;
use crate::error::AuctionError;
use serde::{Deserialize, Serialize};
use tavern_types::fixed::amount_str;
use tavern_types::{bps_of, Address, MathError, Timestamp, Wad, BPS_DENOMINATOR, SCALE};

/// Price curve and restart rules for one slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceParams {
    #[serde(default)]
    pub curve: DecayCurve,
    /// Applied to the price paid to get the next epoch's `init_price`.
    #[serde(default = "default_price_multiplier")]
    pub price_multiplier: Wad,
    /// Floor on the decayed price.
    #[serde(default, with = "amount_str")]
    pub min_price: u128,
    #[serde(default = "default_min_init_price", with = "amount_str")]
    pub min_init_price: u128,
    #[serde(default = "default_max_init_price", with = "amount_str")]
    pub max_init_price: u128,
}

fn default_price_multiplier() -> Wad {
    Wad::from_raw(2 * SCALE)
}

fn default_min_init_price() -> u128 {
    SCALE / 100
}

fn default_max_init_price() -> u128 {
    1_000_000_000 * SCALE
}

impl Default for PriceParams {
    fn default() -> Self {
        Self {
            curve: DecayCurve::default(),
            price_multiplier: default_price_multiplier(),
            min_price: 0,
            min_init_price: default_min_init_price(),
            max_init_price: default_max_init_price(),
        }
    }
}

impl PriceParams {
    pub fn validate(&self) -> Result<(), AuctionError> {
        if self.curve.period() == 0 {
            return Err(AuctionError::InvalidParams("decay period must be > 0".into()));
        }
        if self.price_multiplier < Wad::ONE {
            return Err(AuctionError::InvalidParams(format!(
                "price_multiplier {} is below 1.0",
                self.price_multiplier
            )));
        }
        if self.min_init_price > self.max_init_price {
            return Err(AuctionError::InvalidParams(format!(
                "min_init_price {} above max_init_price {}",
                self.min_init_price, self.max_init_price
            )));
        }
        if self.min_price > self.min_init_price {
            return Err(AuctionError::InvalidParams(format!(
                "min_price {} above min_init_price {}",
                self.min_price, self.min_init_price
            )));
        }
        Ok(())
    }

    /// Opening price of the next epoch after `paid` was accepted.
    ///
    /// Saturates to `max_init_price` when the multiplied price would not fit.
    pub fn next_init_price(&self, paid: u128) -> u128 {
        let raised = self.price_multiplier.apply(paid).unwrap_or(u128::MAX);
        raised.clamp(self.min_init_price, self.max_init_price)
    }
}

/// How a winning office bid is divided, in basis points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    #[serde(default = "default_previous_holder_bps")]
    pub previous_holder_bps: u32,
    #[serde(default = "default_pot_bps")]
    pub pot_bps: u32,
    #[serde(default)]
    pub staking_bps: u32,
    #[serde(default = "default_treasury_bps")]
    pub treasury_bps: u32,
}

fn default_previous_holder_bps() -> u32 {
    8_000
}

fn default_pot_bps() -> u32 {
    1_500
}

fn default_treasury_bps() -> u32 {
    500
}

impl Default for FeeSplit {
    fn default() -> Self {
        Self {
            previous_holder_bps: default_previous_holder_bps(),
            pot_bps: default_pot_bps(),
            staking_bps: 0,
            treasury_bps: default_treasury_bps(),
        }
    }
}

impl FeeSplit {
    pub fn validate(&self) -> Result<(), AuctionError> {
        let total = self.previous_holder_bps as u64
            + self.pot_bps as u64
            + self.staking_bps as u64
            + self.treasury_bps as u64;
        if total != BPS_DENOMINATOR as u64 {
            return Err(AuctionError::InvalidParams(format!(
                "fee split sums to {total} bps, expected {BPS_DENOMINATOR}"
            )));
        }
        Ok(())
    }

    /// Split `amount` into `(previous_holder, pot, staking, treasury)`.
    ///
    /// Rounding dust lands in the treasury; so does the previous-holder
    /// share when the slot was vacant.
    pub fn split(
        &self,
        amount: u128,
        has_previous_holder: bool,
    ) -> Result<(u128, u128, u128, u128), MathError> {
        let previous = if has_previous_holder {
            bps_of(amount, self.previous_holder_bps)?
        } else {
            0
        };
        let pot = bps_of(amount, self.pot_bps)?;
        let staking = bps_of(amount, self.staking_bps)?;
        let treasury = amount - previous - pot - staking;
        Ok((previous, pot, staking, treasury))
    }
}

/// Holder emission rate over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpsSchedule {
    #[serde(default = "default_initial_dps", with = "amount_str")]
    pub initial: u128,
    /// Seconds per halving of `initial`; 0 keeps the rate constant.
    #[serde(default = "default_halving_period")]
    pub halving_period: u64,
    #[serde(default = "default_tail_dps", with = "amount_str")]
    pub tail: u128,
}

fn default_initial_dps() -> u128 {
    4 * SCALE
}

fn default_halving_period() -> u64 {
    30 * tavern_types::SECS_PER_DAY
}

fn default_tail_dps() -> u128 {
    SCALE / 100
}

impl Default for DpsSchedule {
    fn default() -> Self {
        Self {
            initial: default_initial_dps(),
            halving_period: default_halving_period(),
            tail: default_tail_dps(),
        }
    }
}

impl DpsSchedule {
    pub fn validate(&self) -> Result<(), AuctionError> {
        if self.tail > self.initial {
            return Err(AuctionError::InvalidParams(format!(
                "tail dps {} above initial dps {}",
                self.tail, self.initial
            )));
        }
        Ok(())
    }

    /// Rate in force at `now` for a schedule that started at `genesis`.
    pub fn dps_at(&self, genesis: Timestamp, now: Timestamp) -> u128 {
        if self.halving_period == 0 {
            return self.initial;
        }
        let halvings = genesis.elapsed_since(now) / self.halving_period;
        if halvings >= 128 {
            return self.tail;
        }
        (self.initial >> halvings).max(self.tail)
    }
}

/// Everything the office needs beyond its price curve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeParams {
    #[serde(default)]
    pub price: PriceParams,
    #[serde(default)]
    pub fees: FeeSplit,
    #[serde(default)]
    pub dps: DpsSchedule,
    #[serde(default = "default_max_hold_secs")]
    pub max_hold_secs: u64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Receives the slot on forced eviction. Unset means the operator.
    #[serde(default)]
    pub fallback_holder: Option<Address>,
    #[serde(default = "default_true")]
    pub eviction_pausable: bool,
}

fn default_max_hold_secs() -> u64 {
    4 * 3600
}

fn default_cooldown_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

impl Default for OfficeParams {
    fn default() -> Self {
        Self {
            price: PriceParams::default(),
            fees: FeeSplit::default(),
            dps: DpsSchedule::default(),
            max_hold_secs: default_max_hold_secs(),
            cooldown_secs: default_cooldown_secs(),
            fallback_holder: None,
            eviction_pausable: true,
        }
    }
}

impl OfficeParams {
    pub fn validate(&self) -> Result<(), AuctionError> {
        self.price.validate()?;
        self.fees.validate()?;
        self.dps.validate()?;
        if self.max_hold_secs == 0 {
            return Err(AuctionError::InvalidParams("max_hold_secs must be > 0".into()));
        }
        if self.fallback_holder.is_some_and(|a| a.is_zero()) {
            return Err(AuctionError::InvalidParams(
                "fallback_holder must not be the zero address".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellarParams {
    #[serde(default = "default_cellar_price")]
    pub price: PriceParams,
    #[serde(default)]
    pub cooldown_secs: u64,
}

fn default_cellar_price() -> PriceParams {
    PriceParams {
        min_init_price: SCALE,
        ..PriceParams::default()
    }
}

impl Default for CellarParams {
    fn default() -> Self {
        Self {
            price: default_cellar_price(),
            cooldown_secs: 0,
        }
    }
}

impl CellarParams {
    pub fn validate(&self) -> Result<(), AuctionError> {
        self.price.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E18: u128 = SCALE;

    #[test]
    fn defaults_validate() {
        OfficeParams::default().validate().unwrap();
        CellarParams::default().validate().unwrap();
    }

    #[test]
    fn next_init_price_clamps_both_ways() {
        let p = PriceParams {
            min_init_price: 10,
            max_init_price: 1_000,
            ..PriceParams::default()
        };
        assert_eq!(p.next_init_price(0), 10);
        assert_eq!(p.next_init_price(100), 200);
        assert_eq!(p.next_init_price(900), 1_000);
        assert_eq!(p.next_init_price(u128::MAX), 1_000);
    }

    #[test]
    fn multiplier_below_one_rejected() {
        let p = PriceParams {
            price_multiplier: Wad::from_bps(9_999),
            ..PriceParams::default()
        };
        assert!(matches!(p.validate(), Err(AuctionError::InvalidParams(_))));
    }

    #[test]
    fn fee_split_must_sum_to_whole() {
        let fees = FeeSplit {
            treasury_bps: 400,
            ..FeeSplit::default()
        };
        assert!(fees.validate().is_err());
    }

    #[test]
    fn split_sends_dust_and_vacant_share_to_treasury() {
        let fees = FeeSplit::default();
        let (prev, pot, staking, treasury) = fees.split(100 * E18, true).unwrap();
        assert_eq!(prev, 80 * E18);
        assert_eq!(pot, 15 * E18);
        assert_eq!(staking, 0);
        assert_eq!(treasury, 5 * E18);

        let (prev, pot, _, treasury) = fees.split(100 * E18, false).unwrap();
        assert_eq!(prev, 0);
        assert_eq!(pot, 15 * E18);
        assert_eq!(treasury, 85 * E18);

        let (prev, pot, staking, treasury) = fees.split(7, true).unwrap();
        assert_eq!(prev + pot + staking + treasury, 7);
        assert_eq!(prev, 5);
        assert_eq!(pot, 1);
    }

    #[test]
    fn dps_halves_down_to_tail() {
        let s = DpsSchedule {
            initial: 8 * E18,
            halving_period: 100,
            tail: E18,
        };
        let g = Timestamp::new(1_000);
        assert_eq!(s.dps_at(g, g), 8 * E18);
        assert_eq!(s.dps_at(g, g.plus_secs(100)), 4 * E18);
        assert_eq!(s.dps_at(g, g.plus_secs(250)), 2 * E18);
        assert_eq!(s.dps_at(g, g.plus_secs(10_000)), E18);
    }

    #[test]
    fn params_fill_missing_fields_with_defaults() {
        let json: OfficeParams = serde_json::from_value(serde_json::json!({
            "max_hold_secs": 600,
            "price": { "min_init_price": "5", "curve": { "halving": { "half_life": 60 } } }
        }))
        .unwrap();
        assert_eq!(json.max_hold_secs, 600);
        assert_eq!(json.price.min_init_price, 5);
        assert_eq!(json.price.curve, DecayCurve::Halving { half_life: 60 });
        assert_eq!(json.fees, FeeSplit::default());
    }
}
