//! Price decay curves.

use serde::{Deserialize, Serialize};
use tavern_types::{mul_div, MathError};

/// How the asking price falls from `init_price` as an epoch ages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayCurve {
    /// Straight line from `init_price` down to zero over `epoch_period` seconds.
    Linear { epoch_period: u64 },
    /// Halves every `half_life` seconds, interpolating linearly within a half-life.
    Halving { half_life: u64 },
}

impl DecayCurve {
    /// Undecayed price `elapsed` seconds into an epoch that opened at `init_price`.
    ///
    /// Never exceeds `init_price` and never increases with `elapsed`.
    pub fn decayed(&self, init_price: u128, elapsed: u64) -> Result<u128, MathError> {
        match *self {
            DecayCurve::Linear { epoch_period } => {
                if epoch_period == 0 || elapsed >= epoch_period {
                    return Ok(0);
                }
                let left = (epoch_period - elapsed) as u128;
                mul_div(init_price, left, epoch_period as u128)
            }
            DecayCurve::Halving { half_life } => {
                if half_life == 0 {
                    return Ok(0);
                }
                let halvings = elapsed / half_life;
                if halvings >= 128 {
                    return Ok(0);
                }
                let base = init_price >> halvings;
                let into = (elapsed % half_life) as u128;
                let drop = mul_div(base / 2, into, half_life as u128)?;
                Ok(base - drop)
            }
        }
    }

    /// The period parameter, zero meaning the curve is unusable.
    pub fn period(&self) -> u64 {
        match *self {
            DecayCurve::Linear { epoch_period } => epoch_period,
            DecayCurve::Halving { half_life } => half_life,
        }
    }
}

impl Default for DecayCurve {
    fn default() -> Self {
        DecayCurve::Linear { epoch_period: 3600 }
    }
}
