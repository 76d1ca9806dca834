//! Fixed-point arithmetic at 18 decimals.
//!
//! Ratios (lock multipliers, price multipliers, reward-per-stake indices) are
//! [`Wad`]s: integers scaled by [`SCALE`]. Every scaled product goes through
//! [`mul_div`], which multiplies before dividing with a 256-bit intermediate,
//! so `amount * ratio / SCALE` never truncates early and never overflows
//! unless the final quotient itself exceeds `u128`.

use crate::error::MathError;
use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed-point scale: 1.0 == 1e18.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator: 10 000 bps == 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// `floor(a * b / denom)` without intermediate overflow.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128, MathError> {
    if denom == 0 {
        return Err(MathError::DivisionByZero);
    }
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denom);
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(denom);
    u128::try_from(quotient).map_err(|_| MathError::Overflow)
}

/// `floor(amount * bps / 10_000)`.
pub fn bps_of(amount: u128, bps: u32) -> Result<u128, MathError> {
    mul_div(amount, bps as u128, BPS_DENOMINATOR)
}

/// An unsigned fixed-point number with 18 decimals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wad(u128);

impl Wad {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(SCALE);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// `numerator / denominator` as a Wad.
    pub fn from_ratio(numerator: u128, denominator: u128) -> Result<Self, MathError> {
        mul_div(numerator, SCALE, denominator).map(Self)
    }

    /// `bps / 10_000` as a Wad.
    pub fn from_bps(bps: u32) -> Self {
        Self(bps as u128 * (SCALE / BPS_DENOMINATOR))
    }

    /// `amount * self`, floored.
    pub fn apply(&self, amount: u128) -> Result<u128, MathError> {
        mul_div(amount, self.0, SCALE)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            return write!(f, "{int}.0");
        }
        let digits = format!("{frac:018}");
        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Wad {
    type Err = String;

    /// Parses decimal notation (`"1.25"`, `"2"`), at most 18 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("invalid decimal: {s:?}"));
        }
        if frac_part.len() > 18 {
            return Err(format!("more than 18 fractional digits: {s:?}"));
        }
        let int: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|e| format!("invalid decimal {s:?}: {e}"))?
        };
        let frac: u128 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{frac_part:0<18}");
            padded
                .parse()
                .map_err(|e| format!("invalid decimal {s:?}: {e}"))?
        };
        int.checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac))
            .map(Self)
            .ok_or_else(|| format!("decimal out of range: {s:?}"))
    }
}

impl Serialize for Wad {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_u128(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Wad {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            u128::deserialize(deserializer).map(Self)
        }
    }
}

/// Serde adapter writing `u128` amounts as decimal strings.
///
/// TOML has no 128-bit integers and JavaScript loses precision above 2^53,
/// so raw amounts cross every text boundary as strings. Binary formats keep
/// the native integer.
pub mod amount_str {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(value)
        } else {
            serializer.serialize_u128(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(AmountVisitor)
        } else {
            u128::deserialize(deserializer)
        }
    }

    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an unsigned integer or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(v as u128)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom("amount must be non-negative"))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.trim().replace('_', "").parse().map_err(E::custom)
        }
    }
}
