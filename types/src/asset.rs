//! Assets moved across the settlement boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fungible assets the engines account in. All amounts are raw units
/// with 18 decimals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    /// The coin used to bid for the office. Fills the cellar pot and pays staking rewards.
    Payment,
    /// Liquidity-pool token spent to raid the cellar.
    Lp,
    /// The game token: office `dps` rewards and staking principal.
    Keep,
}

impl Asset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Lp => "lp",
            Self::Keep => "keep",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
