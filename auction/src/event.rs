use serde::{Deserialize, Serialize};
use tavern_types::fixed::amount_str;
use tavern_types::{Address, Asset, Timestamp};

/// A committed auction transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    OfficeTaken {
        epoch_id: u64,
        holder: Address,
        previous_holder: Option<Address>,
        #[serde(with = "amount_str")]
        price_paid: u128,
        at: Timestamp,
    },
    OfficeEvicted {
        epoch_id: u64,
        evicted: Address,
        /// `None` when the office was left vacant.
        fallback: Option<Address>,
        caller: Address,
        at: Timestamp,
    },
    OfficeRelinquished {
        epoch_id: u64,
        holder: Address,
        at: Timestamp,
    },
    CellarRaided {
        epoch_id: u64,
        raider: Address,
        #[serde(with = "amount_str")]
        price_paid: u128,
        #[serde(with = "amount_str")]
        pot: u128,
        at: Timestamp,
    },
    RewardsClaimed {
        account: Address,
        asset: Asset,
        #[serde(with = "amount_str")]
        amount: u128,
    },
    ProceedsWithdrawn {
        account: Address,
        #[serde(with = "amount_str")]
        amount: u128,
    },
    PotDeposited {
        from: Option<Address>,
        #[serde(with = "amount_str")]
        amount: u128,
        #[serde(with = "amount_str")]
        pot: u128,
    },
    PauseChanged {
        paused: bool,
        by: Address,
    },
}

impl AuctionEvent {
    /// Short name used for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AuctionEvent::OfficeTaken { .. } => "office_taken",
            AuctionEvent::OfficeEvicted { .. } => "office_evicted",
            AuctionEvent::OfficeRelinquished { .. } => "office_relinquished",
            AuctionEvent::CellarRaided { .. } => "cellar_raided",
            AuctionEvent::RewardsClaimed { .. } => "rewards_claimed",
            AuctionEvent::ProceedsWithdrawn { .. } => "proceeds_withdrawn",
            AuctionEvent::PotDeposited { .. } => "pot_deposited",
            AuctionEvent::PauseChanged { .. } => "pause_changed",
        }
    }
}
