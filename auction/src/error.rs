//! Auction errors.

use tavern_types::{MathError, SettlementError, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuctionError {
    #[error("current price {price} exceeds max price {max_price}")]
    PriceExceeded { price: u128, max_price: u128 },

    #[error("deadline {deadline} has passed (now {now})")]
    DeadlineExpired { deadline: Timestamp, now: Timestamp },

    #[error("auction is paused")]
    Paused,

    #[error("cooldown active for another {remaining}s")]
    CooldownActive { remaining: u64 },

    #[error("re-entrant call while a transition is in flight")]
    Reentrant,

    #[error("bid targets epoch {got} but current epoch is {expected}")]
    EpochMismatch { expected: u64, got: u64 },

    #[error("bidder already holds the slot")]
    AlreadyHolder,

    #[error("caller does not hold the slot")]
    NotHolder,

    #[error("max hold time not exceeded, evictable in {remaining}s")]
    HoldTimeNotExceeded { remaining: u64 },

    #[error("slot has no holder")]
    NoHolder,

    #[error("pot is empty")]
    EmptyPot,

    #[error("caller has no claim on this slot")]
    NotEntitled,

    #[error("caller is not the operator")]
    Unauthorized,

    #[error("invalid auction parameters: {0}")]
    InvalidParams(String),

    #[error("arithmetic error: {0}")]
    Math(#[from] MathError),

    #[error("settlement failed: {0}")]
    Settlement(#[from] SettlementError),
}

impl AuctionError {
    /// Stable snake_case name for logs, metric labels and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AuctionError::PriceExceeded { .. } => "price_exceeded",
            AuctionError::DeadlineExpired { .. } => "deadline_expired",
            AuctionError::Paused => "paused",
            AuctionError::CooldownActive { .. } => "cooldown_active",
            AuctionError::Reentrant => "reentrant",
            AuctionError::EpochMismatch { .. } => "epoch_mismatch",
            AuctionError::AlreadyHolder => "already_holder",
            AuctionError::NotHolder => "not_holder",
            AuctionError::HoldTimeNotExceeded { .. } => "hold_time_not_exceeded",
            AuctionError::NoHolder => "no_holder",
            AuctionError::EmptyPot => "empty_pot",
            AuctionError::NotEntitled => "not_entitled",
            AuctionError::Unauthorized => "unauthorized",
            AuctionError::InvalidParams(_) => "invalid_params",
            AuctionError::Math(_) => "math",
            AuctionError::Settlement(_) => "settlement",
        }
    }
}
