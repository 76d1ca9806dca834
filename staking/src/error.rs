use tavern_types::{MathError, SettlementError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakingError {
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("lock of {requested} days exceeds maximum of {max}")]
    LockTooLong { requested: u64, max: u64 },

    #[error("insufficient stake: requested {requested}, staked {available}")]
    InsufficientStake { requested: u128, available: u128 },

    #[error("stake is locked for another {remaining}s")]
    LockActive { remaining: u64 },

    #[error("staking is paused")]
    Paused,

    #[error("caller is not the operator")]
    Unauthorized,

    #[error("invalid staking parameters: {0}")]
    InvalidParams(String),

    #[error("arithmetic error: {0}")]
    Math(#[from] MathError),

    #[error("settlement failed: {0}")]
    Settlement(#[from] SettlementError),
}

impl StakingError {
    /// Stable snake_case name for logs, metric labels and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            StakingError::ZeroAmount => "zero_amount",
            StakingError::LockTooLong { .. } => "lock_too_long",
            StakingError::InsufficientStake { .. } => "insufficient_stake",
            StakingError::LockActive { .. } => "lock_active",
            StakingError::Paused => "paused",
            StakingError::Unauthorized => "unauthorized",
            StakingError::InvalidParams(_) => "invalid_params",
            StakingError::Math(_) => "math",
            StakingError::Settlement(_) => "settlement",
        }
    }
}
