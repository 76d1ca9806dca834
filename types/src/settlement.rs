//! The boundary through which value enters and leaves the engines.
//!
//! Engines validate a transition completely, then call the settlement, and
//! only commit their own state once the settlement call has returned `Ok`.
//! A failed transfer therefore leaves the engine untouched.

use crate::address::Address;
use crate::asset::Asset;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("insufficient {asset} balance for {account}: need {needed}, available {available}")]
    InsufficientBalance {
        asset: Asset,
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("balance overflow for {account}")]
    Overflow { account: Address },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// External payment/transfer collaborator.
pub trait Settlement {
    /// Pull `amount` of `asset` from `from` into engine custody.
    fn collect(&mut self, asset: Asset, from: &Address, amount: u128)
        -> Result<(), SettlementError>;

    /// Pay `amount` of `asset` out of engine custody to `to`.
    fn disburse(&mut self, asset: Asset, to: &Address, amount: u128)
        -> Result<(), SettlementError>;
}
