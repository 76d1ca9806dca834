//! In-memory balance book: the keeper's settlement.
//!
//! Each account holds a balance per [`Asset`]. Collected value moves into
//! keeper custody; disbursed value moves out of it. `Keep` is the emission
//! asset: office rewards are minted when custody runs short.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tavern_types::{Address, Asset, Settlement, SettlementError};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceBook {
    accounts: HashMap<Asset, HashMap<Address, u128>>,
    custody: HashMap<Asset, u128>,
    /// `Keep` created to cover emissions.
    minted: u128,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, asset: Asset, account: &Address) -> u128 {
        self.accounts
            .get(&asset)
            .and_then(|m| m.get(account))
            .copied()
            .unwrap_or(0)
    }

    /// Value currently held by the keeper.
    pub fn custody(&self, asset: Asset) -> u128 {
        self.custody.get(&asset).copied().unwrap_or(0)
    }

    pub fn minted(&self) -> u128 {
        self.minted
    }

    /// Create `amount` of `asset` in `account`. Faucet and deposit path.
    pub fn credit(
        &mut self,
        asset: Asset,
        account: &Address,
        amount: u128,
    ) -> Result<u128, SettlementError> {
        let current = self.balance_of(asset, account);
        let next = current
            .checked_add(amount)
            .ok_or(SettlementError::Overflow { account: *account })?;
        self.accounts.entry(asset).or_default().insert(*account, next);
        Ok(next)
    }
}

impl Settlement for BalanceBook {
    fn collect(&mut self, asset: Asset, from: &Address, amount: u128) -> Result<(), SettlementError> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(SettlementError::InsufficientBalance {
                asset,
                account: *from,
                needed: amount,
                available,
            });
        }
        let custody = self
            .custody(asset)
            .checked_add(amount)
            .ok_or(SettlementError::Overflow { account: *from })?;
        self.accounts
            .entry(asset)
            .or_default()
            .insert(*from, available - amount);
        self.custody.insert(asset, custody);
        Ok(())
    }

    fn disburse(&mut self, asset: Asset, to: &Address, amount: u128) -> Result<(), SettlementError> {
        let held = self.custody(asset);
        let (custody, minted) = if held >= amount {
            (held - amount, self.minted)
        } else if asset == Asset::Keep {
            let shortfall = amount - held;
            let minted = self
                .minted
                .checked_add(shortfall)
                .ok_or(SettlementError::Overflow { account: *to })?;
            (0, minted)
        } else {
            return Err(SettlementError::Rejected(format!(
                "keeper custody holds {held} {asset}, cannot pay {amount}"
            )));
        };
        let balance = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(SettlementError::Overflow { account: *to })?;

        self.accounts.entry(asset).or_default().insert(*to, balance);
        self.custody.insert(asset, custody);
        self.minted = minted;
        Ok(())
    }
}
