//! Nullable settlement: records transfers, never holds real balances.

use tavern_types::{Address, Asset, Settlement, SettlementError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferKind {
    Collect,
    Disburse,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub kind: TransferKind,
    pub asset: Asset,
    pub account: Address,
    pub amount: u128,
}

/// A settlement that accepts every transfer and keeps a log of them.
///
/// `fail_next` makes the next call return `Rejected`, for exercising the
/// all-or-nothing paths in the engines.
#[derive(Debug, Default)]
pub struct NullSettlement {
    log: Vec<Transfer>,
    fail_next: Option<String>,
}

impl NullSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next collect or disburse with `reason`.
    pub fn fail_next(&mut self, reason: &str) {
        self.fail_next = Some(reason.to_string());
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.log
    }

    /// Total collected from `account` in `asset`.
    pub fn collected(&self, asset: Asset, account: &Address) -> u128 {
        self.total(TransferKind::Collect, asset, account)
    }

    /// Total disbursed to `account` in `asset`.
    pub fn disbursed(&self, asset: Asset, account: &Address) -> u128 {
        self.total(TransferKind::Disburse, asset, account)
    }

    fn total(&self, kind: TransferKind, asset: Asset, account: &Address) -> u128 {
        self.log
            .iter()
            .filter(|t| t.kind == kind && t.asset == asset && &t.account == account)
            .map(|t| t.amount)
            .sum()
    }

    fn record(
        &mut self,
        kind: TransferKind,
        asset: Asset,
        account: &Address,
        amount: u128,
    ) -> Result<(), SettlementError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(SettlementError::Rejected(reason));
        }
        self.log.push(Transfer {
            kind,
            asset,
            account: *account,
            amount,
        });
        Ok(())
    }
}

impl Settlement for NullSettlement {
    fn collect(&mut self, asset: Asset, from: &Address, amount: u128) -> Result<(), SettlementError> {
        self.record(TransferKind::Collect, asset, from, amount)
    }

    fn disburse(&mut self, asset: Asset, to: &Address, amount: u128) -> Result<(), SettlementError> {
        self.record(TransferKind::Disburse, asset, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_is_one_shot() {
        let mut s = NullSettlement::new();
        let a = Address::new([1; 20]);
        s.fail_next("offline");
        assert_eq!(
            s.collect(Asset::Payment, &a, 5),
            Err(SettlementError::Rejected("offline".into()))
        );
        s.collect(Asset::Payment, &a, 5).unwrap();
        s.disburse(Asset::Keep, &a, 2).unwrap();
        assert_eq!(s.collected(Asset::Payment, &a), 5);
        assert_eq!(s.disbursed(Asset::Keep, &a), 2);
        assert_eq!(s.transfers().len(), 2);
    }
}
