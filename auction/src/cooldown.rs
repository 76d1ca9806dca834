//! Re-acquisition cooldowns for displaced holders.

use crate::error::AuctionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tavern_types::{Address, Timestamp};

/// When each recently displaced address may bid again.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownBook {
    period_secs: u64,
    displaced_at: HashMap<Address, Timestamp>,
}

impl CooldownBook {
    pub fn new(period_secs: u64) -> Self {
        Self {
            period_secs,
            displaced_at: HashMap::new(),
        }
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    /// Start (or restart) the cooldown for `address`.
    pub fn start(&mut self, address: Address, now: Timestamp) {
        if self.period_secs == 0 {
            return;
        }
        self.displaced_at.insert(address, now);
    }

    /// Seconds until `address` may bid; zero when it already may.
    pub fn remaining(&self, address: &Address, now: Timestamp) -> u64 {
        match self.displaced_at.get(address) {
            Some(at) => at
                .plus_secs(self.period_secs)
                .as_secs()
                .saturating_sub(now.as_secs()),
            None => 0,
        }
    }

    /// `(can_claim, time_remaining)`.
    pub fn can_claim(&self, address: &Address, now: Timestamp) -> (bool, u64) {
        let remaining = self.remaining(address, now);
        (remaining == 0, remaining)
    }

    pub fn check(&self, address: &Address, now: Timestamp) -> Result<(), AuctionError> {
        match self.remaining(address, now) {
            0 => Ok(()),
            remaining => Err(AuctionError::CooldownActive { remaining }),
        }
    }

    /// Drop entries whose cooldown has run out.
    pub fn prune(&mut self, now: Timestamp) {
        let period = self.period_secs;
        self.displaced_at
            .retain(|_, at| !at.has_expired(period, now));
    }

    pub fn len(&self) -> usize {
        self.displaced_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displaced_at.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    #[test]
    fn unknown_address_can_claim() {
        let book = CooldownBook::new(60);
        assert_eq!(book.can_claim(&addr(1), Timestamp::new(5)), (true, 0));
    }

    #[test]
    fn cooldown_counts_down_and_clears() {
        let mut book = CooldownBook::new(60);
        book.start(addr(1), Timestamp::new(100));
        assert_eq!(book.can_claim(&addr(1), Timestamp::new(100)), (false, 60));
        assert_eq!(book.can_claim(&addr(1), Timestamp::new(159)), (false, 1));
        assert_eq!(book.can_claim(&addr(1), Timestamp::new(160)), (true, 0));
        assert_eq!(
            book.check(&addr(1), Timestamp::new(130)),
            Err(AuctionError::CooldownActive { remaining: 30 })
        );
    }

    #[test]
    fn zero_period_never_records() {
        let mut book = CooldownBook::new(0);
        book.start(addr(1), Timestamp::new(100));
        assert!(book.is_empty());
    }

    #[test]
    fn prune_keeps_only_live_entries() {
        let mut book = CooldownBook::new(60);
        book.start(addr(1), Timestamp::new(0));
        book.start(addr(2), Timestamp::new(50));
        book.prune(Timestamp::new(70));
        assert_eq!(book.len(), 1);
        assert!(!book.can_claim(&addr(2), Timestamp::new(70)).0);
    }
}
