//! The keeper service.
//!
//! [`Tavern`] owns the office, the cellar, the staking ledger and the
//! balance book. Each sits behind its own tokio lock. Writers always lock
//! in the order office → cellar → staking → balances and hold every lock
//! they need for the whole call, so concurrent callers see one total order
//! of transitions. Readers take read locks and see committed state only.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use tavern_auction::{
    AuctionError, CellarAuction, HoldStatus, OfficeAuction, Raid, RaidReceipt, Slot0, TakeOffice, TakeReceipt,
};
use tavern_staking::{StakeInfo, StakingLedger};
use tavern_types::fixed::amount_str;
use tavern_types::{Address, Asset, Clock, Timestamp};
use tavern_utils::{format_amount, format_duration};

use crate::balances::BalanceBook;
use crate::config::KeeperConfig;
use crate::event::{EventBus, TavernEvent};
use crate::metrics::{whole_units, KeeperMetrics};
use crate::snapshot::{TavernSnapshot, SNAPSHOT_VERSION};
use crate::KeeperError;

/// One account's balances across every asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountBalances {
    pub address: Address,
    #[serde(with = "amount_str")]
    pub payment: u128,
    #[serde(with = "amount_str")]
    pub lp: u128,
    #[serde(with = "amount_str")]
    pub keep: u128,
}

pub struct Tavern {
    config: KeeperConfig,
    clock: Arc<dyn Clock>,
    office: RwLock<OfficeAuction>,
    cellar: RwLock<CellarAuction>,
    staking: RwLock<StakingLedger>,
    balances: Mutex<BalanceBook>,
    events: EventBus,
    metrics: KeeperMetrics,
}

impl Tavern {
    /// Fresh state with every epoch starting at `clock.now()`.
    pub fn new(config: KeeperConfig, clock: Arc<dyn Clock>) -> Result<Self, KeeperError> {
        config.validate()?;
        let genesis = clock.now();
        let office = OfficeAuction::new(config.office.clone(), config.operator, genesis)?;
        let cellar = CellarAuction::new(config.cellar.clone(), config.operator, genesis)?;
        let staking = StakingLedger::new(config.staking.clone(), config.operator)?;
        Self::assemble(config, clock, office, cellar, staking, BalanceBook::new())
    }

    /// Resume from a snapshot. Engine parameters come from the snapshot.
    pub fn from_snapshot(
        config: KeeperConfig,
        clock: Arc<dyn Clock>,
        snapshot: TavernSnapshot,
    ) -> Result<Self, KeeperError> {
        if snapshot.office.params() != &config.office
            || snapshot.cellar.params() != &config.cellar
            || snapshot.staking.params() != &config.staking
        {
            warn!("configured auction/staking parameters differ from snapshot; snapshot wins");
        }
        Self::assemble(
            config,
            clock,
            snapshot.office,
            snapshot.cellar,
            snapshot.staking,
            snapshot.balances,
        )
    }

    /// Load the snapshot under `data_dir` if there is one, else start fresh.
    pub fn open(config: KeeperConfig, clock: Arc<dyn Clock>) -> Result<Self, KeeperError> {
        if config.persist_snapshot {
            let path = config.snapshot_path();
            if let Some(snapshot) = TavernSnapshot::load(&path)? {
                info!(
                    path = %path.display(),
                    taken_at = snapshot.taken_at.as_secs(),
                    office_epoch = snapshot.office.slot0().epoch_id,
                    "restored snapshot"
                );
                return Self::from_snapshot(config, clock, snapshot);
            }
        }
        info!("starting with fresh state");
        Self::new(config, clock)
    }

    fn assemble(
        config: KeeperConfig,
        clock: Arc<dyn Clock>,
        office: OfficeAuction,
        cellar: CellarAuction,
        staking: StakingLedger,
        balances: BalanceBook,
    ) -> Result<Self, KeeperError> {
        let metrics = KeeperMetrics::new()?;
        metrics.office_epoch.set(office.slot0().epoch_id as i64);
        metrics.cellar_epoch.set(cellar.slot0().epoch_id as i64);
        metrics.cellar_pot.set(whole_units(cellar.pot()));
        metrics
            .total_weighted_stake
            .set(whole_units(staking.total_weighted_stake()));
        Ok(Self {
            config,
            clock,
            office: RwLock::new(office),
            cellar: RwLock::new(cellar),
            staking: RwLock::new(staking),
            balances: Mutex::new(balances),
            events: EventBus::new(),
            metrics,
        })
    }

    /// Register an event listener. Call before sharing the keeper.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&TavernEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.config
    }

    pub fn metrics(&self) -> &KeeperMetrics {
        &self.metrics
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn emit(&self, event: impl Into<TavernEvent>) {
        let event = event.into();
        debug!(kind = event.kind(), "event");
        self.events.emit(&event);
    }

    // ── Office ──────────────────────────────────────────────────────────

    pub async fn office_slot0(&self) -> Slot0 {
        self.office.read().await.slot0().clone()
    }

    pub async fn office_price(&self) -> u128 {
        let now = self.now();
        self.office.read().await.price(now)
    }

    pub async fn office_dps(&self) -> u128 {
        self.office.read().await.dps()
    }

    pub async fn can_claim_office(&self, account: &Address) -> (bool, u64) {
        let now = self.now();
        self.office.read().await.can_claim(account, now)
    }

    pub async fn check_max_hold_time(&self) -> HoldStatus {
        let now = self.now();
        self.office.read().await.check_max_hold_time(now)
    }

    pub async fn claimable_office_rewards(&self, account: &Address) -> Result<u128, KeeperError> {
        let now = self.now();
        let office = self.office.read().await;
        Ok(office
            .claimable_accrual(account, now)
            .map_err(AuctionError::Math)?)
    }

    /// Take the office and route the pot and staking shares of the price.
    pub async fn take_office(&self, bid: TakeOffice) -> Result<TakeReceipt, KeeperError> {
        let mut office = self.office.write().await;
        let mut cellar = self.cellar.write().await;
        let mut staking = self.staking.write().await;
        let mut balances = self.balances.lock().await;
        let now = self.now();

        let bidder = bid.bidder;
        let receipt = match office.take_office(bid, now, &mut *balances) {
            Ok(receipt) => receipt,
            Err(e) => {
                self.metrics.reject(e.kind());
                debug!(bidder = %bidder, error = %e, "office bid rejected");
                return Err(e.into());
            }
        };
        self.emit(receipt.event.clone());

        if receipt.fees.pot > 0 {
            match cellar.credit_pot(receipt.fees.pot) {
                Ok(event) => self.emit(event),
                Err(e) => error!(amount = %receipt.fees.pot, error = %e, "pot share left in custody"),
            }
        }
        if receipt.fees.staking > 0 {
            match staking.expire_locks(now) {
                Ok(events) => events.into_iter().for_each(|event| self.emit(event)),
                Err(e) => warn!(error = %e, "lock expiry sweep failed"),
            }
            match staking.notify_reward(receipt.fees.staking) {
                Ok(event) => self.emit(event),
                Err(e) => {
                    error!(amount = %receipt.fees.staking, error = %e, "staking share left in custody")
                }
            }
        }

        self.metrics.office_takes.inc();
        self.metrics.office_epoch.set(receipt.epoch_id as i64);
        self.metrics.cellar_pot.set(whole_units(cellar.pot()));
        info!(
            epoch = receipt.epoch_id,
            holder = %bidder,
            price = %format_amount(receipt.price_paid),
            "office taken"
        );
        Ok(receipt)
    }

    pub async fn claim_office_rewards(&self, caller: Address) -> Result<u128, KeeperError> {
        let mut office = self.office.write().await;
        let mut balances = self.balances.lock().await;
        let now = self.now();
        let amount = office.claim_accrued_rewards(caller, now, &mut *balances)?;
        if amount > 0 {
            self.metrics.claims.inc();
            self.emit(tavern_auction::AuctionEvent::RewardsClaimed {
                account: caller,
                asset: Asset::Keep,
                amount,
            });
            info!(account = %caller, amount = %format_amount(amount), "office rewards claimed");
        }
        Ok(amount)
    }

    pub async fn withdraw_proceeds(&self, caller: Address) -> Result<u128, KeeperError> {
        let mut office = self.office.write().await;
        let mut balances = self.balances.lock().await;
        let amount = office.withdraw_proceeds(caller, &mut *balances)?;
        if amount > 0 {
            self.metrics.claims.inc();
            self.emit(tavern_auction::AuctionEvent::ProceedsWithdrawn {
                account: caller,
                amount,
            });
        }
        Ok(amount)
    }

    pub async fn relinquish(&self, caller: Address) -> Result<Slot0, KeeperError> {
        let mut office = self.office.write().await;
        let now = self.now();
        let event = office.relinquish(caller, now)?;
        self.emit(event);
        self.metrics.office_epoch.set(office.slot0().epoch_id as i64);
        info!(holder = %caller, "office relinquished");
        Ok(office.slot0().clone())
    }

    /// Force out an overstayed holder. Anyone may call.
    pub async fn evict(&self, caller: Address) -> Result<Slot0, KeeperError> {
        let mut office = self.office.write().await;
        let now = self.now();
        let event = office.evict(caller, now)?;
        if let tavern_auction::AuctionEvent::OfficeEvicted {
            evicted, fallback, ..
        } = &event
        {
            let held = office.params().max_hold_secs;
            info!(evicted = %evicted, by = %caller, fallback = ?fallback, max_hold = %format_duration(held), "office holder evicted");
        }
        self.emit(event);
        self.metrics.evictions.inc();
        self.metrics.office_epoch.set(office.slot0().epoch_id as i64);
        Ok(office.slot0().clone())
    }

    pub async fn withdraw_treasury(&self, caller: Address) -> Result<u128, KeeperError> {
        let mut office = self.office.write().await;
        let mut balances = self.balances.lock().await;
        Ok(office.withdraw_treasury(caller, &mut *balances)?)
    }

    // ── Cellar ──────────────────────────────────────────────────────────

    pub async fn cellar_slot0(&self) -> Slot0 {
        self.cellar.read().await.slot0().clone()
    }

    pub async fn cellar_price(&self) -> u128 {
        let now = self.now();
        self.cellar.read().await.price(now)
    }

    pub async fn cellar_pot(&self) -> u128 {
        self.cellar.read().await.pot()
    }

    pub async fn raid(&self, raid: Raid) -> Result<RaidReceipt, KeeperError> {
        let mut cellar = self.cellar.write().await;
        let mut balances = self.balances.lock().await;
        let now = self.now();
        let raider = raid.raider;
        let receipt = match cellar.raid(raid, now, &mut *balances) {
            Ok(receipt) => receipt,
            Err(e) => {
                self.metrics.reject(e.kind());
                debug!(raider = %raider, error = %e, "cellar raid rejected");
                return Err(e.into());
            }
        };
        self.emit(receipt.event.clone());
        self.metrics.cellar_raids.inc();
        self.metrics.cellar_epoch.set(receipt.epoch_id as i64);
        self.metrics.cellar_pot.set(0.0);
        info!(
            epoch = receipt.epoch_id,
            raider = %raider,
            paid_lp = %format_amount(receipt.price_paid),
            pot = %format_amount(receipt.pot_won),
            "cellar raided"
        );
        Ok(receipt)
    }

    pub async fn harvest(&self, caller: Address) -> Result<u128, KeeperError> {
        let mut cellar = self.cellar.write().await;
        let mut balances = self.balances.lock().await;
        let amount = cellar.harvest(caller, &mut *balances)?;
        if amount > 0 {
            self.metrics.claims.inc();
            self.emit(tavern_auction::AuctionEvent::RewardsClaimed {
                account: caller,
                asset: Asset::Payment,
                amount,
            });
        }
        Ok(amount)
    }

    pub async fn deposit_to_pot(&self, from: Address, amount: u128) -> Result<u128, KeeperError> {
        let mut cellar = self.cellar.write().await;
        let mut balances = self.balances.lock().await;
        let event = cellar.deposit_to_pot(from, amount, &mut *balances)?;
        self.emit(event);
        self.metrics.cellar_pot.set(whole_units(cellar.pot()));
        Ok(cellar.pot())
    }

    // ── Pause ───────────────────────────────────────────────────────────

    pub async fn paused(&self) -> bool {
        self.office.read().await.is_paused()
    }

    /// Pause or resume every engine at once. Operator only.
    pub async fn set_paused(&self, caller: Address, paused: bool) -> Result<(), KeeperError> {
        let mut office = self.office.write().await;
        let mut cellar = self.cellar.write().await;
        let mut staking = self.staking.write().await;
        let event = office.set_paused(caller, paused)?;
        cellar.set_paused(caller, paused)?;
        staking.set_paused(caller, paused)?;
        self.emit(event);
        warn!(paused, by = %caller, "pause switch changed");
        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────

    pub async fn stake(
        &self,
        account: Address,
        amount: u128,
        lock_days: u64,
    ) -> Result<StakeInfo, KeeperError> {
        let mut staking = self.staking.write().await;
        let mut balances = self.balances.lock().await;
        let now = self.now();
        let event = staking.stake(account, amount, lock_days, now, &mut *balances)?;
        self.emit(event);
        self.metrics.stakes.inc();
        self.metrics
            .total_weighted_stake
            .set(whole_units(staking.total_weighted_stake()));
        info!(account = %account, amount = %format_amount(amount), lock_days, "staked");
        Ok(staking.user_stake(&account))
    }

    pub async fn unstake(&self, account: Address, amount: u128) -> Result<StakeInfo, KeeperError> {
        let mut staking = self.staking.write().await;
        let mut balances = self.balances.lock().await;
        let now = self.now();
        let event = staking.unstake(account, amount, now, &mut *balances)?;
        self.emit(event);
        self.metrics.unstakes.inc();
        self.metrics
            .total_weighted_stake
            .set(whole_units(staking.total_weighted_stake()));
        info!(account = %account, amount = %format_amount(amount), "unstaked");
        Ok(staking.user_stake(&account))
    }

    pub async fn claim_staking_rewards(&self, account: Address) -> Result<u128, KeeperError> {
        let mut staking = self.staking.write().await;
        let mut balances = self.balances.lock().await;
        let now = self.now();
        let amount = staking.claim_rewards(account, now, &mut *balances)?;
        if amount > 0 {
            self.metrics.claims.inc();
            self.emit(tavern_staking::StakingEvent::RewardsClaimed { account, amount });
        }
        Ok(amount)
    }

    /// Drop `account`'s run-out lock to the base multiplier. Anyone may call.
    pub async fn poke_stake(&self, account: Address) -> Result<StakeInfo, KeeperError> {
        let mut staking = self.staking.write().await;
        let now = self.now();
        if let Some(event) = staking.poke(account, now)? {
            self.emit(event);
            self.metrics
                .total_weighted_stake
                .set(whole_units(staking.total_weighted_stake()));
            info!(account = %account, "expired lock reset");
        }
        Ok(staking.user_stake(&account))
    }

    pub async fn pending_rewards(&self, account: &Address) -> u128 {
        self.staking.read().await.pending_rewards(account)
    }

    pub async fn user_stake(&self, account: &Address) -> StakeInfo {
        self.staking.read().await.user_stake(account)
    }

    pub async fn total_weighted_stake(&self) -> u128 {
        self.staking.read().await.total_weighted_stake()
    }

    pub async fn withdraw_penalties(&self, caller: Address) -> Result<u128, KeeperError> {
        let mut staking = self.staking.write().await;
        let mut balances = self.balances.lock().await;
        Ok(staking.withdraw_penalties(caller, &mut *balances)?)
    }

    // ── Balances ────────────────────────────────────────────────────────

    pub async fn balances_of(&self, address: Address) -> AccountBalances {
        let book = self.balances.lock().await;
        AccountBalances {
            address,
            payment: book.balance_of(Asset::Payment, &address),
            lp: book.balance_of(Asset::Lp, &address),
            keep: book.balance_of(Asset::Keep, &address),
        }
    }

    /// Mint test funds. Refused unless `enable_faucet` is set.
    pub async fn faucet(
        &self,
        account: Address,
        asset: Asset,
        amount: u128,
    ) -> Result<u128, KeeperError> {
        if !self.config.enable_faucet {
            return Err(KeeperError::FaucetDisabled);
        }
        let balance = self.balances.lock().await.credit(asset, &account, amount)?;
        debug!(account = %account, %asset, amount = %format_amount(amount), "faucet credit");
        Ok(balance)
    }

    // ── Persistence ─────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> TavernSnapshot {
        let office = self.office.read().await;
        let cellar = self.cellar.read().await;
        let staking = self.staking.read().await;
        let balances = self.balances.lock().await;
        TavernSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: self.now(),
            office: office.clone(),
            cellar: cellar.clone(),
            staking: staking.clone(),
            balances: balances.clone(),
        }
    }

    /// Write the snapshot to `data_dir` and return its path.
    pub async fn save_snapshot(&self) -> Result<PathBuf, KeeperError> {
        let path = self.config.snapshot_path();
        self.snapshot().await.save(&path)?;
        info!(path = %path.display(), "snapshot saved");
        Ok(path)
    }

    /// Prometheus text for `/metrics`.
    pub fn metrics_text(&self) -> Result<String, KeeperError> {
        Ok(self.metrics.encode()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tavern_auction::AuctionError;
    use tavern_nullables::NullClock;
    use tavern_staking::StakingError;
    use tavern_types::SCALE;

    const T0: u64 = 1_700_000_000;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn operator() -> Address {
        addr(0xee)
    }

    fn make_tavern() -> (Tavern, Arc<NullClock>) {
        let clock = Arc::new(NullClock::new(T0));
        let config = KeeperConfig {
            operator: operator(),
            enable_faucet: true,
            persist_snapshot: false,
            ..KeeperConfig::default()
        };
        let tavern = Tavern::new(config, clock.clone()).unwrap();
        (tavern, clock)
    }

    async fn fund(tavern: &Tavern, who: Address, asset: Asset, whole: u128) {
        tavern.faucet(who, asset, whole * SCALE).await.unwrap();
    }

    fn bid(epoch_id: u64, bidder: Address) -> TakeOffice {
        TakeOffice {
            bidder,
            epoch_id,
            deadline: Timestamp::new(u64::MAX),
            max_price: u128::MAX,
            uri: String::new(),
        }
    }

    #[tokio::test]
    async fn take_routes_pot_share_to_cellar() {
        let (tavern, _clock) = make_tavern();
        fund(&tavern, addr(1), Asset::Payment, 10).await;
        let receipt = tavern.take_office(bid(0, addr(1))).await.unwrap();
        assert_eq!(receipt.price_paid, SCALE / 100);
        assert_eq!(tavern.cellar_pot().await, receipt.fees.pot);
        assert_eq!(tavern.office_slot0().await.holder, Some(addr(1)));
        let balances = tavern.balances_of(addr(1)).await;
        assert_eq!(balances.payment, 10 * SCALE - SCALE / 100);
    }

    #[tokio::test]
    async fn unfunded_bid_rejected_and_counted() {
        let (tavern, _clock) = make_tavern();
        let err = tavern.take_office(bid(0, addr(1))).await.unwrap_err();
        assert_eq!(err.kind(), "settlement");
        assert_eq!(tavern.office_slot0().await.epoch_id, 0);
        let text = tavern.metrics_text().unwrap();
        assert!(text.contains("tavern_rejected_bids_total{reason=\"settlement\"} 1"));
    }

    #[tokio::test]
    async fn office_rewards_paid_in_keep() {
        let (tavern, clock) = make_tavern();
        fund(&tavern, addr(1), Asset::Payment, 10).await;
        tavern.take_office(bid(0, addr(1))).await.unwrap();
        clock.advance(10);
        let paid = tavern.claim_office_rewards(addr(1)).await.unwrap();
        assert_eq!(paid, 40 * SCALE);
        assert_eq!(tavern.balances_of(addr(1)).await.keep, 40 * SCALE);
        assert_eq!(tavern.claim_office_rewards(addr(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn pause_blocks_everything_but_reads_and_exits() {
        let (tavern, _clock) = make_tavern();
        fund(&tavern, addr(1), Asset::Payment, 10).await;
        fund(&tavern, addr(1), Asset::Keep, 10).await;
        tavern.stake(addr(1), SCALE, 0).await.unwrap();

        assert!(matches!(
            tavern.set_paused(addr(1), true).await,
            Err(KeeperError::Auction(AuctionError::Unauthorized))
        ));
        tavern.set_paused(operator(), true).await.unwrap();
        assert!(tavern.paused().await);

        assert!(matches!(
            tavern.take_office(bid(0, addr(1))).await,
            Err(KeeperError::Auction(AuctionError::Paused))
        ));
        assert!(matches!(
            tavern.stake(addr(1), SCALE, 0).await,
            Err(KeeperError::Staking(StakingError::Paused))
        ));
        tavern.unstake(addr(1), SCALE).await.unwrap();
        assert_eq!(tavern.office_price().await, SCALE / 100);

        tavern.set_paused(operator(), false).await.unwrap();
        tavern.take_office(bid(0, addr(1))).await.unwrap();
    }

    #[tokio::test]
    async fn staking_share_feeds_stakers() {
        let clock = Arc::new(NullClock::new(T0));
        let mut config = KeeperConfig {
            operator: operator(),
            enable_faucet: true,
            persist_snapshot: false,
            ..KeeperConfig::default()
        };
        config.office.fees.previous_holder_bps = 7_000;
        config.office.fees.staking_bps = 1_000;
        let tavern = Tavern::new(config, clock).unwrap();

        fund(&tavern, addr(2), Asset::Keep, 100).await;
        tavern.stake(addr(2), 100 * SCALE, 0).await.unwrap();
        fund(&tavern, addr(1), Asset::Payment, 10).await;
        let receipt = tavern.take_office(bid(0, addr(1))).await.unwrap();
        assert!(receipt.fees.staking > 0);
        assert_eq!(tavern.pending_rewards(&addr(2)).await, receipt.fees.staking);
        assert_eq!(
            tavern.claim_staking_rewards(addr(2)).await.unwrap(),
            receipt.fees.staking
        );
    }

    #[tokio::test]
    async fn lapsed_locks_share_at_base_weight() {
        let clock = Arc::new(NullClock::new(T0));
        let mut config = KeeperConfig {
            operator: operator(),
            enable_faucet: true,
            persist_snapshot: false,
            ..KeeperConfig::default()
        };
        config.office.fees.previous_holder_bps = 7_000;
        config.office.fees.staking_bps = 1_000;
        let tavern = Tavern::new(config, clock.clone()).unwrap();

        fund(&tavern, addr(2), Asset::Keep, 100).await;
        fund(&tavern, addr(3), Asset::Keep, 100).await;
        tavern.stake(addr(2), 100 * SCALE, 0).await.unwrap();
        tavern.stake(addr(3), 100 * SCALE, 365).await.unwrap();
        assert_eq!(tavern.total_weighted_stake().await, 300 * SCALE);

        clock.advance(400 * tavern_types::SECS_PER_DAY);
        fund(&tavern, addr(1), Asset::Payment, 10).await;
        let receipt = tavern.take_office(bid(0, addr(1))).await.unwrap();
        assert_eq!(tavern.total_weighted_stake().await, 200 * SCALE);
        assert_eq!(
            tavern.pending_rewards(&addr(2)).await,
            tavern.pending_rewards(&addr(3)).await
        );
        assert_eq!(tavern.pending_rewards(&addr(2)).await, receipt.fees.staking / 2);
        assert_eq!(tavern.poke_stake(addr(3)).await.unwrap().lock_multiplier, tavern_types::Wad::ONE);
    }

    #[tokio::test]
    async fn raid_and_harvest_through_balances() {
        let (tavern, _clock) = make_tavern();
        fund(&tavern, addr(3), Asset::Payment, 5).await;
        tavern.deposit_to_pot(addr(3), 5 * SCALE).await.unwrap();
        fund(&tavern, addr(4), Asset::Lp, 10).await;
        let slot = tavern.cellar_slot0().await;
        let receipt = tavern
            .raid(Raid {
                raider: addr(4),
                epoch_id: slot.epoch_id,
                deadline: Timestamp::new(u64::MAX),
                max_payment: u128::MAX,
            })
            .await
            .unwrap();
        assert_eq!(receipt.pot_won, 5 * SCALE);
        assert_eq!(tavern.harvest(addr(4)).await.unwrap(), 5 * SCALE);
        let b = tavern.balances_of(addr(4)).await;
        assert_eq!(b.payment, 5 * SCALE);
        assert_eq!(b.lp, 10 * SCALE - receipt.price_paid);
    }

    #[tokio::test]
    async fn faucet_disabled_by_default() {
        let clock = Arc::new(NullClock::new(T0));
        let tavern = Tavern::new(KeeperConfig::default(), clock).unwrap();
        assert!(matches!(
            tavern.faucet(addr(1), Asset::Payment, 1).await,
            Err(KeeperError::FaucetDisabled)
        ));
    }

    #[tokio::test]
    async fn listeners_see_routed_events() {
        let clock = Arc::new(NullClock::new(T0));
        let config = KeeperConfig {
            enable_faucet: true,
            persist_snapshot: false,
            ..KeeperConfig::default()
        };
        let mut tavern = Tavern::new(config, clock).unwrap();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&seen);
        tavern.subscribe(Box::new(move |event| {
            if matches!(event.kind(), "office_taken" | "pot_deposited") {
                s.fetch_add(1, Ordering::SeqCst);
            }
        }));
        fund(&tavern, addr(1), Asset::Payment, 1).await;
        tavern.take_office(bid(0, addr(1))).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
