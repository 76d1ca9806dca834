//! End-to-end keeper tests: concurrent bidders, fee routing across the
//! engines, and snapshot persistence through a real directory.

use std::sync::Arc;

use tavern_auction::{AuctionError, Raid, TakeOffice};
use tavern_keeper::{KeeperConfig, KeeperError, Tavern};
use tavern_nullables::NullClock;
use tavern_types::{Address, Asset, Timestamp, SCALE};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const T0: u64 = 1_700_000_000;

fn addr(n: u8) -> Address {
    Address::new([n; 20])
}

fn test_config() -> KeeperConfig {
    KeeperConfig {
        operator: addr(0xee),
        enable_faucet: true,
        persist_snapshot: false,
        ..KeeperConfig::default()
    }
}

fn bid(bidder: Address, epoch_id: u64) -> TakeOffice {
    TakeOffice {
        bidder,
        epoch_id,
        deadline: Timestamp::new(u64::MAX),
        max_price: u128::MAX,
        uri: format!("ipfs://{bidder}"),
    }
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_winner_per_epoch_under_contention() {
    let clock = Arc::new(NullClock::new(T0));
    let tavern = Arc::new(Tavern::new(test_config(), clock).unwrap());
    for n in 1..=8u8 {
        tavern
            .faucet(addr(n), Asset::Payment, 10 * SCALE)
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for n in 1..=8u8 {
        let tavern = Arc::clone(&tavern);
        handles.push(tokio::spawn(async move {
            tavern.take_office(bid(addr(n), 0)).await
        }));
    }

    let mut winners = 0;
    let mut mismatches = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(KeeperError::Auction(AuctionError::EpochMismatch { expected: 1, got: 0 })) => {
                mismatches += 1
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(mismatches, 7);
    assert_eq!(tavern.office_slot0().await.epoch_id, 1);
}

// ---------------------------------------------------------------------------
// Fee routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successive_takes_pay_previous_holder_and_fill_pot() {
    let clock = Arc::new(NullClock::new(T0));
    let tavern = Tavern::new(test_config(), clock.clone()).unwrap();
    let (alice, bob) = (addr(1), addr(2));
    tavern.faucet(alice, Asset::Payment, 10 * SCALE).await.unwrap();
    tavern.faucet(bob, Asset::Payment, 10 * SCALE).await.unwrap();

    let first = tavern.take_office(bid(alice, 0)).await.unwrap();
    clock.advance(60);
    let second = tavern.take_office(bid(bob, 1)).await.unwrap();

    assert_eq!(second.previous_holder, Some(alice));
    assert!(second.fees.previous_holder > 0);
    assert_eq!(tavern.cellar_pot().await, first.fees.pot + second.fees.pot);

    let proceeds = tavern.withdraw_proceeds(alice).await.unwrap();
    assert_eq!(proceeds, second.fees.previous_holder);
    let accrued = tavern.claim_office_rewards(alice).await.unwrap();
    assert_eq!(accrued, second.settled_accrual);
    assert_eq!(tavern.balances_of(alice).await.keep, accrued);

    // The displaced holder is cooling down.
    let (ok, remaining) = tavern.can_claim_office(&alice).await;
    assert!(!ok);
    assert!(remaining > 0);
}

#[tokio::test]
async fn pot_flows_to_raider() {
    let clock = Arc::new(NullClock::new(T0));
    let tavern = Tavern::new(test_config(), clock).unwrap();
    tavern.faucet(addr(1), Asset::Payment, SCALE).await.unwrap();
    tavern.take_office(bid(addr(1), 0)).await.unwrap();
    let pot = tavern.cellar_pot().await;
    assert!(pot > 0);

    let raider = addr(9);
    tavern.faucet(raider, Asset::Lp, 5 * SCALE).await.unwrap();
    let receipt = tavern
        .raid(Raid {
            raider,
            epoch_id: 0,
            deadline: Timestamp::new(u64::MAX),
            max_payment: 5 * SCALE,
        })
        .await
        .unwrap();
    assert_eq!(receipt.pot_won, pot);
    assert_eq!(tavern.cellar_pot().await, 0);
    assert_eq!(tavern.harvest(raider).await.unwrap(), pot);
    assert_eq!(tavern.balances_of(raider).await.payment, pot);
}

// ---------------------------------------------------------------------------
// Eviction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overstayed_holder_evicted_to_operator() {
    let clock = Arc::new(NullClock::new(T0));
    let tavern = Tavern::new(test_config(), clock.clone()).unwrap();
    tavern.faucet(addr(1), Asset::Payment, SCALE).await.unwrap();
    tavern.take_office(bid(addr(1), 0)).await.unwrap();

    let status = tavern.check_max_hold_time().await;
    assert!(!status.has_exceeded);
    assert!(matches!(
        tavern.evict(addr(5)).await,
        Err(KeeperError::Auction(AuctionError::HoldTimeNotExceeded { .. }))
    ));

    clock.advance(status.time_remaining);
    assert!(tavern.check_max_hold_time().await.has_exceeded);
    let slot = tavern.evict(addr(5)).await.unwrap();
    assert_eq!(slot.holder, Some(addr(0xee)));
    assert_eq!(slot.epoch_id, 2);

    // The evicted holder's accrual is credited, none of it goes to the zero address.
    assert!(tavern.claimable_office_rewards(&addr(1)).await.unwrap() > 0);
    assert_eq!(tavern.claimable_office_rewards(&Address::ZERO).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = KeeperConfig {
        data_dir: dir.path().to_path_buf(),
        persist_snapshot: true,
        ..test_config()
    };
    let clock = Arc::new(NullClock::new(T0));

    {
        let tavern = Tavern::open(config.clone(), clock.clone()).unwrap();
        tavern.faucet(addr(1), Asset::Payment, SCALE).await.unwrap();
        tavern.faucet(addr(2), Asset::Keep, 50 * SCALE).await.unwrap();
        tavern.take_office(bid(addr(1), 0)).await.unwrap();
        tavern.stake(addr(2), 50 * SCALE, 90).await.unwrap();
        let path = tavern.save_snapshot().await.unwrap();
        assert!(path.exists());
    }

    clock.advance(30);
    let restored = Tavern::open(config, clock).unwrap();
    let slot = restored.office_slot0().await;
    assert_eq!(slot.epoch_id, 1);
    assert_eq!(slot.holder, Some(addr(1)));
    assert_eq!(restored.user_stake(&addr(2)).await.amount, 50 * SCALE);
    assert_eq!(
        restored.total_weighted_stake().await,
        50 * SCALE + 50 * SCALE / 4
    );
    assert!(restored.cellar_pot().await > 0);
    assert_eq!(
        restored.balances_of(addr(1)).await.payment,
        SCALE - SCALE / 100
    );
}

#[tokio::test]
async fn missing_snapshot_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let config = KeeperConfig {
        data_dir: dir.path().join("nothing-here"),
        persist_snapshot: true,
        ..test_config()
    };
    let tavern = Tavern::open(config, Arc::new(NullClock::new(T0))).unwrap();
    assert_eq!(tavern.office_slot0().await.epoch_id, 0);
    assert_eq!(tavern.cellar_pot().await, 0);
}
