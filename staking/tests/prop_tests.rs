use proptest::prelude::*;

use tavern_nullables::NullSettlement;
use tavern_staking::{EarlyExitPolicy, StakingLedger, StakingParams};
use tavern_types::{mul_div, Address, Asset, Timestamp, Wad, SCALE, SECS_PER_DAY};

#[derive(Clone, Debug)]
enum Op {
    Stake { who: u8, amount: u128, lock_days: u64 },
    Unstake { who: u8, full: bool },
    Reward { amount: u128 },
    Claim { who: u8 },
    Wait { days: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, SCALE..1_000_000 * SCALE, 0u64..400)
            .prop_map(|(who, amount, lock_days)| Op::Stake { who, amount, lock_days }),
        (0u8..4, any::<bool>()).prop_map(|(who, full)| Op::Unstake { who, full }),
        (0u128..10_000 * SCALE).prop_map(|amount| Op::Reward { amount }),
        (0u8..4).prop_map(|who| Op::Claim { who }),
        (0u64..120).prop_map(|days| Op::Wait { days }),
    ]
}

fn penalizing_ledger() -> StakingLedger {
    let params = StakingParams {
        early_exit: EarlyExitPolicy::Penalize { penalty_bps: 2_500 },
        ..StakingParams::default()
    };
    StakingLedger::new(params, Address::ZERO).unwrap()
}

fn apply(ledger: &mut StakingLedger, settle: &mut NullSettlement, op: &Op, now: &mut u64) {
    let at = Timestamp::new(*now);
    match *op {
        Op::Stake { who, amount, lock_days } => {
            ledger.stake(Address::new([who; 20]), amount, lock_days, at, settle).unwrap();
        }
        Op::Unstake { who, full } => {
            let account = Address::new([who; 20]);
            let staked = ledger.user_stake(&account).amount;
            // Partial exits leave at least one whole unit staked.
            let amount = if full { staked } else { staked.saturating_sub(SCALE) / 2 };
            if amount > 0 {
                ledger.unstake(account, amount, at, settle).unwrap();
            }
        }
        Op::Reward { amount } => {
            ledger.expire_locks(at).unwrap();
            ledger.notify_reward(amount).unwrap();
        }
        Op::Claim { who } => {
            ledger.claim_rewards(Address::new([who; 20]), at, settle).unwrap();
        }
        Op::Wait { days } => *now += days * SECS_PER_DAY,
    }
}

proptest! {
    /// The weighted total always equals the sum of per-account weights.
    #[test]
    fn weighted_total_is_conserved(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ledger = penalizing_ledger();
        let mut settle = NullSettlement::new();
        let mut now = 0u64;
        for op in &ops {
            apply(&mut ledger, &mut settle, op, &mut now);
            let sum: u128 = ledger
                .stakes()
                .map(|(_, info)| info.weighted().unwrap())
                .sum();
            prop_assert_eq!(ledger.total_weighted_stake(), sum);
            let principal: u128 = ledger.stakes().map(|(_, info)| info.amount).sum();
            prop_assert_eq!(ledger.total_staked(), principal);
        }
    }

    /// Rewards paid never exceed rewards notified.
    #[test]
    fn payouts_never_exceed_distributions(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ledger = penalizing_ledger();
        let mut settle = NullSettlement::new();
        let mut now = 0u64;
        let mut notified = 0u128;
        for op in &ops {
            if let Op::Reward { amount } = op {
                notified += amount;
            }
            apply(&mut ledger, &mut settle, op, &mut now);
        }
        for who in 0u8..4 {
            ledger
                .claim_rewards(Address::new([who; 20]), Timestamp::new(now), &mut settle)
                .unwrap();
        }
        let paid: u128 = settle
            .transfers()
            .iter()
            .filter(|t| t.asset == Asset::Payment)
            .map(|t| t.amount)
            .sum();
        prop_assert!(paid <= notified, "paid {} of {} notified", paid, notified);
    }

    /// A claim with nothing in between pays zero.
    #[test]
    fn second_claim_pays_zero(
        amount in 1u128..1_000_000 * SCALE,
        lock_days in 0u64..1_000,
        reward in SCALE..1_000_000 * SCALE,
    ) {
        let mut ledger = penalizing_ledger();
        let mut settle = NullSettlement::new();
        let who = Address::new([1; 20]);
        ledger.stake(who, amount, lock_days, Timestamp::new(0), &mut settle).unwrap();
        ledger.notify_reward(reward).unwrap();
        let first = ledger.claim_rewards(who, Timestamp::new(0), &mut settle).unwrap();
        prop_assert!(first > 0);
        prop_assert_eq!(ledger.pending_rewards(&who), 0);
        prop_assert_eq!(ledger.claim_rewards(who, Timestamp::new(0), &mut settle).unwrap(), 0);
    }

    /// Pending matches what a claim actually pays.
    #[test]
    fn pending_matches_claim(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut ledger = penalizing_ledger();
        let mut settle = NullSettlement::new();
        let mut now = 0u64;
        for op in &ops {
            apply(&mut ledger, &mut settle, op, &mut now);
        }
        for who in 0u8..4 {
            let account = Address::new([who; 20]);
            let pending = ledger.pending_rewards(&account);
            prop_assert_eq!(
                ledger.claim_rewards(account, Timestamp::new(now), &mut settle).unwrap(),
                pending
            );
        }
    }

    /// After a sweep, nobody past their lock expiry still carries a bonus.
    #[test]
    fn sweep_leaves_no_lapsed_bonus(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut ledger = penalizing_ledger();
        let mut settle = NullSettlement::new();
        let mut now = 0u64;
        for op in &ops {
            apply(&mut ledger, &mut settle, op, &mut now);
        }
        let at = Timestamp::new(now);
        ledger.expire_locks(at).unwrap();
        for (_, info) in ledger.stakes() {
            if info.amount > 0 && !info.is_locked(at) {
                prop_assert_eq!(info.lock_multiplier, Wad::ONE);
            }
        }
        let sum: u128 = ledger.stakes().map(|(_, info)| info.weighted().unwrap()).sum();
        prop_assert_eq!(ledger.total_weighted_stake(), sum);
    }
}

/// 1000 staked for a year at 2.0× is 2000 weighted; 100 ticks of 0.01 per
/// weighted unit pay 2000.
#[test]
fn scenario_year_lock_hundred_ticks() {
    let mut ledger = StakingLedger::new(StakingParams::default(), Address::ZERO).unwrap();
    let mut settle = NullSettlement::new();
    let who = Address::new([7; 20]);
    ledger
        .stake(who, 1_000 * SCALE, 365, Timestamp::new(0), &mut settle)
        .unwrap();

    let info = ledger.user_stake(&who);
    assert_eq!(info.lock_multiplier, Wad::from_raw(2 * SCALE));
    assert_eq!(info.weighted().unwrap(), 2_000 * SCALE);

    for _ in 0..100 {
        // 20 over 2000 weighted raises the accumulator by 0.01.
        ledger.notify_reward(20 * SCALE).unwrap();
    }
    assert_eq!(ledger.reward_per_weighted_stake(), SCALE);
    assert_eq!(ledger.pending_rewards(&who), 2_000 * SCALE);
    assert_eq!(
        ledger.pending_rewards(&who),
        mul_div(info.weighted().unwrap(), ledger.reward_per_weighted_stake(), SCALE).unwrap()
    );
}
