use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tavern_nullables::NullSettlement;
use tavern_staking::{StakingLedger, StakingParams};
use tavern_types::{Address, Timestamp, SCALE};

fn make_ledger(accounts: u32) -> StakingLedger {
    let mut ledger = StakingLedger::new(StakingParams::default(), Address::ZERO).unwrap();
    let mut settle = NullSettlement::new();
    for i in 0..accounts {
        let mut bytes = [0u8; 20];
        bytes[..4].copy_from_slice(&i.to_be_bytes());
        ledger
            .stake(Address::new(bytes), 1_000 * SCALE, (i % 400) as u64, Timestamp::new(0), &mut settle)
            .unwrap();
    }
    ledger.notify_reward(1_000 * SCALE).unwrap();
    ledger
}

fn bench_pending(c: &mut Criterion) {
    let mut group = c.benchmark_group("staking_pending");

    for accounts in [1u32, 100, 10_000] {
        let ledger = make_ledger(accounts);
        let target = Address::new([0; 20]);
        group.bench_with_input(BenchmarkId::new("pending_rewards", accounts), &accounts, |b, _| {
            b.iter(|| black_box(ledger.pending_rewards(black_box(&target))));
        });
    }

    group.finish();
}

fn bench_notify(c: &mut Criterion) {
    let mut ledger = make_ledger(100);
    c.bench_function("notify_reward", |b| {
        b.iter(|| black_box(ledger.notify_reward(black_box(SCALE)).unwrap()));
    });
}

criterion_group!(benches, bench_pending, bench_notify);
criterion_main!(benches);
