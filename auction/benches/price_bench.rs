use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tavern_auction::{DecayCurve, PriceParams, SlotAuction};
use tavern_types::Timestamp;

const E18: u128 = 1_000_000_000_000_000_000;

fn make_slot(curve: DecayCurve) -> SlotAuction {
    let params = PriceParams {
        curve,
        min_init_price: 1_000 * E18,
        ..PriceParams::default()
    };
    SlotAuction::new(params, Timestamp::new(0), 0)
}

fn bench_price_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_price");

    for (name, curve) in [
        ("linear", DecayCurve::Linear { epoch_period: 3600 }),
        ("halving", DecayCurve::Halving { half_life: 3600 }),
    ] {
        let slot = make_slot(curve);
        for elapsed in [0u64, 1_800, 36_000, 360_000] {
            group.bench_with_input(BenchmarkId::new(name, elapsed), &elapsed, |b, &elapsed| {
                b.iter(|| black_box(slot.price_at(black_box(Timestamp::new(elapsed)))));
            });
        }
    }

    group.finish();
}

fn bench_next_init_price(c: &mut Criterion) {
    let params = PriceParams::default();
    c.bench_function("next_init_price", |b| {
        b.iter(|| black_box(params.next_init_price(black_box(123_456_789 * E18))));
    });
}

criterion_group!(benches, bench_price_at, bench_next_init_price);
criterion_main!(benches);
