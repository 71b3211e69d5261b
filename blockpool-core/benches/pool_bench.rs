#[macro_use]
extern crate criterion;

use criterion::Criterion;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use blockpool_core::alloc::{PoolAllocator, DEFAULT_CAPACITY};

fn bench_allocate_free(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_allocate_free");

    for size in [16, 256, 4096] {
        group.throughput(criterion::Throughput::Elements(1));
        group.bench_function(format!("size_{}", size), |b| {
            let mut pool = PoolAllocator::new(DEFAULT_CAPACITY).unwrap();
            b.iter(|| {
                let handle = pool.allocate(size).unwrap();
                pool.free(handle).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_fragmented_churn(c: &mut Criterion) {
    c.bench_function("pool_fragmented_churn", |b| {
        let mut pool = PoolAllocator::new(DEFAULT_CAPACITY).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut live = Vec::with_capacity(512);

        // Leave the pool half full with scattered holes.
        while pool.used() < DEFAULT_CAPACITY / 2 {
            live.push(pool.allocate(rng.random_range(8..256)).unwrap());
        }
        for i in (0..live.len()).rev().step_by(2) {
            pool.free(live.swap_remove(i)).unwrap();
        }

        b.iter(|| {
            let size = rng.random_range(8..256);
            if let Ok(handle) = pool.allocate(size) {
                pool.free(handle).unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_allocate_free, bench_fragmented_churn);
criterion_main!(benches);
