use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use kv_fifo::KvFifo;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    // 256 distinct keys so every key repeats
    format!("k{:02x}", n >> 56)
}

fn filled(n: usize, seed: u64) -> KvFifo<String, u64> {
    lcg(seed).take(n).map(|x| (key(x), x)).collect()
}

fn bench_push(c: &mut Criterion) {
    c.bench_function("kv_fifo_push_10k", |b| {
        b.iter_batched(
            KvFifo::<String, u64>::new,
            |mut q| {
                for x in lcg(1).take(10_000) {
                    q.push(key(x), x);
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_pop_key(c: &mut Criterion) {
    c.bench_function("kv_fifo_pop_key_5k_of_10k", |b| {
        b.iter_batched(
            || filled(10_000, 2),
            |mut q| {
                for x in lcg(3).take(5_000) {
                    let _ = black_box(q.pop_key(key(x).as_str()));
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_move_to_back(c: &mut Criterion) {
    c.bench_function("kv_fifo_move_to_back", |b| {
        let mut q = filled(10_000, 4);
        let mut keys = lcg(5).map(key);
        b.iter(|| {
            let k = keys.next().unwrap();
            let _ = black_box(q.move_to_back(k.as_str()));
        })
    });
}

fn bench_first_lookup(c: &mut Criterion) {
    c.bench_function("kv_fifo_first_hit", |b| {
        let q = filled(10_000, 6);
        let mut keys = lcg(7).map(key);
        b.iter(|| {
            let k = keys.next().unwrap();
            let _ = black_box(q.first(k.as_str()));
        })
    });
}

fn bench_clone_then_diverge(c: &mut Criterion) {
    c.bench_function("kv_fifo_clone_share", |b| {
        let q = filled(10_000, 8);
        b.iter(|| black_box(q.clone()))
    });
    c.bench_function("kv_fifo_clone_then_push_10k", |b| {
        let q = filled(10_000, 9);
        b.iter_batched(
            || q.clone(),
            |mut d| {
                d.push("fresh".to_string(), 0);
                black_box(d)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_push, bench_pop_key, bench_move_to_back, bench_first_lookup, bench_clone_then_diverge
}
criterion_main!(benches);
