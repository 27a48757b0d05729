//! Benchmark for the iteration engine.
//!
//! # Benchmark Categories
//!
//! 1. **Dispatch**: parallel against serial map, per callable shape
//! 2. **Reduce**: accumulator threading over plain and suspending callables
//!
//! All groups run on a current-thread tokio runtime through
//! `criterion::to_async()`, so the numbers measure combinator overhead rather
//! than thread scheduling.

use cofn::callable::{Callable, Step};
use cofn::collection::Key;
use cofn::{map, map_serial, reduce};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build benchmark runtime")
}

fn double_plain() -> Callable<(u64, Key), u64> {
    Callable::plain(|value: u64, _key: Key| value * 2)
}

fn double_deferred() -> Callable<(u64, Key), u64> {
    Callable::deferred(|value: u64, _key: Key| async move {
        tokio::task::yield_now().await;
        value * 2
    })
}

fn double_suspending() -> Callable<(u64, Key), u64> {
    Callable::suspending(|value: u64, _key: Key| {
        Step::suspend(tokio::task::yield_now(), move |()| Step::done(value * 2))
    })
}

// =============================================================================
// Dispatch Benchmarks
// =============================================================================

fn benchmark_map_dispatch(criterion: &mut Criterion) {
    let runtime = runtime();
    let mut group = criterion.benchmark_group("engine_map_dispatch");

    let shapes = [
        ("plain", double_plain()),
        ("deferred", double_deferred()),
        ("suspending", double_suspending()),
    ];

    for size in [10u64, 100, 1000] {
        let input: Vec<u64> = (0..size).collect();

        for (shape, callable) in &shapes {
            group.bench_with_input(
                BenchmarkId::new(format!("{shape}_parallel"), size),
                &input,
                |bencher, input| {
                    bencher
                        .to_async(&runtime)
                        .iter(|| async { black_box(map(callable.clone(), input).await) });
                },
            );

            group.bench_with_input(
                BenchmarkId::new(format!("{shape}_serial"), size),
                &input,
                |bencher, input| {
                    bencher
                        .to_async(&runtime)
                        .iter(|| async { black_box(map_serial(callable.clone(), input).await) });
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// Reduce Benchmarks
// =============================================================================

fn benchmark_reduce(criterion: &mut Criterion) {
    let runtime = runtime();
    let mut group = criterion.benchmark_group("engine_reduce");

    let plain: Callable<(u64, u64, usize), u64> =
        Callable::plain(|total: u64, value: u64, _index: usize| total + value);
    let suspending: Callable<(u64, u64, usize), u64> =
        Callable::suspending(|total: u64, value: u64, _index: usize| {
            Step::suspend(async move { value }, move |value| Step::done(total + value))
        });

    for size in [100u64, 1000] {
        let input: Vec<u64> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("plain", size), &input, |bencher, input| {
            bencher
                .to_async(&runtime)
                .iter(|| async { black_box(reduce(plain.clone(), 0, input).await) });
        });

        group.bench_with_input(BenchmarkId::new("suspending", size), &input, |bencher, input| {
            bencher
                .to_async(&runtime)
                .iter(|| async { black_box(reduce(suspending.clone(), 0, input).await) });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_map_dispatch, benchmark_reduce);
criterion_main!(benches);
