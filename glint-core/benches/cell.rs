//! Benchmarks for the reactive cell hot paths.
//!
//! Run with: cargo bench -p glint-core

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glint_core::{Cell, Computation, Reactor};
use std::hint::black_box;

fn bench_settled_read(c: &mut Criterion) {
    let reactor = Reactor::new();
    let cell = reactor.cell(Computation::literal(42i64));
    cell.value().expect("literal settles");

    c.bench_function("cell/settled_read", |b| {
        b.iter(|| black_box(cell.value()))
    });
}

fn bench_update_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell/update_drain");

    for n in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::new("sync", n), &n, |b, &n| {
            let reactor = Reactor::new();
            let cell = reactor.cell(Computation::literal(0i64));
            cell.value().expect("literal settles");

            b.iter(|| {
                for _ in 0..n {
                    let _ = cell.update(Computation::sync(|prev: Option<&i64>| {
                        Ok(prev.copied().unwrap_or(0) + 1)
                    }));
                }
                black_box(cell.value())
            })
        });
    }

    group.finish();
}

/// Chain of cells where each reads its predecessor; updating the root
/// re-runs the whole chain.
fn bench_refresh_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell/refresh_chain");

    for depth in [2usize, 8, 32] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            let reactor = Reactor::new();
            let root = reactor.cell(Computation::literal(0i64));

            let mut tail = root.clone();
            for _ in 1..depth {
                let prev = tail.clone();
                tail = reactor.cell(Computation::sync(move |_| Ok(prev.value()? + 1)));
            }
            tail.value().expect("chain settles");

            b.iter(|| {
                let _ = root.set(black_box(1));
                black_box(tail.value())
            })
        });
    }

    group.finish();
}

fn bench_resolver_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell/resolver_reuse");

    for n in [8usize, 64] {
        group.bench_with_input(BenchmarkId::new("cells", n), &n, |b, &n| {
            let reactor = Reactor::new();

            // Seed one generation so every later pass reuses.
            render_pass(&reactor, n);

            b.iter(|| render_pass(&reactor, n))
        });
    }

    group.finish();
}

fn render_pass(reactor: &Reactor, n: usize) {
    reactor.begin_generation(|| {
        reactor.enter_scope("bench", || {
            for _ in 0..n {
                let cell: Cell<i64> = reactor.cell(Computation::literal(7));
                let _ = black_box(cell.value());
            }
        })
    })
}

criterion_group!(
    benches,
    bench_settled_read,
    bench_update_drain,
    bench_refresh_chain,
    bench_resolver_reuse,
);

criterion_main!(benches);
