//! # Block Lifecycle Benchmarks
//!
//! ```bash
//! cargo bench --package mc-tests --bench lifecycle_benchmarks
//! ```
//!
//! | Group | Measures |
//! |-------|----------|
//! | lifecycle/empty_block | begin, end and commit with no transactions |
//! | lifecycle/transfers | a block of N signed bank transfers |
//! | lifecycle/check_tx | admission of one transfer against check state |
//! | lifecycle/init_chain | assembly plus genesis with N funded accounts |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use mc_tests::fixtures::*;
use std::time::Duration;

fn funded_actors(n: u8) -> Vec<Actor> {
    (0..n).map(|i| Actor::from_seed(100 + i)).collect()
}

fn chain_with(actors: &[Actor]) -> TestChain {
    let funded: Vec<_> = actors.iter().map(|a| (a, "1000000stake")).collect();
    let mut chain = TestChain::new(&genesis(&funded));
    chain.next_block(&[]);
    chain
}

fn transfers(chain: &TestChain, actors: &[Actor]) -> Vec<Vec<u8>> {
    actors
        .iter()
        .zip(actors.iter().cycle().skip(1))
        .map(|(from, to)| chain.sign(from, vec![send_msg(from.address, to.address, "10stake")], "1stake"))
        .collect()
}

fn bench_empty_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle/empty_block");
    let mut chain = chain_with(&funded_actors(1));
    group.bench_function("begin_end_commit", |b| {
        b.iter(|| black_box(chain.next_block(&[]).app_hash))
    });
    group.finish();
}

fn bench_transfers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle/transfers");
    group.measurement_time(Duration::from_secs(10));
    for n in [1u8, 10, 50] {
        let actors = funded_actors(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &actors, |b, actors| {
            b.iter_batched(
                || {
                    let chain = chain_with(actors);
                    let txs = transfers(&chain, actors);
                    (chain, txs)
                },
                |(mut chain, txs)| black_box(chain.next_block(&txs).app_hash),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_check_tx(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle/check_tx");
    let actors = funded_actors(2);
    group.bench_function("single_transfer", |b| {
        b.iter_batched(
            || {
                let chain = chain_with(&actors);
                let tx = transfers(&chain, &actors[..1]).remove(0);
                (chain, tx)
            },
            |(mut chain, tx)| black_box(chain.check(&tx).code),
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn bench_init_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle/init_chain");
    for n in [10u8, 100] {
        let actors = funded_actors(n);
        let funded: Vec<_> = actors.iter().map(|a| (a, "1000stake")).collect();
        let doc = genesis(&funded);
        group.bench_with_input(BenchmarkId::from_parameter(n), &doc, |b, doc| {
            b.iter(|| black_box(TestChain::new(doc).genesis_validators.len()))
        });
    }
    group.finish();
}

criterion_group!(
    name = lifecycle_benches;
    config = Criterion::default().sample_size(20);
    targets =
        bench_empty_block,
        bench_transfers,
        bench_check_tx,
        bench_init_chain,
);

criterion_main!(lifecycle_benches);
