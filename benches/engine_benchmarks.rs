//! Perft, move generation, evaluation, and search throughput benchmarks.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_engine::board::Position;
use chess_engine::eval::evaluate;
use chess_engine::movegen::generate_legal;
use chess_engine::search::{SearchLimits, SearchOptions, Searcher};
use chess_engine::tt::TranspositionTable;

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let mut startpos = Position::new();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| startpos.perft(black_box(depth)));
        });
    }

    let mut kiwipete = Position::try_from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
    )
    .unwrap();
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| kiwipete.perft(black_box(depth)));
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let mut startpos = Position::new();
    group.bench_function("startpos", |b| b.iter(|| black_box(generate_legal(&mut startpos))));

    let mut middlegame = Position::try_from_fen(
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq -",
    )
    .unwrap();
    group.bench_function("middlegame", |b| b.iter(|| black_box(generate_legal(&mut middlegame))));

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");
    let positions = [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
        ("middlegame", "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq -"),
        ("endgame", "8/5k2/8/8/8/8/5K2/4R3 w - -"),
    ];
    for (name, fen) in positions {
        let pos = Position::try_from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::new("position", name), &pos, |b, pos| {
            b.iter(|| black_box(evaluate(pos)));
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for depth in [3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut pos = Position::new();
                let mut tt = TranspositionTable::new(16);
                let mut searcher = Searcher::new(
                    &mut pos,
                    &mut tt,
                    Arc::new(AtomicBool::new(false)),
                    SearchOptions::default(),
                    SearchLimits { max_depth: depth, deadline: None, node_limit: None },
                );
                searcher.run(|_| {})
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_eval, bench_search);
criterion_main!(benches);
