//! End-to-end search scenarios (spec.md §8, scenarios 4-6).

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chess_engine::board::Position;
use chess_engine::movegen::generate_legal;
use chess_engine::search::{Score, SearchLimits, SearchOptions, Searcher};
use chess_engine::tt::TranspositionTable;

fn run_search(pos: &mut Position, max_depth: u32) -> (chess_engine::types::Move, i32) {
    let mut tt = TranspositionTable::new(4);
    let mut score = 0;
    let mut searcher = Searcher::new(
        pos,
        &mut tt,
        Arc::new(AtomicBool::new(false)),
        SearchOptions::default(),
        SearchLimits { max_depth, deadline: None, node_limit: None },
    );
    let best = searcher.run(|info| {
        score = match info.score {
            Score::Cp(cp) => cp,
            Score::Mate(n) => {
                if n > 0 {
                    30_000
                } else {
                    -30_000
                }
            }
        };
    });
    (best, score)
}

#[test]
fn scenario_4_open_game_produces_legal_move_within_plausible_score() {
    let mut pos = Position::new();
    let e4 = pos.parse_move("e2e4").unwrap();
    pos.make_move(e4);
    let e5 = pos.parse_move("e7e5").unwrap();
    pos.make_move(e5);

    let legal = generate_legal(&mut pos);
    let (best, score) = run_search(&mut pos, 4);

    assert!(legal.contains(&best), "bestmove {best} not in legal move list");
    assert!(score.abs() <= 1500, "score {score} outside plausible range");
}

#[test]
fn scenario_5_fools_mate_reports_terminal_result() {
    let mut pos =
        Position::try_from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq -")
            .unwrap();
    assert!(generate_legal(&mut pos).is_empty());

    let (best, _) = run_search(&mut pos, 2);
    assert!(best.is_null(), "expected bestmove 0000, got {best}");
}

#[test]
fn scenario_6_lone_pawn_promotes() {
    let mut pos = Position::try_from_fen("8/P7/8/8/8/8/8/K6k w - -").unwrap();
    let (best, _) = run_search(&mut pos, 1);
    let s = best.to_string();
    assert!(
        ["a7a8q", "a7a8r", "a7a8b", "a7a8n"].contains(&s.as_str()),
        "unexpected bestmove {s}"
    );
}

#[test]
fn stop_flag_never_corrupts_position() {
    let mut pos = Position::new();
    let before = pos.clone();
    let mut tt = TranspositionTable::new(1);
    let stop = Arc::new(AtomicBool::new(true));
    let mut searcher = Searcher::new(
        &mut pos,
        &mut tt,
        stop,
        SearchOptions::default(),
        SearchLimits { max_depth: 6, deadline: None, node_limit: None },
    );
    searcher.run(|_| {});
    assert_eq!(pos.to_fen(), before.to_fen());
}
