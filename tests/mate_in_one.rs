//! Data-driven mate-in-one regression suite (spec.md §8), loaded from a
//! small embedded JSON fixture the way the teacher's `mate_in_one.rs`
//! loads `tests/data/problems.json`.

use serde::Deserialize;

use chess_engine::board::Position;
use chess_engine::movegen::generate_legal;

#[derive(Deserialize)]
struct ProblemSet {
    problems: Vec<Problem>,
}

#[derive(Deserialize)]
struct Problem {
    fen: String,
    mate_move: String,
}

#[test]
fn mate_in_one_suite() {
    let data = include_str!("data/mate_in_one.json");
    let set: ProblemSet = serde_json::from_str(data).expect("invalid mate_in_one.json");

    for problem in &set.problems {
        let mut pos = Position::try_from_fen(&problem.fen)
            .unwrap_or_else(|e| panic!("invalid fen {}: {e}", problem.fen));

        let mv = pos
            .parse_move(&problem.mate_move)
            .unwrap_or_else(|e| panic!("invalid move {} for {}: {e}", problem.mate_move, problem.fen));
        assert!(
            generate_legal(&mut pos).contains(&mv),
            "{} is not legal in {}",
            problem.mate_move,
            problem.fen
        );

        pos.make_move(mv);

        assert!(
            pos.is_in_check(pos.white_to_move),
            "{} did not deliver check in {}",
            problem.mate_move,
            problem.fen
        );
        assert!(
            generate_legal(&mut pos).is_empty(),
            "{} did not deliver mate in {}: opponent still has legal replies",
            problem.mate_move,
            problem.fen
        );
    }
}
