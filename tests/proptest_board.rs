//! Property-based invariants for make/unmake, incremental hashing, and FEN
//! round-tripping, exercised over randomly sampled legal game continuations.

use chess_engine::board::Position;
use chess_engine::movegen::generate_legal;
use chess_engine::types::{Move, UndoRecord};
use chess_engine::zobrist::full_hash;
use proptest::prelude::*;
use rand::prelude::*;

fn play_random_moves(pos: &mut Position, rng: &mut StdRng, n: usize) -> Vec<(Move, UndoRecord)> {
    let mut history = Vec::with_capacity(n);
    for _ in 0..n {
        let legal = generate_legal(pos);
        if legal.is_empty() {
            break;
        }
        let mv = legal[rng.gen_range(0..legal.len())];
        let undo = pos.make_move(mv);
        history.push((mv, undo));
    }
    history
}

proptest! {
    #[test]
    fn make_unmake_restores_state(seed in any::<u64>(), num_moves in 1..20usize) {
        let mut pos = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);

        let initial_hash = pos.hash;
        let initial_fen = pos.to_fen();

        let mut history = play_random_moves(&mut pos, &mut rng, num_moves);
        while let Some((mv, undo)) = history.pop() {
            pos.unmake_move(mv, undo);
        }

        prop_assert_eq!(pos.hash, initial_hash);
        prop_assert_eq!(pos.to_fen(), initial_fen);
    }

    #[test]
    fn incremental_hash_matches_full_recompute(seed in any::<u64>(), num_moves in 1..20usize) {
        let mut pos = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let legal = generate_legal(&mut pos);
            if legal.is_empty() {
                break;
            }
            let mv = legal[rng.gen_range(0..legal.len())];
            pos.make_move(mv);
            prop_assert_eq!(pos.hash, full_hash(&pos));
        }
    }

    #[test]
    fn fen_roundtrip_preserves_position(seed in any::<u64>(), num_moves in 0..20usize) {
        let mut pos = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);
        play_random_moves(&mut pos, &mut rng, num_moves);

        let fen = pos.to_fen();
        let restored = Position::try_from_fen(&fen).unwrap();

        prop_assert_eq!(restored.to_fen(), fen);
        prop_assert_eq!(restored.hash, pos.hash);
        prop_assert_eq!(restored.white_to_move, pos.white_to_move);
        prop_assert_eq!(restored.castling_rights(), pos.castling_rights());
        prop_assert_eq!(restored.en_passant_square(), pos.en_passant_square());
    }

    #[test]
    fn legal_moves_never_leave_mover_in_check(seed in any::<u64>()) {
        let mut pos = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..10 {
            let legal = generate_legal(&mut pos);
            if legal.is_empty() {
                break;
            }
            for &mv in &legal {
                let mover_was_white = pos.white_to_move;
                let undo = pos.make_move(mv);
                let king_sq = pos.king_square(mover_was_white);
                prop_assert!(
                    !chess_engine::movegen::is_square_attacked(&pos, king_sq, !mover_was_white),
                    "legal move {mv} left the mover's king in check"
                );
                pos.unmake_move(mv, undo);
            }
            let mv = legal[rng.gen_range(0..legal.len())];
            pos.make_move(mv);
        }
    }
}
