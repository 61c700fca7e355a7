//! Static Exchange Evaluation (spec.md §4.5).
//!
//! This is the approximate, one-ply form spec.md explicitly allows rather
//! than the teacher's full recursive swap-off simulation: compute
//! victim − attacker; if that is already nonnegative, it is the answer.
//! Otherwise look for the opponent's least-valuable defender of the
//! target square. No defender → the attacker simply keeps the full
//! victim value. A cheaper defender → the exchange is bad for the
//! attacker by exactly victim − attacker. An equal-or-pricier defender →
//! the opponent has no incentive to recapture, so the attacker again
//! nets the full victim value.

use crate::board::Position;
use crate::movegen::{BISHOP_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRS};
use crate::types::{
    file_of, is_white, on_board, piece_type, rank_of, square_of, Move, BISHOP, EMPTY, KING,
    KNIGHT, PAWN, QUEEN, ROOK,
};

const VALUES: [i32; 7] = [0, 100, 320, 330, 500, 900, 20000];

#[inline]
fn value_of(kind: u8) -> i32 {
    VALUES[kind as usize]
}

/// Expected material swing (centipawns) of playing `mv`, which must be a
/// capture (including en passant).
#[must_use]
pub fn see(pos: &Position, mv: &Move) -> i32 {
    let attacker = piece_type(pos.piece_at(mv.from));
    let victim_sq = if mv.is_en_passant {
        if is_white(pos.piece_at(mv.from)) {
            mv.to - 8
        } else {
            mv.to + 8
        }
    } else {
        mv.to
    };
    let victim = piece_type(pos.piece_at(victim_sq));
    if victim == EMPTY {
        return 0;
    }

    let diff = value_of(victim) - value_of(attacker);
    if diff >= 0 {
        return diff;
    }

    match least_valuable_defender(pos, mv) {
        None => value_of(victim),
        Some(defender_value) => {
            if defender_value < value_of(attacker) {
                diff
            } else {
                value_of(victim)
            }
        }
    }
}

/// Value of the cheapest opponent piece that could recapture on `mv.to`
/// once `mv` has been played.
fn least_valuable_defender(pos: &Position, mv: &Move) -> Option<i32> {
    let mut sim = pos.clone();
    sim.make_move(*mv);

    let defender_white = sim.white_to_move;
    let sq = mv.to;
    let file = file_of(sq);
    let rank = rank_of(sq);

    // Pawns are cheapest; check first so ties resolve to the actual
    // least-valuable attacker.
    let pawn_rank_offset = if defender_white { -1 } else { 1 };
    for df in [-1, 1] {
        let pf = file + df;
        let pr = rank + pawn_rank_offset;
        if on_board(pf, pr) {
            let piece = sim.piece_at(square_of(pf, pr));
            if piece_type(piece) == PAWN && is_white(piece) == defender_white {
                return Some(value_of(PAWN));
            }
        }
    }

    let mut best: Option<i32> = None;
    let mut consider = |kind: u8| {
        let v = value_of(kind);
        if best.is_none_or(|b| v < b) {
            best = Some(v);
        }
    };

    for &(df, dr) in &KNIGHT_OFFSETS {
        let nf = file + df;
        let nr = rank + dr;
        if on_board(nf, nr) {
            let piece = sim.piece_at(square_of(nf, nr));
            if piece_type(piece) == KNIGHT && is_white(piece) == defender_white {
                consider(KNIGHT);
            }
        }
    }

    for &(df, dr) in &BISHOP_DIRS {
        if let Some(kind) = ray_attacker(&sim, file, rank, df, dr, defender_white, &[BISHOP, QUEEN]) {
            consider(kind);
        }
    }

    for &(df, dr) in &ROOK_DIRS {
        if let Some(kind) = ray_attacker(&sim, file, rank, df, dr, defender_white, &[ROOK, QUEEN]) {
            consider(kind);
        }
    }

    for &(df, dr) in &KING_OFFSETS {
        let nf = file + df;
        let nr = rank + dr;
        if on_board(nf, nr) {
            let piece = sim.piece_at(square_of(nf, nr));
            if piece_type(piece) == KING && is_white(piece) == defender_white {
                consider(KING);
            }
        }
    }

    best
}

fn ray_attacker(
    pos: &Position,
    file: i32,
    rank: i32,
    df: i32,
    dr: i32,
    defender_white: bool,
    kinds: &[u8],
) -> Option<u8> {
    let mut nf = file + df;
    let mut nr = rank + dr;
    while on_board(nf, nr) {
        let piece = pos.piece_at(square_of(nf, nr));
        if piece != EMPTY {
            if is_white(piece) == defender_white && kinds.contains(&piece_type(piece)) {
                return Some(piece_type(piece));
            }
            break;
        }
        nf += df;
        nr += dr;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    #[test]
    fn winning_capture_is_positive() {
        // White rook takes undefended black knight.
        let pos = Position::try_from_fen("4k3/8/8/3n4/8/8/8/3RK3 w - - 0 1").unwrap();
        let mv = Move::quiet(
            crate::types::parse_square("d1").unwrap(),
            crate::types::parse_square("d5").unwrap(),
        );
        assert!(see(&pos, &mv) > 0);
    }

    #[test]
    fn losing_capture_is_negative() {
        // White queen takes a pawn defended by a rook on the same file.
        let pos = Position::try_from_fen("3rk3/8/8/3p4/8/8/8/3QK3 w - - 0 1").unwrap();
        let mv = Move::quiet(
            crate::types::parse_square("d1").unwrap(),
            crate::types::parse_square("d5").unwrap(),
        );
        assert!(see(&pos, &mv) < 0);
    }

    #[test]
    fn undefended_capture_nets_full_victim_value() {
        let pos = Position::try_from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let mv = Move::quiet(
            crate::types::parse_square("d1").unwrap(),
            crate::types::parse_square("d5").unwrap(),
        );
        assert_eq!(see(&pos, &mv), value_of(QUEEN) - value_of(ROOK));
    }
}
