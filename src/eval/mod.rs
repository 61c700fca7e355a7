//! Static evaluation (spec.md §4.6): a centipawn score relative to the
//! side to move, built from material/PSTs plus a handful of positional
//! terms, with a short-circuit for known drawn/won K+X vs K endgames.

mod endgame;
mod tables;

use crate::board::Position;
use crate::movegen::mobility_count;
use crate::types::{
    file_of, is_white, piece_type, rank_of, square_of, Move, Square, BISHOP, EMPTY, KING, KNIGHT,
    PAWN, QUEEN, ROOK, WHITE,
};

pub use tables::material_value;

const DOUBLED_PAWN_PENALTY: i32 = -15;
const ISOLATED_PAWN_PENALTY: i32 = -20;
const PAWN_CHAIN_BONUS: i32 = 5;
const PASSED_PAWN_BONUS: [i32; 8] = [0, 10, 20, 35, 60, 100, 150, 0];

const KING_SHIELD_BONUS: i32 = 10;
const KING_OPEN_FILE_PENALTY: i32 = -25;
const KING_SEMI_OPEN_FILE_PENALTY: i32 = -15;

const BISHOP_PAIR_BONUS: i32 = 50;
const ROOK_OPEN_FILE_BONUS: i32 = 25;
const ROOK_SEMI_OPEN_FILE_BONUS: i32 = 15;
const ROOK_SEVENTH_RANK_BONUS: i32 = 30;
const CONNECTED_ROOKS_BONUS: i32 = 15;

const MOBILITY_WEIGHTS: [i32; 7] = [0, 0, 4, 5, 3, 2, 0];

const CENTRE_SQUARE_BONUS: i32 = 15;
const EXTENDED_CENTRE_BONUS: i32 = 8;

/// Returns `true` for squares occupied by a pawn of `white`.
fn pawn_on_file(pos: &Position, file: i32, white: bool) -> bool {
    (0..8).any(|rank| {
        let piece = pos.piece_at(square_of(file, rank));
        piece_type(piece) == PAWN && is_white(piece) == white
    })
}

struct PawnFacts {
    by_file: [u32; 8],
}

fn pawn_facts(pos: &Position, white: bool) -> PawnFacts {
    let mut by_file = [0u32; 8];
    for sq in 0..64 {
        let piece = pos.piece_at(sq);
        if piece_type(piece) == PAWN && is_white(piece) == white {
            by_file[file_of(sq) as usize] += 1;
        }
    }
    PawnFacts { by_file }
}

fn is_passed_pawn(pos: &Position, sq: Square, white: bool) -> bool {
    let file = file_of(sq);
    let rank = rank_of(sq);
    for df in -1..=1 {
        let f = file + df;
        if !(0..8).contains(&f) {
            continue;
        }
        for r in 0..8 {
            let ahead = if white { r > rank } else { r < rank };
            if !ahead {
                continue;
            }
            let piece = pos.piece_at(square_of(f, r));
            if piece_type(piece) == PAWN && is_white(piece) != white {
                return false;
            }
        }
    }
    true
}

fn is_defended_by_pawn(pos: &Position, sq: Square, white: bool) -> bool {
    let file = file_of(sq);
    let rank = rank_of(sq);
    let behind = if white { rank - 1 } else { rank + 1 };
    for df in [-1, 1] {
        let f = file + df;
        if (0..8).contains(&f) && (0..8).contains(&behind) {
            let piece = pos.piece_at(square_of(f, behind));
            if piece_type(piece) == PAWN && is_white(piece) == white {
                return true;
            }
        }
    }
    false
}

fn pawn_structure_score(pos: &Position, white: bool) -> i32 {
    let facts = pawn_facts(pos, white);
    let mut score = 0;

    for file in 0..8usize {
        if facts.by_file[file] > 1 {
            score += DOUBLED_PAWN_PENALTY * (facts.by_file[file] as i32 - 1);
        }
        if facts.by_file[file] > 0 {
            let left = if file == 0 { 0 } else { facts.by_file[file - 1] };
            let right = if file == 7 { 0 } else { facts.by_file[file + 1] };
            if left == 0 && right == 0 {
                score += ISOLATED_PAWN_PENALTY * facts.by_file[file] as i32;
            }
        }
    }

    for sq in 0..64 {
        let piece = pos.piece_at(sq);
        if piece_type(piece) != PAWN || is_white(piece) != white {
            continue;
        }
        if is_passed_pawn(pos, sq, white) {
            let rank = rank_of(sq);
            let progress = if white { rank } else { 7 - rank };
            score += PASSED_PAWN_BONUS[progress as usize];
        }
        if is_defended_by_pawn(pos, sq, white) {
            score += PAWN_CHAIN_BONUS;
        }
    }

    score
}

fn king_safety_score(pos: &Position, white: bool) -> i32 {
    let king_sq = pos.king_square(white);
    let king_file = file_of(king_sq);
    let mut score = 0;

    for file in (king_file - 1).max(0)..=(king_file + 1).min(7) {
        let own_pawn = pawn_on_file(pos, file, white);
        let enemy_pawn = pawn_on_file(pos, file, !white);
        if own_pawn {
            score += KING_SHIELD_BONUS;
        }
        if !own_pawn && !enemy_pawn {
            score += KING_OPEN_FILE_PENALTY;
        } else if !own_pawn && enemy_pawn {
            score += KING_SEMI_OPEN_FILE_PENALTY;
        }
    }

    score
}

fn piece_activity_score(pos: &Position, white: bool) -> i32 {
    let mut score = 0;
    let mut bishops = 0;
    let mut rook_squares = Vec::new();

    for sq in 0..64 {
        let piece = pos.piece_at(sq);
        if piece == EMPTY || is_white(piece) != white {
            continue;
        }
        match piece_type(piece) {
            BISHOP => bishops += 1,
            ROOK => {
                rook_squares.push(sq);
                let file = file_of(sq);
                let own_pawn = pawn_on_file(pos, file, white);
                let enemy_pawn = pawn_on_file(pos, file, !white);
                if !own_pawn && !enemy_pawn {
                    score += ROOK_OPEN_FILE_BONUS;
                } else if !own_pawn && enemy_pawn {
                    score += ROOK_SEMI_OPEN_FILE_BONUS;
                }
                let rank = rank_of(sq);
                let target_rank = if white { 6 } else { 1 };
                if rank == target_rank {
                    score += ROOK_SEVENTH_RANK_BONUS;
                }
            }
            _ => {}
        }
    }

    if bishops >= 2 {
        score += BISHOP_PAIR_BONUS;
    }

    for i in 0..rook_squares.len() {
        for j in (i + 1)..rook_squares.len() {
            let a = rook_squares[i];
            let b = rook_squares[j];
            if rank_of(a) != rank_of(b) {
                continue;
            }
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            let clear = ((lo + 1)..hi).all(|sq| pos.piece_at(sq) == EMPTY);
            if clear {
                score += CONNECTED_ROOKS_BONUS;
            }
        }
    }

    score
}

fn mobility_score(pos: &Position, white: bool) -> i32 {
    let mut score = 0;
    let color = if white { WHITE } else { crate::types::BLACK };
    for sq in 0..64 {
        let piece = pos.piece_at(sq);
        if piece == EMPTY || is_white(piece) != white {
            continue;
        }
        let kind = piece_type(piece);
        if matches!(kind, KNIGHT | BISHOP | ROOK | QUEEN) {
            let count = mobility_count(pos, sq, kind, color);
            score += count as i32 * MOBILITY_WEIGHTS[kind as usize];
        }
    }
    score
}

fn centre_control_score(pos: &Position, white: bool) -> i32 {
    let mut score = 0;
    let centre = [square_of(3, 3), square_of(4, 3), square_of(3, 4), square_of(4, 4)];
    let extended = [
        square_of(2, 2), square_of(3, 2), square_of(4, 2), square_of(5, 2),
        square_of(2, 5), square_of(3, 5), square_of(4, 5), square_of(5, 5),
    ];
    for &sq in &centre {
        let piece = pos.piece_at(sq);
        if piece_type(piece) == PAWN && is_white(piece) == white {
            score += CENTRE_SQUARE_BONUS;
        }
    }
    for &sq in &extended {
        let piece = pos.piece_at(sq);
        if piece_type(piece) == PAWN && is_white(piece) == white {
            score += EXTENDED_CENTRE_BONUS;
        }
    }
    score
}

fn non_king_material(pos: &Position, white: bool) -> i32 {
    let mut total = 0;
    for sq in 0..64 {
        let piece = pos.piece_at(sq);
        let kind = piece_type(piece);
        if piece != EMPTY && kind != KING && is_white(piece) == white {
            total += material_value(kind);
        }
    }
    total
}

/// Static evaluation of `pos`, centipawns, relative to the side to move.
#[must_use]
pub fn evaluate(pos: &Position) -> i32 {
    if pos.has_insufficient_material() {
        return 0;
    }
    if let Some(score) = endgame::known_endgame_override(pos) {
        return score;
    }
    if let Some(score) = endgame::krkp_override(pos) {
        return score;
    }

    let white_material = non_king_material(pos, true);
    let black_material = non_king_material(pos, false);
    let endgame = tables::is_endgame(white_material) && tables::is_endgame(black_material);

    let mut score = 0;
    for sq in 0..64 {
        let piece = pos.piece_at(sq);
        if piece == EMPTY {
            continue;
        }
        let kind = piece_type(piece);
        let white = is_white(piece);
        let term = if kind == KING {
            tables::pst_value(kind, sq, white, endgame)
        } else {
            material_value(kind) + tables::pst_value(kind, sq, white, endgame)
        };
        score += if white { term } else { -term };
    }

    score += pawn_structure_score(pos, true) - pawn_structure_score(pos, false);

    if !endgame {
        score += king_safety_score(pos, true) - king_safety_score(pos, false);
    }

    score += piece_activity_score(pos, true) - piece_activity_score(pos, false);

    if !endgame {
        score += mobility_score(pos, true) - mobility_score(pos, false);
    }

    score += centre_control_score(pos, true) - centre_control_score(pos, false);

    if pos.white_to_move {
        score
    } else {
        -score
    }
}

/// Cheap move-ordering heuristic (not a full search score): MVV-LVA for
/// captures, a promotion bonus, a castling bonus, and the moving piece's
/// PST delta.
#[must_use]
pub fn evaluate_move(pos: &Position, mv: &Move) -> i32 {
    let piece = pos.piece_at(mv.from);
    let kind = piece_type(piece);
    let white = is_white(piece);
    let mut score = 0;

    let victim_sq = if mv.is_en_passant {
        if white { mv.to - 8 } else { mv.to + 8 }
    } else {
        mv.to
    };
    let victim = pos.piece_at(victim_sq);
    if victim != EMPTY {
        score += 10 * material_value(piece_type(victim)) - material_value(kind);
    }

    if mv.promotion != 0 {
        score += material_value(mv.promotion);
    }

    if mv.is_castling {
        score += 60;
    }

    let white_material = non_king_material(pos, true);
    let black_material = non_king_material(pos, false);
    let endgame = tables::is_endgame(white_material) && tables::is_endgame(black_material);
    score += tables::pst_value(kind, mv.to, white, endgame)
        - tables::pst_value(kind, mv.from, white, endgame);

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, STARTING_FEN};

    #[test]
    fn startpos_is_symmetric() {
        assert_eq!(evaluate(&Position::try_from_fen(STARTING_FEN).unwrap()), 0);
    }

    #[test]
    fn material_advantage_is_positive_for_side_to_move() {
        let pos = Position::try_from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > 0);
    }

    #[test]
    fn evaluate_mirrors_under_colour_swap() {
        let white_up = Position::try_from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let black_up = Position::try_from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
        assert_eq!(evaluate(&white_up), -evaluate(&black_up));
    }

    #[test]
    fn capture_orders_above_quiet_move() {
        let pos = Position::try_from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let capture = Move::quiet(
            crate::types::parse_square("e4").unwrap(),
            crate::types::parse_square("d5").unwrap(),
        );
        let quiet = Move::quiet(
            crate::types::parse_square("e1").unwrap(),
            crate::types::parse_square("e2").unwrap(),
        );
        assert!(evaluate_move(&pos, &capture) > evaluate_move(&pos, &quiet));
    }
}
