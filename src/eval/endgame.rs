//! Known K+X vs K endgame overrides (spec.md §4.6 step 2).
//!
//! Each pattern, when it matches the material on the board, returns a
//! score directly instead of falling through to the general material/PST
//! evaluation: base material plus shaping terms that push the winning
//! side's king forward and the losing side's king to the edge (or, for
//! bishop+knight, to the bishop's own corner).

use crate::board::Position;
use crate::types::{
    file_of, piece_color, piece_type, rank_of, square_of, Square, BISHOP, KING, KNIGHT, PAWN,
    QUEEN, ROOK, WHITE,
};

use super::tables::material_value;

struct Pieces {
    white: Vec<(u8, Square)>,
    black: Vec<(u8, Square)>,
}

fn collect(pos: &Position) -> Pieces {
    let mut white = Vec::new();
    let mut black = Vec::new();
    for sq in 0..64 {
        let piece = pos.piece_at(sq);
        if piece == 0 {
            continue;
        }
        let kind = piece_type(piece);
        if kind == KING {
            continue;
        }
        if piece_color(piece) == WHITE {
            white.push((kind, sq));
        } else {
            black.push((kind, sq));
        }
    }
    Pieces { white, black }
}

#[inline]
fn center_distance(sq: Square) -> i32 {
    let file = file_of(sq);
    let rank = rank_of(sq);
    let file_dist = if file <= 3 { 3 - file } else { file - 4 };
    let rank_dist = if rank <= 3 { 3 - rank } else { rank - 4 };
    file_dist + rank_dist
}

#[inline]
fn chebyshev_distance(a: Square, b: Square) -> i32 {
    (file_of(a) - file_of(b)).abs().max((rank_of(a) - rank_of(b)).abs())
}

#[inline]
fn is_dark_square(sq: Square) -> bool {
    (file_of(sq) + rank_of(sq)) % 2 == 0
}

/// Distance from `sq` to the nearest corner whose square colour matches
/// `dark_corner` (true = a1/h8-colour corner, i.e. dark).
fn matching_corner_distance(sq: Square, dark_corner: bool) -> i32 {
    let corners = [square_of(0, 0), square_of(7, 0), square_of(0, 7), square_of(7, 7)];
    corners
        .iter()
        .filter(|&&c| is_dark_square(c) == dark_corner)
        .map(|&c| chebyshev_distance(sq, c))
        .min()
        .unwrap_or(0)
}

/// Push-to-edge-and-mate shaping for a generic mating side (KQK/KRK):
/// reward the weak king being far from the centre and the two kings being
/// close together.
fn push_to_edge(strong_king: Square, weak_king: Square) -> i32 {
    let weak_center_dist = center_distance(weak_king);
    let king_dist = chebyshev_distance(strong_king, weak_king);
    weak_center_dist * 10 + (7 - king_dist) * 4
}

/// If the position matches a known K+X vs K pattern, the short-circuit
/// score (side-to-move relative, matching the sign convention used by the
/// caller). Otherwise `None`.
#[must_use]
pub fn known_endgame_override(pos: &Position) -> Option<i32> {
    let pieces = collect(pos);

    let (strong_white, strong_pieces, weak_pieces) = if pieces.black.is_empty() && !pieces.white.is_empty() {
        (true, &pieces.white, &pieces.black)
    } else if pieces.white.is_empty() && !pieces.black.is_empty() {
        (false, &pieces.black, &pieces.white)
    } else {
        return None;
    };
    if !weak_pieces.is_empty() {
        return None;
    }

    let strong_king = pos.king_square(strong_white);
    let weak_king = pos.king_square(!strong_white);

    let score = match strong_pieces.as_slice() {
        [(QUEEN, _)] => {
            material_value(QUEEN) + push_to_edge(strong_king, weak_king)
        }
        [(ROOK, _)] => material_value(ROOK) + push_to_edge(strong_king, weak_king),
        [(BISHOP, bishop_sq), (KNIGHT, _)] | [(KNIGHT, _), (BISHOP, bishop_sq)] => {
            let dark_corner = is_dark_square(*bishop_sq);
            let weak_corner_dist = matching_corner_distance(weak_king, dark_corner);
            let king_dist = chebyshev_distance(strong_king, weak_king);
            material_value(BISHOP) + material_value(KNIGHT) + (7 - weak_corner_dist) * 10
                + (7 - king_dist) * 4
        }
        [(PAWN, pawn_sq)] => return Some(kpk_score(strong_white, *pawn_sq, strong_king, weak_king)),
        _ => return None,
    };

    Some(if strong_white == pos.white_to_move { score } else { -score })
}

fn kpk_score(pawn_white: bool, pawn_sq: Square, strong_king: Square, weak_king: Square) -> i32 {
    let promotion_rank = if pawn_white { 7 } else { 0 };
    let promotion_sq = square_of(file_of(pawn_sq), promotion_rank);
    let plies_to_promote = (promotion_rank - rank_of(pawn_sq)).abs();

    let defender_distance = chebyshev_distance(weak_king, promotion_sq);
    let in_square = defender_distance > plies_to_promote;

    let file = file_of(pawn_sq);
    let is_rook_pawn = file == 0 || file == 7;

    let advancement = if pawn_white { rank_of(pawn_sq) } else { 7 - rank_of(pawn_sq) };
    let mut score = material_value(PAWN) + advancement * 20;
    if !in_square {
        score += 400; // unstoppable passer
    } else if is_rook_pawn {
        score -= 60; // rook pawns draw more often even outside the naive square
    }
    score += (7 - chebyshev_distance(strong_king, pawn_sq)) * 3;

    if pawn_white { score } else { -score }
}

/// Special-case K+R+K+P: rook's side is winning or drawing depending on how
/// active the defending king and rook are relative to the pawn. Folds the
/// rook-behind-passed-pawn heuristic used elsewhere in the evaluator.
#[must_use]
pub fn krkp_override(pos: &Position) -> Option<i32> {
    let pieces = collect(pos);
    let (rook_white, rook_sq, pawn_sq) = if pieces.white.len() == 1
        && pieces.white[0].0 == ROOK
        && pieces.black.len() == 1
        && pieces.black[0].0 == PAWN
    {
        (true, pieces.white[0].1, pieces.black[0].1)
    } else if pieces.black.len() == 1
        && pieces.black[0].0 == ROOK
        && pieces.white.len() == 1
        && pieces.white[0].0 == PAWN
    {
        (false, pieces.black[0].1, pieces.white[0].1)
    } else {
        return None;
    };

    let rook_king = pos.king_square(rook_white);
    let pawn_king = pos.king_square(!rook_white);

    let mut score = material_value(ROOK) - material_value(PAWN);
    let pawn_file = file_of(pawn_sq);
    let rook_behind_pawn = file_of(rook_sq) == pawn_file
        && if rook_white {
            rank_of(rook_sq) < rank_of(pawn_sq)
        } else {
            rank_of(rook_sq) > rank_of(pawn_sq)
        };
    if rook_behind_pawn {
        score += 30;
    }
    score += (7 - chebyshev_distance(rook_king, pawn_sq)) * 2;
    score -= (7 - chebyshev_distance(pawn_king, pawn_sq)) * 2;

    Some(if rook_white == pos.white_to_move { score } else { -score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    #[test]
    fn kqk_overrides_to_a_large_positive_score() {
        let pos = Position::try_from_fen("8/8/4k3/8/8/4K3/8/3Q4 w - - 0 1").unwrap();
        let score = known_endgame_override(&pos).unwrap();
        assert!(score > material_value(QUEEN));
    }

    #[test]
    fn kbnk_drives_weak_king_toward_matching_corner() {
        let pos = Position::try_from_fen("8/8/8/4k3/8/2B5/2N5/2K5 w - - 0 1").unwrap();
        assert!(known_endgame_override(&pos).is_some());
    }

    #[test]
    fn kpk_unstoppable_passer_scores_strongly() {
        let pos = Position::try_from_fen("8/8/8/8/8/k7/P7/K7 w - - 0 1").unwrap();
        let score = known_endgame_override(&pos).unwrap();
        assert!(score > material_value(PAWN));
    }
}
