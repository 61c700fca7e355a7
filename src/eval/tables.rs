//! Material values and piece-square tables (spec.md §4.6 step 3).
//!
//! Every non-king piece gets a single 64-entry table; the king gets a
//! middlegame and an endgame table, selected by the material threshold in
//! [`is_endgame`]. Tables are laid out rank-major from a1 (index 0) as
//! white sees the board; black lookups mirror the rank.

use crate::types::{rank_of, Square, BISHOP, KING, KNIGHT, PAWN, QUEEN, ROOK};

pub const MATERIAL: [i32; 7] = [0, 100, 320, 330, 500, 900, 20000];

/// Total non-king, non-pawn material (centipawns) below which a side is
/// considered to be in the endgame for PST selection and for skipping the
/// king-safety/mobility terms.
pub const ENDGAME_MATERIAL_THRESHOLD: i32 = 1300;

#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     -9,  -1, -20, -23, -15,  24,  38, -22,
    -26,  -4,  -4, -10,   3,   3,  33, -12,
    -27,  -2,  -5,  12,  17,   6,  10, -25,
    -14,  13,   6,  21,  23,  12,  17, -23,
     -6,   7,  26,  31,  65,  56,  25, -20,
     98, 134,  61,  95,  68, 126,  34, -11,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
   -105, -21, -58, -33, -17, -28, -19, -23,
    -29, -53, -12,  -3,  -1,  18, -14, -19,
    -23,  -9,  12,  10,  19,  17,  25, -16,
    -13,   4,  16,  13,  28,  19,  21,  -8,
     -9,  17,  19,  53,  37,  69,  18,  22,
    -47,  60,  37,  65,  84, 129,  73,  44,
    -73, -41,  72,  36,  23,  62,   7, -17,
   -167, -89, -34, -49,  61, -97, -15,-107,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -33,  -3, -14, -21, -13, -12, -39, -21,
      4,  15,  16,   0,   7,  21,  33,   1,
      0,  15,  15,  15,  14,  27,  18,  10,
     -6,  13,  13,  26,  34,  12,  10,   4,
     -4,   5,  19,  50,  37,  37,   7,  -2,
    -16,  37,  43,  40,  35,  50,  37,  -2,
    -26,  16, -18, -13,  30,  59,  18, -47,
    -29,   4, -82, -37, -25, -42,   7,  -8,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
    -19, -13,   1,  17,  16,   7, -37, -26,
    -44, -16, -20,  -9,  -1,  11,  -6, -71,
    -45, -25, -16, -17,   3,   0,  -5, -33,
    -36, -26, -12,  -1,   9,  -7,   6, -23,
    -24, -11,   7,  26,  24,  35,  -8, -20,
     -5,  19,  26,  36,  17,  45,  61,  16,
     27,  32,  58,  62,  80,  67,  26,  44,
     32,  42,  32,  51,  63,   9,  31,  43,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
     -1, -18,  -9,  10, -15, -25, -31, -50,
    -35,  -8,  11,   2,   8,  15,  -3,   1,
    -14,   2, -11,  -2,  -5,   2,  14,   5,
     -9, -26,  -9, -10,  -2,  -4,   3,  -3,
    -27, -27, -16, -16,  -1,  17,  -2,   1,
    -13, -17,   7,   8,  29,  56,  47,  57,
    -24, -39,  -5,   1, -16,  57,  28,  54,
    -28,   0,  29,  12,  59,  44,  43,  45,
];

#[rustfmt::skip]
const KING_PST_MG: [i32; 64] = [
    -15,  36,  12, -54,   8, -28,  34,  14,
      1,   7,  -8, -64, -43, -16,   9,   8,
    -14, -14, -22, -46, -44, -30, -15, -27,
    -49,  -1, -27, -39, -46, -44, -33, -51,
    -17, -20, -12, -27, -30, -25, -14, -36,
     -9,  24,   2, -16, -20,   6,  22, -22,
     29,  -1, -20,  -7,  -8,  -4, -38, -29,
    -65,  23,  16, -15, -56, -34,   2,  13,
];

#[rustfmt::skip]
const KING_PST_EG: [i32; 64] = [
    -53, -34, -21, -11, -28, -14, -24, -43,
    -27, -11,   4,  13,  14,   4,  -5, -17,
    -19,  -3,  11,  21,  23,  16,   7,  -9,
    -18,  -4,  21,  24,  27,  23,   9, -11,
     -8,  22,  24,  27,  26,  33,  26,   3,
     10,  17,  23,  15,  20,  45,  44,  13,
    -12,  17,  14,  17,  17,  38,  23,  11,
    -74, -35, -18, -18, -11,  15,   4, -17,
];

/// Mirror a white-relative table index for a black piece on `sq`.
#[inline]
fn pst_index(sq: Square, white: bool) -> usize {
    if white {
        sq as usize
    } else {
        let file = sq % 8;
        let mirrored_rank = 7 - rank_of(sq);
        (mirrored_rank * 8 + file) as usize
    }
}

/// Piece-square value for `kind` at `sq`, `endgame` selecting the king's
/// endgame table.
#[must_use]
pub fn pst_value(kind: u8, sq: Square, white: bool, endgame: bool) -> i32 {
    let idx = pst_index(sq, white);
    match kind {
        PAWN => PAWN_PST[idx],
        KNIGHT => KNIGHT_PST[idx],
        BISHOP => BISHOP_PST[idx],
        ROOK => ROOK_PST[idx],
        QUEEN => QUEEN_PST[idx],
        KING => {
            if endgame {
                KING_PST_EG[idx]
            } else {
                KING_PST_MG[idx]
            }
        }
        _ => 0,
    }
}

#[must_use]
pub fn material_value(kind: u8) -> i32 {
    MATERIAL[kind as usize]
}

#[must_use]
pub fn is_endgame(non_king_material: i32) -> bool {
    non_king_material <= ENDGAME_MATERIAL_THRESHOLD
}
