//! Zobrist hashing: a fixed-seed table of random 64-bit keys and the
//! full/incremental hash built from it.
//!
//! The seed is fixed so hashes are reproducible across runs of the same
//! binary (useful for debugging and for the incremental-hash property
//! tests), matching the teacher's `ZobristKeys::new`.

use std::sync::LazyLock;

use rand::prelude::*;

use crate::board::Position;
use crate::types::Square;

/// `piece_keys[piece_byte][square]`. `piece_byte` is the full packed piece
/// value (color | type), so the array is sized to cover it; unused slots
/// (e.g. index 0 for `EMPTY`) are never read.
pub struct ZobristKeys {
    piece_keys: [[u64; 64]; 32],
    pub side_key: u64,
    /// One key per value of the 4-bit castling-rights mask.
    castling_keys: [u64; 16],
    /// One key per file, plus index 8 meaning "no en passant".
    ep_keys: [u64; 9],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(0x4368_6573_7345_6e67);
        let mut piece_keys = [[0u64; 64]; 32];
        for row in &mut piece_keys {
            for key in row.iter_mut() {
                *key = rng.gen();
            }
        }
        let side_key = rng.gen();
        let mut castling_keys = [0u64; 16];
        for key in &mut castling_keys {
            *key = rng.gen();
        }
        let mut ep_keys = [0u64; 9];
        for key in &mut ep_keys {
            *key = rng.gen();
        }
        ZobristKeys {
            piece_keys,
            side_key,
            castling_keys,
            ep_keys,
        }
    }

    #[inline]
    pub fn piece_key(&self, piece: u8, sq: Square) -> u64 {
        self.piece_keys[piece as usize][sq as usize]
    }

    #[inline]
    pub fn castling_key(&self, rights: u8) -> u64 {
        self.castling_keys[rights as usize]
    }

    #[inline]
    pub fn ep_key(&self, ep_square: Square) -> u64 {
        if ep_square < 0 {
            self.ep_keys[8]
        } else {
            self.ep_keys[(ep_square % 8) as usize]
        }
    }
}

pub static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

/// Full from-scratch hash of a position. `Position::make_move` keeps
/// `Position.hash` incrementally in sync with this; tests assert equality
/// between the two after every move.
#[must_use]
pub fn full_hash(pos: &Position) -> u64 {
    let keys = &ZOBRIST;
    let mut hash = 0u64;
    for sq in 0..64 {
        let piece = pos.squares[sq as usize];
        if piece != crate::types::EMPTY {
            hash ^= keys.piece_key(piece, sq);
        }
    }
    if !pos.white_to_move {
        hash ^= keys.side_key;
    }
    hash ^= keys.castling_key(pos.castling_rights);
    hash ^= keys.ep_key(pos.en_passant_square);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    #[test]
    fn full_hash_is_deterministic() {
        let a = Position::new();
        let b = Position::new();
        assert_eq!(full_hash(&a), full_hash(&b));
    }

    #[test]
    fn hash_changes_with_side_to_move() {
        let mut pos = Position::new();
        let h1 = full_hash(&pos);
        pos.white_to_move = false;
        let h2 = full_hash(&pos);
        assert_ne!(h1, h2);
    }
}
