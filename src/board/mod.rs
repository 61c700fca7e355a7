//! Position representation: the mailbox board, make/unmake, and the draw
//! predicates that sit directly on `Position`.

mod error;
mod fen;

pub use error::{FenError, MoveParseError};

use std::fmt;

use crate::movegen;
use crate::types::{
    color_of, make_piece, piece_color, piece_type, Move, Square, UndoRecord, BLACK_ROOK,
    CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, EMPTY, KING, KNIGHT, NO_SQUARE, PAWN, WHITE_ROOK,
};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A chess position: the mailbox board plus the game-state fields needed to
/// make/unmake moves and to detect draws. See spec.md §3.
#[derive(Clone, Debug)]
pub struct Position {
    pub(crate) squares: [u8; 64],
    pub white_to_move: bool,
    pub(crate) castling_rights: u8,
    pub(crate) en_passant_square: Square,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    /// Hash of every position reached since the game started (or since the
    /// last irreversible move, in practice — the tail is what repetition
    /// detection needs; we keep the whole history rather than truncate it,
    /// since the 50-move clock gives a natural bound on how far back a
    /// repetition probe ever needs to look).
    pub(crate) history: Vec<u64>,
    pub hash: u64,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::try_from_fen(STARTING_FEN).expect("starting FEN is well-formed")
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> u8 {
        self.squares[sq as usize]
    }

    #[must_use]
    pub fn castling_rights(&self) -> u8 {
        self.castling_rights
    }

    #[must_use]
    pub fn en_passant_square(&self) -> Square {
        self.en_passant_square
    }

    #[must_use]
    pub fn king_square(&self, white: bool) -> Square {
        let king = make_piece(color_of(white), KING);
        for sq in 0..64 {
            if self.squares[sq as usize] == king {
                return sq;
            }
        }
        NO_SQUARE
    }

    #[must_use]
    pub fn is_in_check(&self, white: bool) -> bool {
        let king_sq = self.king_square(white);
        king_sq != NO_SQUARE && movegen::is_square_attacked(self, king_sq, !white)
    }

    /// Mutate the position to reflect `mv` and return the record needed to
    /// reverse it. `mv` is assumed legal; the caller (the move generator)
    /// guarantees this, so `make_move` does not revalidate.
    pub fn make_move(&mut self, mv: Move) -> UndoRecord {
        let keys = &crate::zobrist::ZOBRIST;
        let from = mv.from;
        let to = mv.to;
        let piece = self.squares[from as usize];
        let mover_color = piece_color(piece);
        let white_moved = mover_color == crate::types::WHITE;

        let captured = if mv.is_en_passant {
            let victim_sq = if white_moved { to - 8 } else { to + 8 };
            self.squares[victim_sq as usize]
        } else {
            self.squares[to as usize]
        };

        let undo = UndoRecord {
            captured_piece: captured,
            castling_rights: self.castling_rights,
            en_passant_square: self.en_passant_square,
            halfmove_clock: self.halfmove_clock,
            moved_piece: piece,
        };

        self.hash ^= keys.piece_key(piece, from);

        let is_pawn_move = piece_type(piece) == PAWN;
        let is_capture = captured != EMPTY;
        if is_pawn_move || is_capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if mv.is_en_passant {
            let victim_sq = if white_moved { to - 8 } else { to + 8 };
            self.hash ^= keys.piece_key(captured, victim_sq);
            self.squares[victim_sq as usize] = EMPTY;
        } else if is_capture {
            self.hash ^= keys.piece_key(captured, to);
        }

        if mv.is_castling {
            let (rook_from, rook_to, rook_piece) = castling_rook_hop(to);
            self.hash ^= keys.piece_key(rook_piece, rook_from);
            self.hash ^= keys.piece_key(rook_piece, rook_to);
            self.squares[rook_from as usize] = EMPTY;
            self.squares[rook_to as usize] = rook_piece;
        }

        let placed_piece = if mv.promotion != 0 {
            make_piece(mover_color, mv.promotion)
        } else {
            piece
        };
        self.squares[from as usize] = EMPTY;
        self.squares[to as usize] = placed_piece;
        self.hash ^= keys.piece_key(placed_piece, to);

        let old_rights = self.castling_rights;
        if piece_type(piece) == KING {
            if white_moved {
                self.castling_rights &= !(CASTLE_WK | CASTLE_WQ);
            } else {
                self.castling_rights &= !(CASTLE_BK | CASTLE_BQ);
            }
        }
        if from == 0 || to == 0 {
            self.castling_rights &= !CASTLE_WQ;
        }
        if from == 7 || to == 7 {
            self.castling_rights &= !CASTLE_WK;
        }
        if from == 56 || to == 56 {
            self.castling_rights &= !CASTLE_BQ;
        }
        if from == 63 || to == 63 {
            self.castling_rights &= !CASTLE_BK;
        }
        if old_rights != self.castling_rights {
            self.hash ^= keys.castling_key(old_rights);
            self.hash ^= keys.castling_key(self.castling_rights);
        }

        let old_ep = self.en_passant_square;
        self.en_passant_square = NO_SQUARE;
        if piece_type(piece) == PAWN && (to - from).abs() == 16 {
            self.en_passant_square = (from + to) / 2;
        }
        if old_ep != self.en_passant_square {
            self.hash ^= keys.ep_key(old_ep);
            self.hash ^= keys.ep_key(self.en_passant_square);
        }

        if !self.white_to_move {
            self.fullmove_number += 1;
        }
        self.white_to_move = !self.white_to_move;
        self.hash ^= keys.side_key;

        self.history.push(self.hash);

        undo
    }

    /// Inverse of `make_move`. After `make_move; unmake_move`, every field
    /// of `Position` (including hash-history length) is bit-identical to
    /// before the call.
    pub fn unmake_move(&mut self, mv: Move, undo: UndoRecord) {
        self.white_to_move = !self.white_to_move;
        let from = mv.from;
        let to = mv.to;
        let white_moved = self.white_to_move;

        self.squares[from as usize] = undo.moved_piece;
        if mv.is_en_passant {
            self.squares[to as usize] = EMPTY;
            let victim_sq = if white_moved { to - 8 } else { to + 8 };
            self.squares[victim_sq as usize] = undo.captured_piece;
        } else {
            self.squares[to as usize] = undo.captured_piece;
        }

        if mv.is_castling {
            let (rook_from, rook_to, rook_piece) = castling_rook_hop(to);
            self.squares[rook_to as usize] = EMPTY;
            self.squares[rook_from as usize] = rook_piece;
        }

        self.castling_rights = undo.castling_rights;
        self.en_passant_square = undo.en_passant_square;
        self.halfmove_clock = undo.halfmove_clock;

        if !self.white_to_move {
            self.fullmove_number -= 1;
        }

        self.history.pop();
        self.hash = *self.history.last().expect("history non-empty after unmake");
    }

    /// `true` once the halfmove clock reaches 100 (50 full moves since the
    /// last pawn move or capture).
    #[must_use]
    pub fn is_fifty_moves(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// `true` once the current hash has occurred at least 3 times
    /// (inclusive of the current position) in the history.
    #[must_use]
    pub fn is_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// Cheaper "approaching repetition" test (2nd occurrence), exposed so
    /// search can apply a stiffer contempt penalty before the position is
    /// actually drawn.
    #[must_use]
    pub fn approaching_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }

    fn repetition_count(&self) -> u32 {
        let current = self.hash;
        self.history.iter().filter(|&&h| h == current).count() as u32
    }

    /// K-vs-K, K+minor-vs-K, or K+B-vs-K+B with same-colour bishops.
    #[must_use]
    pub fn has_insufficient_material(&self) -> bool {
        let mut pieces: Vec<(u8, u8, Square)> = Vec::new();
        for sq in 0..64 {
            let piece = self.squares[sq as usize];
            if piece != EMPTY {
                pieces.push((piece_type(piece), piece_color(piece), sq));
            }
        }

        if pieces.len() == 2 {
            return true;
        }

        if pieces.len() == 3 {
            return pieces
                .iter()
                .any(|&(kind, _, _)| kind == KNIGHT || kind == crate::types::BISHOP);
        }

        if pieces.len() == 4 {
            let bishops: Vec<(Square, u8)> = pieces
                .iter()
                .filter(|&&(kind, _, _)| kind == crate::types::BISHOP)
                .map(|&(_, color, sq)| (sq, color))
                .collect();
            if bishops.len() == 2 {
                let (sq1, c1) = bishops[0];
                let (sq2, c2) = bishops[1];
                let sq1_dark = (crate::types::file_of(sq1) + crate::types::rank_of(sq1)) % 2;
                let sq2_dark = (crate::types::file_of(sq2) + crate::types::rank_of(sq2)) % 2;
                if sq1_dark == sq2_dark && c1 != c2 {
                    return true;
                }
            }
        }

        false
    }

    /// Leaf-node count of the move tree at exactly `depth` plies.
    #[must_use]
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = movegen::generate_legal(self);
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in moves {
            let undo = self.make_move(mv);
            nodes += self.perft(depth - 1);
            self.unmake_move(mv, undo);
        }
        nodes
    }

    /// Perft split by root move, for the `perft` UCI command's divide output.
    #[must_use]
    pub fn perft_divide(&mut self, depth: u32) -> Vec<(Move, u64)> {
        let moves = movegen::generate_legal(self);
        let mut result = Vec::with_capacity(moves.len());
        for mv in moves {
            let undo = self.make_move(mv);
            let nodes = if depth == 0 { 1 } else { self.perft(depth - 1) };
            self.unmake_move(mv, undo);
            result.push((mv, nodes));
        }
        result
    }

    /// Parse a UCI move string (`e2e4`, `e7e8q`) against this position,
    /// filling in the castling/en-passant flags and validating legality by
    /// matching against `generate_legal`.
    pub fn parse_move(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        if uci.len() < 4 || uci.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: uci.len() });
        }
        let from = crate::types::parse_square(&uci[0..2]).map_err(|_| MoveParseError::InvalidSquare {
            notation: uci.to_string(),
        })?;
        let to = crate::types::parse_square(&uci[2..4]).map_err(|_| MoveParseError::InvalidSquare {
            notation: uci.to_string(),
        })?;
        let promotion = if uci.len() == 5 {
            match uci.as_bytes()[4] as char {
                'q' => crate::types::QUEEN,
                'r' => crate::types::ROOK,
                'b' => crate::types::BISHOP,
                'n' => crate::types::KNIGHT,
                c => return Err(MoveParseError::InvalidPromotion { char: c }),
            }
        } else {
            0
        };

        let legal = movegen::generate_legal(self);
        legal
            .into_iter()
            .find(|m| m.from == from && m.to == to && m.promotion == promotion)
            .ok_or(MoveParseError::IllegalMove {
                notation: uci.to_string(),
            })
    }
}

/// The rook hop `(from, to, piece)` for a castling move landing on `to`.
pub(crate) fn castling_rook_hop(to: Square) -> (Square, Square, u8) {
    match to {
        6 => (7, 5, WHITE_ROOK),
        2 => (0, 3, WHITE_ROOK),
        62 => (63, 61, BLACK_ROOK),
        58 => (56, 59, BLACK_ROOK),
        _ => unreachable!("castling move must land on g1/c1/g8/c8"),
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  +---+---+---+---+---+---+---+---+")?;
        for rank in (0..8).rev() {
            write!(f, "{} |", rank + 1)?;
            for file in 0..8 {
                let piece = self.squares[crate::types::square_of(file, rank) as usize];
                if piece == EMPTY {
                    write!(f, "   |")?;
                } else {
                    write!(f, " {} |", fen::piece_to_fen_char(piece))?;
                }
            }
            writeln!(f)?;
            writeln!(f, "  +---+---+---+---+---+---+---+---+")?;
        }
        writeln!(f, "    a   b   c   d   e   f   g   h")?;
        writeln!(f, "Fen: {}", self.to_fen())?;
        write!(f, "Hash: {:016x}", self.hash)
    }
}
