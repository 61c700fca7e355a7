//! FEN parsing and emission.

use super::{FenError, Position, STARTING_FEN};
use crate::types::{
    make_piece, square_of, BISHOP, BLACK, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, EMPTY,
    KING, KNIGHT, NO_SQUARE, PAWN, QUEEN, ROOK, WHITE,
};
use crate::zobrist::full_hash;

#[must_use]
pub(crate) fn piece_to_fen_char(piece: u8) -> char {
    let c = match crate::types::piece_type(piece) {
        PAWN => 'p',
        KNIGHT => 'n',
        BISHOP => 'b',
        ROOK => 'r',
        QUEEN => 'q',
        KING => 'k',
        _ => '?',
    };
    if crate::types::is_white(piece) {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

fn fen_char_to_piece(c: char) -> Option<u8> {
    let color = if c.is_uppercase() { WHITE } else { BLACK };
    let kind = match c.to_ascii_lowercase() {
        'p' => PAWN,
        'n' => KNIGHT,
        'b' => BISHOP,
        'r' => ROOK,
        'q' => QUEEN,
        'k' => KING,
        _ => return None,
    };
    Some(make_piece(color, kind))
}

impl Position {
    /// Parse a FEN string. Missing trailing fields (halfmove clock,
    /// fullmove number) default to `0` and `1` respectively, per spec.md
    /// §6. At least the first 4 fields (placement, side, castling, en
    /// passant) must be present.
    pub fn try_from_fen(fen: &str) -> Result<Position, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        let mut squares = [EMPTY; 64];
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRank { rank: ranks.len() });
        }
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top as i32;
            let mut file = 0i32;
            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file += digit as i32;
                } else {
                    let piece = fen_char_to_piece(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if !(0..8).contains(&file) {
                        return Err(FenError::TooManyFiles {
                            rank: rank_from_top,
                            files: file as usize + 1,
                        });
                    }
                    squares[square_of(file, rank) as usize] = piece;
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_from_top,
                    files: file as usize,
                });
            }
        }

        let white_to_move = match parts[1] {
            "w" => true,
            "b" => false,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        let mut castling_rights = 0u8;
        if parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => castling_rights |= CASTLE_WK,
                    'Q' => castling_rights |= CASTLE_WQ,
                    'k' => castling_rights |= CASTLE_BK,
                    'q' => castling_rights |= CASTLE_BQ,
                    _ => return Err(FenError::InvalidPiece { char: c }),
                }
            }
        }

        let en_passant_square = if parts[3] == "-" {
            NO_SQUARE
        } else {
            crate::types::parse_square(parts[3]).map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?
        };

        let halfmove_clock = parts.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        let fullmove_number = parts.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);

        let mut pos = Position {
            squares,
            white_to_move,
            castling_rights,
            en_passant_square,
            halfmove_clock,
            fullmove_number,
            history: Vec::new(),
            hash: 0,
        };
        pos.hash = full_hash(&pos);
        pos.history.push(pos.hash);
        Ok(pos)
    }

    /// Emit the six-field FEN for this position. Round-trips any position
    /// the engine itself produced.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty_run = 0;
            for file in 0..8 {
                let piece = self.squares[square_of(file, rank) as usize];
                if piece == EMPTY {
                    empty_run += 1;
                } else {
                    if empty_run > 0 {
                        row.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    row.push(piece_to_fen_char(piece));
                }
            }
            if empty_run > 0 {
                row.push_str(&empty_run.to_string());
            }
            rows.push(row);
        }

        let mut castling = String::new();
        if self.castling_rights & CASTLE_WK != 0 {
            castling.push('K');
        }
        if self.castling_rights & CASTLE_WQ != 0 {
            castling.push('Q');
        }
        if self.castling_rights & CASTLE_BK != 0 {
            castling.push('k');
        }
        if self.castling_rights & CASTLE_BQ != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = if self.en_passant_square == NO_SQUARE {
            "-".to_string()
        } else {
            crate::types::square_name(self.en_passant_square)
        };

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            if self.white_to_move { "w" } else { "b" },
            castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

/// `true` for the canonical starting FEN, used by tests and by `ucinewgame`.
#[must_use]
pub fn is_starting_fen(fen: &str) -> bool {
    fen == STARTING_FEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_fen_round_trips() {
        let pos = Position::try_from_fen(STARTING_FEN).unwrap();
        assert_eq!(pos.to_fen(), STARTING_FEN);
    }

    #[test]
    fn kiwipete_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let pos = Position::try_from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn missing_trailing_fields_default() {
        let pos = Position::try_from_fen("8/8/8/8/8/8/8/K6k w - -").unwrap();
        assert_eq!(pos.halfmove_clock, 0);
        assert_eq!(pos.fullmove_number, 1);
    }

    #[test]
    fn malformed_fen_is_rejected() {
        assert!(Position::try_from_fen("not a fen").is_err());
    }
}
