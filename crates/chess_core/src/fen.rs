//! Forsyth-Edwards Notation parsing and formatting.

use crate::board::*;
use crate::error::FenError;
use crate::types::*;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Parses a FEN string. The half-move and full-move fields are optional
    /// and default to `0` and `1`.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&parts.len()) {
            return Err(FenError::FieldCount(parts.len()));
        }

        let mut pos = Position::empty();

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN lists rank 8 .. 1
            let mut file: u32 = 0;
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    if d == 0 || d > 8 {
                        return Err(FenError::PieceChar(ch));
                    }
                    file += d;
                } else {
                    let piece = Piece::from_fen_char(ch).ok_or(FenError::PieceChar(ch))?;
                    if file >= 8 {
                        return Err(FenError::RankLength {
                            rank: rank + 1,
                            files: file + 1,
                        });
                    }
                    let sq = rank * 8 + file as u8;
                    if piece.kind == PieceKind::Pawn && (rank == 0 || rank == 7) {
                        return Err(FenError::PawnOnBackRank(sq_to_coord(sq)));
                    }
                    pos.put_piece(piece, sq);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::RankLength {
                    rank: rank + 1,
                    files: file,
                });
            }
        }

        for (color, name) in [(Color::White, "white"), (Color::Black, "black")] {
            let count = pos.pieces(color, PieceKind::King).popcount();
            if count != 1 {
                return Err(FenError::KingCount { color: name, count });
            }
        }

        let side = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };
        pos.set_side_to_move(side);

        let castling = parse_castling(&pos, parts[2])?;
        let ep = parse_ep(&pos, side, parts[3])?;

        let halfmove = parse_counter(parts.get(4).copied().unwrap_or("0"), MAX_HALFMOVE)?;
        let fullmove = parse_counter(parts.get(5).copied().unwrap_or("1"), MAX_FULLMOVE)?.max(1);
        let ply = 2 * (fullmove - 1) + u32::from(side == Color::Black);

        pos.set_setup_state(castling, ep, halfmove, ply);
        pos.refresh_derived_state();

        if let Some(their_king) = pos.king_sq(side.other())
            && pos.is_square_attacked(their_king, side)
        {
            return Err(FenError::OpponentInCheck);
        }

        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(rank * 8 + file) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        let rights = self.castling_rights();
        if rights == 0 {
            fen.push('-');
        } else {
            for (bit, ch) in CASTLING_CHARS {
                if rights & bit != 0 {
                    fen.push(ch);
                }
            }
        }

        fen.push(' ');
        match self.ep_square() {
            Some(ep) => fen.push_str(&sq_to_coord(ep)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(
            " {} {}",
            self.halfmove_clock(),
            self.fullmove_number()
        ));
        fen
    }
}

const CASTLING_CHARS: [(u8, char); 4] = [
    (CASTLE_WHITE_OO, 'K'),
    (CASTLE_WHITE_OOO, 'Q'),
    (CASTLE_BLACK_OO, 'k'),
    (CASTLE_BLACK_OOO, 'q'),
];

fn parse_castling(pos: &Position, field: &str) -> Result<u8, FenError> {
    if field == "-" {
        return Ok(0);
    }
    let mut rights = 0;
    for ch in field.chars() {
        let (bit, color, king_sq, rook_sq) = match ch {
            'K' => (CASTLE_WHITE_OO, Color::White, 4, 7),
            'Q' => (CASTLE_WHITE_OOO, Color::White, 4, 0),
            'k' => (CASTLE_BLACK_OO, Color::Black, 60, 63),
            'q' => (CASTLE_BLACK_OOO, Color::Black, 60, 56),
            _ => return Err(FenError::CastlingChar(ch)),
        };
        let king = Piece::new(color, PieceKind::King);
        let rook = Piece::new(color, PieceKind::Rook);
        if pos.piece_at(king_sq) != Some(king) || pos.piece_at(rook_sq) != Some(rook) {
            return Err(FenError::CastlingRights(ch));
        }
        rights |= bit;
    }
    Ok(rights)
}

/// The en-passant square must sit behind an enemy pawn that could have just
/// made a double push.
fn parse_ep(pos: &Position, side: Color, field: &str) -> Result<Option<u8>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let bad = || FenError::EnPassant(field.to_string());
    let ep = coord_to_sq(field).ok_or_else(bad)?;
    let expected_rank = match side {
        Color::White => 5,
        Color::Black => 2,
    };
    if rank_of(ep) != expected_rank {
        return Err(bad());
    }
    let pawn_sq = match side {
        Color::White => ep - 8,
        Color::Black => ep + 8,
    };
    if pos.piece_at(ep).is_some()
        || pos.piece_at(pawn_sq) != Some(Piece::new(side.other(), PieceKind::Pawn))
    {
        return Err(bad());
    }
    Ok(Some(ep))
}

/// Largest accepted half-move clock; far past any claimable draw.
const MAX_HALFMOVE: u32 = 10_000;
/// Largest accepted move number, keeping the game ply well inside `u32`.
const MAX_FULLMOVE: u32 = 1_000_000;

fn parse_counter(field: &str, max: u32) -> Result<u32, FenError> {
    field
        .parse()
        .ok()
        .filter(|&n| n <= max)
        .ok_or_else(|| FenError::Counter(field.to_string()))
}

#[cfg(test)]
#[path = "fen_tests.rs"]
mod fen_tests;
