//! UCI move text and `position` command handling.

use crate::board::Position;
use crate::error::{MoveError, UciError};
use crate::fen::STARTPOS_FEN;
use crate::movegen::legal_moves;
use crate::types::*;

pub fn move_to_uci(mv: Move) -> String {
    mv.to_string()
}

/// Parses long algebraic notation (`e2e4`, `e7e8q`) against the legal moves
/// of `pos`, so castling and en-passant flags come out right.
pub fn parse_uci_move(pos: &Position, txt: &str) -> Result<Move, MoveError> {
    let malformed = || MoveError::Malformed(txt.to_string());
    if !txt.is_ascii() || !(4..=5).contains(&txt.len()) {
        return Err(malformed());
    }
    let from = coord_to_sq(&txt[0..2]).ok_or_else(malformed)?;
    let to = coord_to_sq(&txt[2..4]).ok_or_else(malformed)?;
    let promo = match txt.as_bytes().get(4) {
        None => None,
        Some(&b) => match PieceKind::from_char(b as char) {
            Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
            _ => return Err(malformed()),
        },
    };

    legal_moves(pos)
        .into_iter()
        .find(|m| m.from() == from && m.to() == to && m.promo() == promo)
        .ok_or_else(|| MoveError::Illegal(txt.to_string()))
}

/// Builds the position described by the arguments of a UCI `position`
/// command: `startpos | fen <fields...>` followed by optional `moves ...`.
pub fn set_position_from_uci(args: &[&str]) -> Result<Position, UciError> {
    let (kind, rest) = args.split_first().ok_or(UciError::MissingPosition)?;
    let moves_at = rest.iter().position(|&t| t == "moves").unwrap_or(rest.len());

    let mut pos = match *kind {
        "startpos" => Position::from_fen(STARTPOS_FEN)?,
        "fen" => {
            if moves_at == 0 {
                return Err(UciError::MissingPosition);
            }
            Position::from_fen(&rest[..moves_at].join(" "))?
        }
        other => return Err(UciError::UnknownPositionKind(other.to_string())),
    };

    for txt in rest.iter().skip(moves_at + 1) {
        let mv = parse_uci_move(&pos, txt)?;
        pos.make_move(mv);
    }
    Ok(pos)
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
