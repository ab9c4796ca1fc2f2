//! Tests for draw detection in chess
//!
//! This module tests all draw conditions:
//! - Stalemate
//! - Fifty-move rule
//! - Repetition
//! - Insufficient material

use chess_core::{Color, PieceKind, Position, legal_moves, parse_uci_move};

fn fen(s: &str) -> Position {
    Position::from_fen(s).expect("test FEN must parse")
}

fn play(pos: &mut Position, moves: &[&str]) {
    for text in moves {
        let mv = parse_uci_move(pos, text).expect("test move must be legal");
        pos.make_move(mv);
    }
}

// =============================================================================
// Stalemate Tests
// =============================================================================

#[test]
fn test_stalemate_king_in_corner() {
    // Black king on a8, white queen on b6, white king on c7
    let pos = fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");

    assert!(legal_moves(&pos).is_empty(), "Stalemate position should have no legal moves");
    assert!(!pos.in_check(), "Stalemate means king is not in check");
}

#[test]
fn test_stalemate_king_and_pawn_endgame() {
    let pos = fen("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1");

    assert!(legal_moves(&pos).is_empty(), "Stalemate position should have no legal moves");
    assert!(!pos.in_check(), "Stalemate means king is not in check");
}

#[test]
fn test_checkmate_is_not_stalemate() {
    // Scholar's mate
    let pos = fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4");

    assert!(legal_moves(&pos).is_empty(), "Checkmate position should have no legal moves");
    assert!(pos.in_check(), "Checkmate means king IS in check");
}

#[test]
fn test_check_is_not_checkmate() {
    let pos = fen("rnbqkbnr/ppppp1pp/8/5p1Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2");

    assert!(!legal_moves(&pos).is_empty(), "Check position should have legal moves");
    assert!(pos.in_check(), "Black king should be in check");
}

// =============================================================================
// Fifty-Move Rule Tests
// =============================================================================

#[test]
fn test_fifty_move_rule_threshold() {
    assert!(fen("8/8/8/4k3/8/4K3/8/8 w - - 100 60").is_fifty_move_draw());
    assert!(!fen("8/8/8/4k3/8/4K3/8/8 w - - 99 60").is_fifty_move_draw());
}

#[test]
fn test_fifty_move_rule_reset_on_pawn_move() {
    let mut pos = fen("8/8/8/4k3/8/3K4/4P3/8 w - - 99 60");

    let pawn_move = legal_moves(&pos)
        .into_iter()
        .find(|m| pos.piece_at(m.from()).is_some_and(|p| p.kind == PieceKind::Pawn))
        .expect("Should have a pawn move available");
    pos.make_move(pawn_move);

    assert!(!pos.is_fifty_move_draw(), "Pawn move should reset halfmove clock");
    assert_eq!(pos.halfmove_clock(), 0);
}

#[test]
fn test_fifty_move_rule_reset_on_capture() {
    let mut pos = fen("8/8/8/4k3/8/3K4/4r3/8 w - - 99 60");
    play(&mut pos, &["d3e2"]);
    assert_eq!(pos.halfmove_clock(), 0);
    assert!(pos.is_insufficient_material());
}

// =============================================================================
// Insufficient Material Tests
// =============================================================================

#[test]
fn test_insufficient_material() {
    for (desc, f) in [
        ("K vs K", "8/8/8/4k3/8/4K3/8/8 w - - 0 1"),
        ("KB vs K", "8/8/8/4k3/8/4KB2/8/8 w - - 0 1"),
        ("KN vs K", "8/8/8/4k3/8/4K3/8/N7 w - - 0 1"),
        ("K vs KB", "8/8/4b3/4k3/8/4K3/8/8 w - - 0 1"),
        ("K vs KN", "8/8/4n3/4k3/8/4K3/8/8 w - - 0 1"),
        // c1 and f8 are both dark squares
        ("KB vs KB same color", "5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1"),
    ] {
        assert!(fen(f).is_insufficient_material(), "{desc} is insufficient material");
    }
}

#[test]
fn test_sufficient_material() {
    for (desc, f) in [
        // c1 dark, c8 light
        ("KB vs KB opposite colors", "2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1"),
        ("KP vs K", "8/8/8/4k3/8/4K3/4P3/8 w - - 0 1"),
        ("KR vs K", "8/8/8/4k3/8/4K3/8/4R3 w - - 0 1"),
        ("KQ vs K", "8/8/8/4k3/8/4K3/8/4Q3 w - - 0 1"),
        ("KNN vs K", "8/8/8/4k3/8/4K3/3NN3/8 w - - 0 1"),
    ] {
        assert!(!fen(f).is_insufficient_material(), "{desc} is sufficient material");
    }
}

// =============================================================================
// Fingerprint and repetition tests
// =============================================================================

#[test]
fn test_hash_distinguishes_side_and_castling() {
    let base = fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    let black = fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1");
    let fewer_rights = fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kq - 0 1");

    assert_eq!(base.hash(), Position::startpos().hash());
    assert_ne!(base.hash(), black.hash());
    assert_ne!(base.hash(), fewer_rights.hash());
}

#[test]
fn test_hash_ignores_move_counters() {
    let a = fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let b = fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 6 5");
    assert_eq!(a.hash(), b.hash());
}

#[test]
fn test_repetition_after_knight_shuffle() {
    let mut pos = fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    play(&mut pos, &["f3g1", "c6b8", "g1f3"]);
    assert!(!pos.is_repetition());
    play(&mut pos, &["b8c6"]);
    assert!(pos.is_repetition(), "Position repeated with the same side to move");
    assert!(pos.is_draw());
}

#[test]
fn test_repetition_ignores_uncapturable_ep_square() {
    let mut pos = Position::startpos();
    play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert!(pos.is_repetition());

    // The first occurrence still carried an en-passant square nobody could use.
    play(&mut pos, &["e2e4", "g8f6", "g1f3", "f6g8", "f3g1"]);
    assert_eq!(pos.side_to_move(), Color::Black);
    assert_eq!(pos.ep_square(), None);
    assert!(pos.is_repetition());
}
