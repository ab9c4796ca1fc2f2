use super::*;
use crate::movegen::legal_moves;
use crate::uci::parse_uci_move;

fn play(pos: &mut Position, moves: &[&str]) {
    for text in moves {
        let mv = parse_uci_move(pos, text).unwrap();
        pos.make_move(mv);
    }
}

#[test]
fn test_startpos_basics() {
    let pos = Position::startpos();
    assert_eq!(pos.occupied().popcount(), 32);
    assert_eq!(pos.king_sq(Color::White), Some(4));
    assert_eq!(pos.king_sq(Color::Black), Some(60));
    assert!(!pos.in_check());
    assert_eq!(pos.hash(), pos.compute_hash());
    assert!(pos.has_non_pawn_material(Color::Black));
}

#[test]
fn test_make_unmake_restores_everything() {
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbqkbnr/pp1ppppp/8/2pP4/8/8/PPP1PPPP/RNBQKBNR w KQkq c6 0 3",
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
    ];
    for fen in fens {
        let mut pos = Position::from_fen(fen).unwrap();
        let before = pos.clone();
        for mv in legal_moves(&pos) {
            pos.make_move(mv);
            assert_eq!(pos.hash(), pos.compute_hash(), "{fen} after {mv}");
            pos.unmake_move(mv);
            assert_eq!(pos, before, "{fen} after {mv}");
        }
    }
}

#[test]
fn test_castling_moves_rook_and_clears_rights() {
    let mut pos =
        Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut pos, &["e1g1"]);
    assert_eq!(pos.piece_at(5), Some(Piece::new(Color::White, PieceKind::Rook)));
    assert_eq!(pos.piece_at(7), None);
    assert_eq!(pos.castling_rights(), CASTLE_BLACK_OO | CASTLE_BLACK_OOO);

    // Moving the a8 rook drops black's queenside right.
    play(&mut pos, &["a8a1"]);
    assert_eq!(pos.castling_rights(), CASTLE_BLACK_OO);
}

#[test]
fn test_ep_key_only_when_capturable() {
    // No black pawn can take on e3, so the fingerprint ignores the ep square.
    let mut a = Position::startpos();
    play(&mut a, &["e2e4"]);
    let b = Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
        .unwrap();
    assert_eq!(a.ep_square(), Some(20));
    assert_eq!(a.hash(), b.hash());

    // Here d4xe3 is available and the keys differ.
    let c = Position::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
        .unwrap();
    let d = Position::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
        .unwrap();
    assert_ne!(c.hash(), d.hash());
    assert_eq!(c.hash(), c.compute_hash());
}

#[test]
fn test_null_move_round_trip() {
    let mut pos = Position::from_fen(
        "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
    )
    .unwrap();
    let before = pos.clone();
    pos.make_null_move();
    assert_eq!(pos.side_to_move(), Color::White);
    assert_eq!(pos.ep_square(), None);
    assert_eq!(pos.hash(), pos.compute_hash());
    pos.unmake_null_move();
    assert_eq!(pos, before);
}

#[test]
fn test_repetition_detection() {
    let mut pos = Position::startpos();
    play(&mut pos, &["g1f3", "g8f6", "f3g1"]);
    assert!(!pos.is_repetition());
    play(&mut pos, &["f6g8"]);
    assert!(pos.is_repetition());
}

#[test]
fn test_fifty_move_rule() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
    assert!(!pos.is_fifty_move_draw());
    let mut pos = pos;
    play(&mut pos, &["a1a2"]);
    assert!(pos.is_fifty_move_draw());
    assert!(pos.is_draw());
}

#[test]
fn test_insufficient_material() {
    let drawn = [
        "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
        "4k3/8/8/8/8/8/8/3NK3 w - - 0 1",
        "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
        "4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1", // same-colored bishops
    ];
    for fen in drawn {
        assert!(Position::from_fen(fen).unwrap().is_insufficient_material(), "{fen}");
    }
    let playable = [
        "4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1",
        "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
        "4k3/8/8/8/8/8/8/2NNK3 w - - 0 1",
    ];
    for fen in playable {
        assert!(!Position::from_fen(fen).unwrap().is_insufficient_material(), "{fen}");
    }
}

#[test]
fn test_checkers_and_attackers() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/3q4/4K3 w - - 0 1").unwrap();
    assert!(pos.in_check());
    assert_eq!(pos.checkers(), Bitboard::from_square(11));
    let attackers = pos.attackers_to(12, pos.occupied());
    assert!(attackers.contains(4)); // white king defends e2
    assert!(attackers.contains(11)); // black queen
}
