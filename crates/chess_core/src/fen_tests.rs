use super::*;
use crate::uci::parse_uci_move;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn test_startpos_matches_fen() {
    let parsed = Position::from_fen(STARTPOS_FEN).unwrap();
    assert_eq!(parsed, Position::startpos());
    assert_eq!(Position::startpos().to_fen(), STARTPOS_FEN);
}

#[test]
fn test_round_trip() {
    for fen in [
        STARTPOS_FEN,
        KIWIPETE,
        "rnbqkbnr/pp1ppppp/8/2pP4/8/8/PPP1PPPP/RNBQKBNR w KQkq c6 0 3",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R2QKB1R b KQ - 7 42",
    ] {
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
    }
}

#[test]
fn test_optional_counters() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - -").unwrap();
    assert_eq!(pos.halfmove_clock(), 0);
    assert_eq!(pos.fullmove_number(), 1);
    assert_eq!(pos.game_ply(), 1);
}

#[test]
fn test_rejects_malformed_fens() {
    let cases: [(&str, FenError); 10] = [
        ("8/8/8 w - -", FenError::RankCount(3)),
        ("4k3/8/8/8/8/8/8/4K3", FenError::FieldCount(1)),
        ("4k3/8/8/8/8/8/8/4X3 w - - 0 1", FenError::PieceChar('X')),
        (
            "4k3/8/8/8/8/8/8/4K4 w - - 0 1",
            FenError::RankLength { rank: 1, files: 9 },
        ),
        ("4k3/8/8/8/8/8/8/4K3 x - - 0 1", FenError::SideToMove("x".into())),
        ("4k3/8/8/8/8/8/8/4K3 w Z - 0 1", FenError::CastlingChar('Z')),
        ("4k3/8/8/8/8/8/8/4K3 w K - 0 1", FenError::CastlingRights('K')),
        ("4k3/8/8/8/8/8/8/4K3 w - e9 0 1", FenError::EnPassant("e9".into())),
        ("4k3/8/8/8/8/8/8/4K3 w - - x 1", FenError::Counter("x".into())),
        (
            "8/8/8/8/8/8/8/4K3 w - - 0 1",
            FenError::KingCount {
                color: "black",
                count: 0,
            },
        ),
    ];
    for (fen, expected) in cases {
        assert_eq!(Position::from_fen(fen).unwrap_err(), expected, "{fen}");
    }
}

#[test]
fn test_rejects_impossible_positions() {
    // Black to move but white is in check from the rook.
    assert_eq!(
        Position::from_fen("4k3/8/8/8/8/8/8/r3K3 b - - 0 1").unwrap_err(),
        FenError::OpponentInCheck
    );
    assert_eq!(
        Position::from_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err(),
        FenError::PawnOnBackRank("a8".into())
    );
    // Ep square with no pawn in front of it.
    assert!(matches!(
        Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e6 0 1"),
        Err(FenError::EnPassant(_))
    ));
}

#[test]
fn test_rejects_out_of_range_counters() {
    for fen in [
        "4k3/8/8/8/8/8/8/4K3 w - - 0 3000000000",
        "4k3/8/8/8/8/8/8/4K3 w - - 4294967295 1",
        "4k3/8/8/8/8/8/8/4K3 w - - 10001 1",
    ] {
        assert!(matches!(Position::from_fen(fen), Err(FenError::Counter(_))), "{fen}");
    }

    // The largest accepted counters still survive a move.
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 10000 1000000").unwrap();
    let mv = parse_uci_move(&pos, "e1d1").unwrap();
    pos.make_move(mv);
    assert_eq!(pos.halfmove_clock(), 10_001);
}
