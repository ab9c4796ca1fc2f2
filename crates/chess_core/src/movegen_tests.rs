use super::*;
use crate::uci::parse_uci_move;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn generate_kind(pos: &Position, gen_type: GenType) -> MoveList {
    let mut list = MoveList::new();
    generate(pos, gen_type, &mut list);
    list
}

#[test]
fn test_startpos_moves() {
    let pos = Position::startpos();
    assert_eq!(legal_moves(&pos).len(), 20);
    assert!(generate_kind(&pos, GenType::Noisy).is_empty());
    assert_eq!(generate_kind(&pos, GenType::Quiet).len(), 20);
}

#[test]
fn test_kiwipete_moves() {
    let pos = Position::from_fen(KIWIPETE).unwrap();
    let all = generate_kind(&pos, GenType::All);
    assert_eq!(all.len(), 48);
    // 8 captures, two castling moves among the quiets.
    assert_eq!(generate_kind(&pos, GenType::Captures).len(), 8);
    assert_eq!(all.iter().filter(|m| m.is_castle()).count(), 2);
}

#[test]
fn test_noisy_and_quiet_partition_all() {
    let fens = [
        KIWIPETE,
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbqkb1r/pp1p1pPp/8/2p1pP2/1P1P4/3P3P/P1P1P3/RNBQKBNR w KQkq e6 0 1",
    ];
    for fen in fens {
        let pos = Position::from_fen(fen).unwrap();
        let all = generate_kind(&pos, GenType::All);
        let noisy = generate_kind(&pos, GenType::Noisy);
        let quiet = generate_kind(&pos, GenType::Quiet);
        assert_eq!(noisy.len() + quiet.len(), all.len(), "{fen}");
        for mv in noisy.iter().chain(quiet.iter()) {
            assert!(all.contains(mv), "{fen}: {mv}");
        }
        for mv in noisy.iter() {
            assert!(!quiet.contains(mv), "{fen}: {mv} in both");
        }
    }
}

#[test]
fn test_promotions_are_noisy() {
    let pos = Position::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let noisy = generate_kind(&pos, GenType::Noisy);
    assert_eq!(noisy.len(), 4);
    assert!(noisy.iter().all(|m| m.is_promotion()));
    assert!(generate_kind(&pos, GenType::Captures).is_empty());
}

#[test]
fn test_en_passant_rank_pin() {
    // Taking en passant would expose the king on the fifth rank.
    let pos = Position::from_fen("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1").unwrap();
    let moves = legal_moves(&pos);
    assert!(!moves.iter().any(|m| m.is_en_passant()));

    // Without the rook the capture is fine.
    let pos = Position::from_fen("8/8/8/KPp5/8/8/8/4k3 w - c6 0 1").unwrap();
    assert!(legal_moves(&pos).iter().any(|m| m.is_en_passant()));
}

#[test]
fn test_check_evasions() {
    // Rook check on the e-file: king steps aside or the bishop blocks.
    let pos = Position::from_fen("4r1k1/8/8/8/8/8/3B4/4K3 w - - 0 1").unwrap();
    let moves = legal_moves(&pos);
    assert!(moves.contains(&Move::new(11, 20))); // Bd2-e3 blocks
    assert!(!moves.contains(&Move::new(11, 2))); // Bd2-c1 ignores the check
    assert!(!moves.contains(&Move::new(4, 12))); // Ke1-e2 stays on the file

    // Double check: only king moves.
    let pos = Position::from_fen("4r1k1/8/8/8/8/3n4/3B4/4K3 w - - 0 1").unwrap();
    assert!(pos.checkers().more_than_one());
    assert!(legal_moves(&pos).iter().all(|m| m.from() == 4));
}

#[test]
fn test_castling_through_attack_is_illegal() {
    // Black bishop on a6 covers f1.
    let pos = Position::from_fen("4k3/8/b7/8/8/8/8/4K2R w K - 0 1").unwrap();
    assert!(!legal_moves(&pos).iter().any(|m| m.is_castle()));
}

#[test]
fn test_pseudo_legal_validation() {
    let pos = Position::startpos();
    assert!(is_pseudo_legal(&pos, Move::new(12, 28))); // e2e4
    assert!(is_pseudo_legal(&pos, Move::new(6, 21))); // Ng1f3
    assert!(!is_pseudo_legal(&pos, Move::new(12, 36))); // e2e5
    assert!(!is_pseudo_legal(&pos, Move::new(52, 44))); // black pawn, white to move
    assert!(!is_pseudo_legal(&pos, Move::castle(4, 6))); // path blocked
    assert!(!is_pseudo_legal(&pos, Move::NONE));

    // Every generated move passes, in a position full of special moves.
    let pos = Position::from_fen(KIWIPETE).unwrap();
    for mv in legal_moves(&pos) {
        assert!(is_pseudo_legal(&pos, mv), "{mv}");
    }
    // A knight move from another position does not.
    let stale = parse_uci_move(&Position::startpos(), "b1c3").unwrap();
    assert!(!is_pseudo_legal(&pos, stale));
}

#[test]
fn test_move_list_retain() {
    let mut list = MoveList::new();
    for to in 16..24 {
        list.push(Move::new(8, to));
    }
    list.retain(|m| m.to() % 2 == 0);
    assert_eq!(list.len(), 4);
    assert_eq!(list[1], Move::new(8, 18));
}
