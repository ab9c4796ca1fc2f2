use super::*;
use chess_core::parse_uci_move;

fn see(fen: &str, mv: &str, threshold: i32) -> bool {
    let pos = Position::from_fen(fen).unwrap();
    let mv = parse_uci_move(&pos, mv).unwrap();
    see_ge(&pos, mv, threshold)
}

#[test]
fn test_free_pawn() {
    // Rook takes an undefended pawn.
    let fen = "1k1r4/1pp4p/p7/4p3/8/P5P1/1PP4P/2K1R3 w - - 0 1";
    assert!(see(fen, "e1e5", 0));
    assert!(see(fen, "e1e5", 100));
    assert!(!see(fen, "e1e5", 101));
}

#[test]
fn test_defended_pawn_loses_knight() {
    // Nxe5 dxe5 hands over a knight for a pawn.
    let fen = "1k1r3q/1ppn3p/p4b2/4p3/8/P2N2P1/1PP1R1BP/2K1Q3 w - - 0 1";
    assert!(!see(fen, "d3e5", 0));
    assert!(see(fen, "d3e5", -220));
}

#[test]
fn test_xray_recapture() {
    // Rxe5 Rxe5 Rxe5: the doubled rook behind joins through the x-ray.
    let fen = "4r1k1/8/8/4p3/8/8/4R3/4R1K1 w - - 0 1";
    assert!(see(fen, "e2e5", 100));
    let single = "4r1k1/8/8/4p3/8/8/4R3/6K1 w - - 0 1";
    assert!(!see(single, "e2e5", 0));
}

#[test]
fn test_equal_trade() {
    let fen = "4k3/8/3q4/8/8/3Q4/8/4K3 w - - 0 1";
    // Queen trade: undefended on both sides.
    assert!(see(fen, "d3d6", 950));
    let defended = "4k3/2p5/3q4/8/8/3Q4/8/4K3 w - - 0 1";
    assert!(see(defended, "d3d6", 0));
    assert!(!see(defended, "d3d6", 1));
}

#[test]
fn test_bishop_for_knight() {
    let fen = "rnbqkbnr/ppppp1pp/8/5p2/2B5/8/PPPP1PPP/RNBQK1NR w KQkq - 0 1";
    // Bxg8 Rxg8 gives a bishop for a knight.
    assert!(!see(fen, "c4g8", 0));
    assert!(see(fen, "c4g8", -10));
}

#[test]
fn test_king_cannot_recapture_defended_piece() {
    // Qxd7+ with the rook behind the queen: Kxd7 would walk into the rook.
    assert!(see("4k3/3p4/8/8/8/8/3Q4/3RK3 w - - 0 1", "d2d7", 0));
    assert!(!see("4k3/3p4/8/8/8/8/3Q4/4K3 w - - 0 1", "d2d7", 0));
}

#[test]
fn test_quiet_move_threshold() {
    let fen = "4k3/8/8/4p3/8/8/8/3RK3 w - - 0 1";
    // Rd1-d4 walks into the pawn.
    assert!(!see(fen, "d1d4", 0));
    assert!(see(fen, "d1d2", 0));
}

#[test]
fn test_special_moves_are_even() {
    let fen = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1";
    assert!(see(fen, "a7a8q", 0));
    assert!(!see(fen, "a7a8q", 1));
}
