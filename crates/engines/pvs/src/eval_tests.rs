use super::*;
use chess_core::{legal_moves, parse_uci_move};

#[test]
fn test_startpos_is_symmetric() {
    let pos = Position::startpos();
    // Only the tempo bonus separates the sides.
    assert_eq!(evaluate(&pos), TEMPO);

    let mut black = pos.clone();
    black.make_null_move();
    assert_eq!(evaluate(&black), TEMPO);
}

#[test]
fn test_mirrored_positions_score_equally() {
    let white = Position::from_fen("r3k2r/pp3ppp/2n5/3q4/8/2N5/PP3PPP/R2QK2R w KQkq - 0 1").unwrap();
    let black = Position::from_fen("r2qk2r/pp3ppp/2n5/8/3Q4/2N5/PP3PPP/R3K2R b KQkq - 0 1").unwrap();
    assert_eq!(evaluate(&white), evaluate(&black));
}

#[test]
fn test_material_advantage() {
    let up_queen = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
    assert!(evaluate(&up_queen) > 800);
    let down_queen = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
    assert!(evaluate(&down_queen) < -800);
}

/// Walks every legal move to `depth`, checking incremental against scratch.
fn check_incremental(pos: &mut Position, eval: &mut PstEvaluator, depth: u8) {
    assert_eq!(eval.evaluate(pos), evaluate(pos), "mismatch at {}", pos.to_fen());
    if depth == 0 {
        return;
    }
    for mv in legal_moves(pos) {
        eval.on_make_move(pos, mv);
        pos.make_move(mv);
        check_incremental(pos, eval, depth - 1);
        pos.unmake_move(mv);
        eval.on_unmake_move();
    }
}

#[test]
fn test_incremental_matches_scratch() {
    for fen in [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
    ] {
        let mut pos = Position::from_fen(fen).unwrap();
        let mut eval = PstEvaluator::new();
        eval.reset(&pos);
        check_incremental(&mut pos, &mut eval, 2);
    }
}

#[test]
fn test_hooks_without_reset() {
    let mut pos = Position::startpos();
    let mut eval = PstEvaluator::new();
    let mv = parse_uci_move(&pos, "e2e4").unwrap();
    eval.on_make_move(&pos, mv);
    pos.make_move(mv);
    assert_eq!(eval.evaluate(&pos), evaluate(&pos));
    pos.unmake_move(mv);
    eval.on_unmake_move();
    assert_eq!(eval.evaluate(&pos), TEMPO);
}
