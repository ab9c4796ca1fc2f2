use super::*;

const WHITE_KNIGHT: Piece = Piece::new(Color::White, PieceKind::Knight);
const BLACK_PAWN: Piece = Piece::new(Color::Black, PieceKind::Pawn);

#[test]
fn test_gravity_stays_bounded() {
    let mut entry = 0i16;
    for _ in 0..1000 {
        gravity(&mut entry, HISTORY_MAX);
    }
    assert!(entry as i32 <= HISTORY_MAX);
    for _ in 0..1000 {
        gravity(&mut entry, -50_000);
    }
    assert!(entry as i32 >= -HISTORY_MAX);
}

#[test]
fn test_bonus_grows_with_depth() {
    assert!(stat_bonus(1) < stat_bonus(4));
    assert_eq!(stat_bonus(100), 1_600);
    assert!(stat_malus(3) > 0);
}

#[test]
fn test_quiet_and_continuation_updates() {
    let mut history = History::new();
    let mv = Move::new(6, 21); // g1f3
    let prev = ContKey {
        piece: BLACK_PAWN,
        to: 36,
    };
    let cont: ContContext = [Some(prev), None];

    history.update_quiet(Color::White, mv, WHITE_KNIGHT, &cont, 500);
    assert_eq!(history.quiet(Color::White, mv), 500);
    assert_eq!(history.quiet(Color::Black, mv), 0);
    assert_eq!(history.continuation(&cont, WHITE_KNIGHT, 21), 500);
    // The same pair one ply further back lives in the other table.
    assert_eq!(history.continuation(&[None, Some(prev)], WHITE_KNIGHT, 21), 0);

    history.clear();
    assert_eq!(history.quiet(Color::White, mv), 0);
    assert_eq!(history.continuation(&cont, WHITE_KNIGHT, 21), 0);
}

#[test]
fn test_capture_history() {
    let mut history = History::new();
    history.update_capture(WHITE_KNIGHT, 36, PieceKind::Pawn, -300);
    assert_eq!(history.capture(WHITE_KNIGHT, 36, PieceKind::Pawn), -300);
    assert_eq!(history.capture(WHITE_KNIGHT, 36, PieceKind::Rook), 0);
}

#[test]
fn test_killers_shift_and_dedupe() {
    let mut history = History::new();
    let a = Move::new(1, 18);
    let b = Move::new(6, 21);
    history.store_killer(3, a);
    history.store_killer(3, a);
    assert_eq!(history.killers(3), [a, Move::NONE]);
    history.store_killer(3, b);
    assert_eq!(history.killers(3), [b, a]);
    assert_eq!(history.killers(4), [Move::NONE; 2]);
    history.clear_killers();
    assert_eq!(history.killers(3), [Move::NONE; 2]);
}
