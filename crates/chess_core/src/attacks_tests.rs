use super::*;

#[test]
fn test_knight_attacks() {
    // Knight on e4 (square 28) should attack 8 squares
    assert_eq!(knight_attacks(28).popcount(), 8);

    // Knight on a1 only reaches b3 and c2
    let attacks = knight_attacks(0);
    assert_eq!(attacks.popcount(), 2);
    assert!(attacks.contains(10)); // c2
    assert!(attacks.contains(17)); // b3
}

#[test]
fn test_king_attacks() {
    assert_eq!(king_attacks(28).popcount(), 8);
    assert_eq!(king_attacks(0).popcount(), 3);
}

#[test]
fn test_pawn_attacks() {
    // White pawn on e4 attacks d5 and f5
    let attacks = pawn_attacks(Color::White, 28);
    assert_eq!(attacks.popcount(), 2);
    assert!(attacks.contains(35));
    assert!(attacks.contains(37));

    // Black pawn on a7 attacks only b6
    let attacks = pawn_attacks(Color::Black, 48);
    assert_eq!(attacks, Bitboard::from_square(41));
}

#[test]
fn test_slider_attacks_empty_board() {
    assert_eq!(rook_attacks(28, Bitboard::EMPTY).popcount(), 14);
    assert_eq!(bishop_attacks(28, Bitboard::EMPTY).popcount(), 13);
    assert_eq!(queen_attacks(0, Bitboard::EMPTY).popcount(), 21);
}

#[test]
fn test_rook_attacks_with_blockers() {
    // Rook on a1, blocker on a4
    let attacks = rook_attacks(0, Bitboard::from_square(24));
    assert!(attacks.contains(16)); // a3
    assert!(attacks.contains(24)); // a4 (can capture)
    assert!(!attacks.contains(32)); // a5 (blocked)
    assert!(attacks.contains(7)); // h1
}

#[test]
fn test_bishop_attacks_with_blockers() {
    // Bishop on c1, blockers on e3 and b2
    let occupied = Bitboard::from_square(20) | Bitboard::from_square(9);
    let attacks = bishop_attacks(2, occupied);
    assert_eq!(
        attacks,
        Bitboard::from_square(11) | Bitboard::from_square(20) | Bitboard::from_square(9)
    );
}

#[test]
fn test_magic_matches_ray_cast_for_every_blocker_subset() {
    for sq in 0..64u8 {
        for slider in [Slider::Rook, Slider::Bishop] {
            let mask = slider.relevant_mask(sq);
            for occ in blocker_subsets(mask) {
                // Extra blockers on rank 1, some outside the mask.
                let noisy = occ | (Bitboard::RANK_1 & !Bitboard::from_square(sq));
                let (fast, slow) = match slider {
                    Slider::Rook => (rook_attacks(sq, noisy), rook_attacks_slow(sq, noisy)),
                    Slider::Bishop => (bishop_attacks(sq, noisy), bishop_attacks_slow(sq, noisy)),
                };
                assert_eq!(fast, slow, "square {sq} occupancy {:#x}", noisy.0);
            }
        }
    }
}

#[test]
fn test_blocker_subsets_count() {
    let mask = Slider::Rook.relevant_mask(0);
    assert_eq!(mask.popcount(), 12);
    assert_eq!(blocker_subsets(mask).len(), 4096);
    assert_eq!(Slider::Bishop.relevant_mask(27).popcount(), 9);
}

#[test]
fn test_between_and_line() {
    // a1 .. d4 diagonal
    assert_eq!(
        between(0, 27),
        Bitboard::from_square(9) | Bitboard::from_square(18)
    );
    assert_eq!(between(27, 0), between(0, 27));
    assert_eq!(between(0, 1), Bitboard::EMPTY);
    assert_eq!(between(0, 17), Bitboard::EMPTY); // knight hop

    assert_eq!(line(0, 9).popcount(), 8); // long diagonal
    assert_eq!(line(4, 60), Bitboard::FILE_E);
    assert_eq!(line(0, 17), Bitboard::EMPTY);
    assert!(aligned(4, 12, 60));
    assert!(!aligned(4, 13, 60));
}
