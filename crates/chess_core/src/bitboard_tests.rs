use super::*;

#[test]
fn test_popcount_and_masks() {
    assert_eq!(Bitboard::EMPTY.popcount(), 0);
    assert_eq!(Bitboard::FILE_A.popcount(), 8);
    assert_eq!(Bitboard::RANK_4.popcount(), 8);
    assert!(Bitboard::FILE_H.contains(63));
    assert_eq!(Bitboard::DARK_SQUARES.popcount(), 32);
    assert!(Bitboard::DARK_SQUARES.contains(0)); // a1 is dark
    assert!(Bitboard::LIGHT_SQUARES.contains(7)); // h1 is light
}

#[test]
fn test_lsb_msb() {
    let bb = Bitboard::from_square(3) | Bitboard::from_square(40);
    assert_eq!(bb.lsb(), Some(3));
    assert_eq!(bb.msb(), Some(40));
    assert_eq!(Bitboard::EMPTY.msb(), None);
}

#[test]
fn test_more_than_one() {
    assert!(!Bitboard::EMPTY.more_than_one());
    assert!(!Bitboard::from_square(17).more_than_one());
    assert!((Bitboard::from_square(17) | Bitboard::from_square(18)).more_than_one());
}

#[test]
fn test_iterator_order() {
    let squares: Vec<u8> = Bitboard(0b1010_0001).collect();
    assert_eq!(squares, vec![0, 5, 7]);
}

#[test]
fn test_forward_shift_and_wrap() {
    let e2 = Bitboard::from_square(12);
    assert_eq!(e2.forward(true), Bitboard::from_square(20));
    assert_eq!(e2.forward(false), Bitboard::from_square(4));

    let h4 = Bitboard::from_square(31);
    assert_eq!(h4.east(), Bitboard::EMPTY);
    assert_eq!(h4.north(), Bitboard::from_square(39));
    assert_eq!(Bitboard::from_square(24).west(), Bitboard::EMPTY);
}
