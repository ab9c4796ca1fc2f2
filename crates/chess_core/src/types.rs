use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}
impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
    pub const fn idx(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Promotion targets in generation order (queen first).
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    #[inline(always)]
    pub const fn idx(self) -> usize {
        self as usize
    }

    pub fn from_char(ch: char) -> Option<PieceKind> {
        match ch.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Lowercase letter used by FEN and UCI promotion suffixes.
    pub const fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Dense index 0..12 (white pawn .. black king), used by history tables.
    #[inline(always)]
    pub const fn idx(self) -> usize {
        self.color.idx() * 6 + self.kind.idx()
    }

    pub fn from_fen_char(ch: char) -> Option<Piece> {
        let kind = PieceKind::from_char(ch)?;
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { color, kind })
    }

    pub fn to_fen_char(self) -> char {
        let ch = self.kind.to_char();
        match self.color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }
}

// Move encoding: bits 0-5 from, bits 6-11 to, bits 12-15 flag.
const FLAG_NORMAL: u16 = 0;
const FLAG_EN_PASSANT: u16 = 1;
const FLAG_CASTLE: u16 = 2;
const FLAG_PROMO_KNIGHT: u16 = 4;
const FLAG_PROMO_BISHOP: u16 = 5;
const FLAG_PROMO_ROOK: u16 = 6;
const FLAG_PROMO_QUEEN: u16 = 7;

/// A move packed into 16 bits.
///
/// Castling is encoded as the king's two-square step (`e1g1`), matching UCI.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    /// All-zero encoding (`a1a1`), never a real move.
    pub const NONE: Move = Move(0);

    #[inline(always)]
    const fn pack(from: u8, to: u8, flag: u16) -> Self {
        Move((from as u16 & 0x3f) | ((to as u16 & 0x3f) << 6) | (flag << 12))
    }

    #[inline(always)]
    pub const fn new(from: u8, to: u8) -> Self {
        Self::pack(from, to, FLAG_NORMAL)
    }

    #[inline(always)]
    pub const fn en_passant(from: u8, to: u8) -> Self {
        Self::pack(from, to, FLAG_EN_PASSANT)
    }

    #[inline(always)]
    pub const fn castle(from: u8, to: u8) -> Self {
        Self::pack(from, to, FLAG_CASTLE)
    }

    #[inline(always)]
    pub const fn promotion(from: u8, to: u8, kind: PieceKind) -> Self {
        let flag = match kind {
            PieceKind::Knight => FLAG_PROMO_KNIGHT,
            PieceKind::Bishop => FLAG_PROMO_BISHOP,
            PieceKind::Rook => FLAG_PROMO_ROOK,
            _ => FLAG_PROMO_QUEEN,
        };
        Self::pack(from, to, flag)
    }

    #[inline(always)]
    pub const fn from(self) -> u8 {
        (self.0 & 0x3f) as u8
    }

    #[inline(always)]
    pub const fn to(self) -> u8 {
        ((self.0 >> 6) & 0x3f) as u8
    }

    #[inline(always)]
    const fn flag(self) -> u16 {
        self.0 >> 12
    }

    #[inline(always)]
    pub const fn promo(self) -> Option<PieceKind> {
        match self.flag() {
            FLAG_PROMO_KNIGHT => Some(PieceKind::Knight),
            FLAG_PROMO_BISHOP => Some(PieceKind::Bishop),
            FLAG_PROMO_ROOK => Some(PieceKind::Rook),
            FLAG_PROMO_QUEEN => Some(PieceKind::Queen),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn is_promotion(self) -> bool {
        self.flag() >= FLAG_PROMO_KNIGHT
    }

    #[inline(always)]
    pub const fn is_en_passant(self) -> bool {
        self.flag() == FLAG_EN_PASSANT
    }

    #[inline(always)]
    pub const fn is_castle(self) -> bool {
        self.flag() == FLAG_CASTLE
    }

    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline(always)]
    pub const fn from_raw(raw: u16) -> Self {
        Move(raw)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", sq_to_coord(self.from()), sq_to_coord(self.to()))?;
        if let Some(kind) = self.promo() {
            write!(f, "{}", kind.to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("Move(none)");
        }
        write!(f, "Move({self})")
    }
}

// Helpers
pub fn rank_of(sq: u8) -> i8 {
    (sq / 8) as i8
}
pub fn sq(file: i8, rank: i8) -> Option<u8> {
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank as u8) * 8 + (file as u8))
    } else {
        None
    }
}

pub fn sq_to_coord(sq: u8) -> String {
    let f = (b'a' + (sq % 8)) as char;
    let r = (b'1' + (sq / 8)) as char;
    format!("{f}{r}")
}

pub fn coord_to_sq(c: &str) -> Option<u8> {
    let b = c.as_bytes();
    if b.len() != 2 {
        return None;
    }
    let f = b[0];
    let r = b[1];
    if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
        return None;
    }
    let file = f - b'a';
    let rank = r - b'1';
    Some(rank * 8 + file)
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
