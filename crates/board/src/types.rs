use std::fmt;

// ============================================================================
// COLOR & PIECE
// ============================================================================

#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline(always)]
    pub const fn flip(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank index (0-based) on which this color's pawns promote.
    #[inline(always)]
    pub const fn promotion_rank(self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    #[inline(always)]
    pub const fn pawn_start_rank(self) -> usize {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    #[inline(always)]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// FEN letter, uppercase for white.
    pub const fn symbol(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_symbol(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, color))
    }
}

// ============================================================================
// CASTLING RIGHTS
// ============================================================================

/// Castling rights are carried through FEN round trips; the reference move
/// generator does not produce castling moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CastleRights(pub u8);

impl CastleRights {
    pub const NONE: Self = CastleRights(0);
    const WHITE_KING: u8 = 1;
    const WHITE_QUEEN: u8 = 2;
    const BLACK_KING: u8 = 4;
    const BLACK_QUEEN: u8 = 8;

    #[inline(always)]
    pub fn remove_color(&mut self, color: Color) {
        match color {
            Color::White => self.0 &= !(Self::WHITE_KING | Self::WHITE_QUEEN),
            Color::Black => self.0 &= !(Self::BLACK_KING | Self::BLACK_QUEEN),
        }
    }

    #[inline(always)]
    pub fn remove_rook(&mut self, sq: usize) {
        match sq {
            0 => self.0 &= !Self::WHITE_QUEEN,
            7 => self.0 &= !Self::WHITE_KING,
            56 => self.0 &= !Self::BLACK_QUEEN,
            63 => self.0 &= !Self::BLACK_KING,
            _ => {}
        }
    }

    pub fn from_fen(field: &str) -> Option<Self> {
        let mut rights = 0u8;
        for c in field.chars() {
            rights |= match c {
                'K' => Self::WHITE_KING,
                'Q' => Self::WHITE_QUEEN,
                'k' => Self::BLACK_KING,
                'q' => Self::BLACK_QUEEN,
                '-' => 0,
                _ => return None,
            };
        }
        Some(CastleRights(rights))
    }

    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut out = String::with_capacity(4);
        for (bit, c) in [
            (Self::WHITE_KING, 'K'),
            (Self::WHITE_QUEEN, 'Q'),
            (Self::BLACK_KING, 'k'),
            (Self::BLACK_QUEEN, 'q'),
        ] {
            if self.0 & bit != 0 {
                out.push(c);
            }
        }
        out
    }
}

// ============================================================================
// SQUARES
// ============================================================================

/// Square index for `file` (0 = a) and `rank` (0 = 1), a1 = 0 .. h8 = 63.
#[inline(always)]
pub const fn square(file: usize, rank: usize) -> usize {
    rank * 8 + file
}

/// Parses `"e4"` style notation.
pub fn parse_square(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(square((file - b'a') as usize, (rank - b'1') as usize))
}

pub fn square_name(sq: usize) -> String {
    format!(
        "{}{}",
        (b'a' + (sq % 8) as u8) as char,
        (b'1' + (sq / 8) as u8) as char
    )
}

// ============================================================================
// MOVE
// ============================================================================

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub promotion: Option<Piece>,
}

impl Move {
    #[inline(always)]
    pub const fn new(from: usize, to: usize) -> Self {
        Move {
            from: from as u8,
            to: to as u8,
            promotion: None,
        }
    }

    #[inline(always)]
    pub const fn promote(from: usize, to: usize, piece: Piece) -> Self {
        Move {
            from: from as u8,
            to: to as u8,
            promotion: Some(piece),
        }
    }

    #[inline(always)]
    pub const fn from(self) -> usize {
        self.from as usize
    }

    #[inline(always)]
    pub const fn to(self) -> usize {
        self.to as usize
    }

    /// Parses coordinate notation such as `e2e4` or `e7e8q`.
    pub fn parse(s: &str) -> Option<Self> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return None;
        }
        let from = parse_square(&s[0..2])?;
        let to = parse_square(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match Piece::from_symbol(c.to_ascii_lowercase())? {
                (Piece::Pawn | Piece::King, _) => return None,
                (piece, _) => Some(piece),
            },
        };
        Some(Move {
            from: from as u8,
            to: to as u8,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from()), square_name(self.to()))?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.symbol(Color::Black))?;
        }
        Ok(())
    }
}
