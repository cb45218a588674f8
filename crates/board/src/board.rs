use crate::types::*;
use crate::zobrist::ZOBRIST;
use std::fmt;
use thiserror::Error;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN needs at least 4 fields, got {0}")]
    MissingFields(usize),
    #[error("invalid piece placement: {0}")]
    Placement(String),
    #[error("invalid side to move: {0}")]
    SideToMove(String),
    #[error("invalid castling field: {0}")]
    Castling(String),
    #[error("invalid en passant square: {0}")]
    EnPassant(String),
    #[error("{0} king(s) found, expected exactly one per side")]
    KingCount(String),
}

// ============================================================================
// BOARD
// ============================================================================

/// A mailbox board. Boards are values: `apply` returns a new board and leaves
/// the receiver untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    pub piece_map: [Option<(Piece, Color)>; 64],
    pub side_to_move: Color,
    pub castling_rights: CastleRights,
    pub en_passant: Option<u8>,
    pub halfmove: u16,
    pub fullmove: u16,
    hash: u64,
}

impl Board {
    pub fn startpos() -> Self {
        Self::from_fen(STARTPOS_FEN).expect("Invalid starting FEN")
    }

    pub fn empty() -> Self {
        Board {
            piece_map: [None; 64],
            side_to_move: Color::White,
            castling_rights: CastleRights::NONE,
            en_passant: None,
            halfmove: 0,
            fullmove: 1,
            hash: 0,
        }
    }

    /// Parse FEN string
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::MissingFields(parts.len()));
        }

        let mut board = Board::empty();

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Placement(parts[0].to_string()));
        }
        for (i, row) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let (piece, color) = Piece::from_symbol(c)
                        .ok_or_else(|| FenError::Placement(parts[0].to_string()))?;
                    if file >= 8 {
                        return Err(FenError::Placement(parts[0].to_string()));
                    }
                    board.piece_map[square(file, rank)] = Some((piece, color));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::Placement(parts[0].to_string()));
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = board.count(color, Piece::King);
            if kings != 1 {
                return Err(FenError::KingCount(format!("{kings} {color:?}")));
            }
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        board.castling_rights = CastleRights::from_fen(parts[2])
            .ok_or_else(|| FenError::Castling(parts[2].to_string()))?;

        if parts[3] != "-" {
            let sq =
                parse_square(parts[3]).ok_or_else(|| FenError::EnPassant(parts[3].to_string()))?;
            board.en_passant = Some(sq as u8);
        }

        if parts.len() >= 5 {
            board.halfmove = parts[4].parse().unwrap_or(0);
        }
        if parts.len() >= 6 {
            board.fullmove = parts[5].parse().unwrap_or(1);
        }

        board.hash = board.compute_hash();
        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_map[square(file, rank)] {
                    Some((piece, color)) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.symbol(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| square_name(sq as usize));

        format!(
            "{} {} {} {} {} {}",
            placement,
            side,
            self.castling_rights.to_fen(),
            ep,
            self.halfmove,
            self.fullmove
        )
    }

    // ========================================================================
    // PIECE QUERIES
    // ========================================================================

    #[inline(always)]
    pub fn piece_at(&self, sq: usize) -> Option<(Piece, Color)> {
        self.piece_map[sq]
    }

    pub fn count(&self, color: Color, piece: Piece) -> u32 {
        self.piece_map
            .iter()
            .filter(|slot| **slot == Some((piece, color)))
            .count() as u32
    }

    pub fn king_square(&self, color: Color) -> Option<usize> {
        self.piece_map
            .iter()
            .position(|slot| *slot == Some((Piece::King, color)))
    }

    /// Zobrist key over piece placement and side to move.
    #[inline(always)]
    pub fn zobrist(&self) -> u64 {
        self.hash
    }

    fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for (sq, slot) in self.piece_map.iter().enumerate() {
            if let Some((piece, color)) = *slot {
                hash ^= ZOBRIST.piece(piece, color, sq);
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.side_to_move;
        }
        hash
    }

    // ========================================================================
    // MOVE APPLICATION
    // ========================================================================

    /// Returns the board after `mv`. The move is trusted to come from
    /// `pseudo_moves`; applying anything else is a contract violation.
    pub fn apply(&self, mv: &Move) -> Board {
        let mut next = self.clone();
        let from = mv.from();
        let to = mv.to();

        let Some((piece, color)) = self.piece_map[from] else {
            debug_assert!(false, "no piece on {}", square_name(from));
            return next;
        };

        if let Some((captured, captured_color)) = self.piece_map[to] {
            next.hash ^= ZOBRIST.piece(captured, captured_color, to);
            next.castling_rights.remove_rook(to);
        }

        next.hash ^= ZOBRIST.piece(piece, color, from);
        next.piece_map[from] = None;

        let placed = mv.promotion.unwrap_or(piece);
        next.piece_map[to] = Some((placed, color));
        next.hash ^= ZOBRIST.piece(placed, color, to);

        match piece {
            Piece::King => next.castling_rights.remove_color(color),
            Piece::Rook => next.castling_rights.remove_rook(from),
            _ => {}
        }

        next.en_passant = None;
        if piece == Piece::Pawn && from.abs_diff(to) == 16 {
            next.en_passant = Some(((from + to) / 2) as u8);
        }

        if piece == Piece::Pawn || self.piece_map[to].is_some() {
            next.halfmove = 0;
        } else {
            next.halfmove = self.halfmove.saturating_add(1);
        }
        if color == Color::Black {
            next.fullmove = self.fullmove.saturating_add(1);
        }

        next.side_to_move = self.side_to_move.flip();
        next.hash ^= ZOBRIST.side_to_move;
        next
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                match self.piece_map[square(file, rank)] {
                    Some((piece, color)) => write!(f, "{} ", piece.symbol(color))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
