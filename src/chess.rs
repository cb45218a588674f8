//! Glue between the search core and the reference board crate.

use crate::error::SearchError;
use crate::game::{MoveSource, Position};
use crate::types::Side;
use board::{Board, Color, KingCapture, Move};

/// White moves first.
#[inline(always)]
pub const fn color_of(side: Side) -> Color {
    match side {
        Side::First => Color::White,
        Side::Second => Color::Black,
    }
}

#[inline(always)]
pub const fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::First,
        Color::Black => Side::Second,
    }
}

impl From<KingCapture> for SearchError {
    fn from(_: KingCapture) -> Self {
        SearchError::IllegalKingCapture
    }
}

impl Position for Board {
    type Move = Move;
    type Key = u64;

    #[inline(always)]
    fn apply_move(&self, mv: &Move) -> Board {
        self.apply(mv)
    }

    #[inline(always)]
    fn canonical_key(&self) -> u64 {
        self.zobrist()
    }
}

/// Pseudo-legal chess moves. Moves that expose the mover's king are left in;
/// the search discards them when the reply reports a king capture.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChessRules;

impl MoveSource<Board> for ChessRules {
    fn moves_for_side(&self, pos: &Board, side: Side) -> Result<Vec<Move>, SearchError> {
        Ok(pos.pseudo_moves(color_of(side))?)
    }
}

impl ChessRules {
    /// Moves for `side` that do not leave its own king en prise.
    pub fn legal_moves(&self, pos: &Board, side: Side) -> Vec<Move> {
        let color = color_of(side);
        pos.pseudo_moves(color)
            .unwrap_or_default()
            .into_iter()
            .filter(|mv| pos.apply(mv).pseudo_moves(color.flip()).is_ok())
            .collect()
    }

    /// Resolves coordinate notation against the legal moves of `side`.
    pub fn parse_move(&self, pos: &Board, side: Side, text: &str) -> Option<Move> {
        let wanted = Move::parse(text)?;
        self.legal_moves(pos, side).into_iter().find(|mv| *mv == wanted)
    }
}
