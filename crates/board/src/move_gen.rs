use crate::board::Board;
use crate::types::*;
use thiserror::Error;

/// The side asked to move can capture the opposing king: the position is not
/// one that legal play could have reached with that side to move.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("opposing king can be captured")]
pub struct KingCapture;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

#[inline(always)]
fn offset(sq: usize, df: i8, dr: i8) -> Option<usize> {
    let file = (sq % 8) as i8 + df;
    let rank = (sq / 8) as i8 + dr;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(square(file as usize, rank as usize))
    } else {
        None
    }
}

// ============================================================================
// PSEUDO-LEGAL GENERATION
// ============================================================================

impl Board {
    /// Pseudo-legal moves for `color`, in square order (a1..h8) and a fixed
    /// direction order per piece. Moves that leave `color`'s own king
    /// attacked are included: legality is settled one ply later, when the
    /// reply generation reports `KingCapture`.
    ///
    /// Castling and en passant are not generated.
    pub fn pseudo_moves(&self, color: Color) -> Result<Vec<Move>, KingCapture> {
        let mut moves = Vec::with_capacity(48);

        for from in 0..64 {
            let Some((piece, owner)) = self.piece_map[from] else {
                continue;
            };
            if owner != color {
                continue;
            }
            match piece {
                Piece::Pawn => self.pawn_moves(from, color, &mut moves)?,
                Piece::Knight => self.step_moves(from, color, &KNIGHT_OFFSETS, &mut moves)?,
                Piece::King => self.step_moves(from, color, &KING_OFFSETS, &mut moves)?,
                Piece::Bishop => self.slide_moves(from, color, &BISHOP_DIRS, &mut moves)?,
                Piece::Rook => self.slide_moves(from, color, &ROOK_DIRS, &mut moves)?,
                Piece::Queen => {
                    self.slide_moves(from, color, &ROOK_DIRS, &mut moves)?;
                    self.slide_moves(from, color, &BISHOP_DIRS, &mut moves)?;
                }
            }
        }

        Ok(moves)
    }

    /// Whether `color`'s king is attacked, i.e. the opponent could capture it.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.pseudo_moves(color.flip()).is_err()
    }

    /// Classifies a target square: `Ok(true)` if the mover may land there,
    /// `Ok(false)` if blocked by its own piece, `Err` if it holds the enemy king.
    #[inline(always)]
    fn target(&self, to: usize, color: Color) -> Result<bool, KingCapture> {
        match self.piece_map[to] {
            None => Ok(true),
            Some((_, owner)) if owner == color => Ok(false),
            Some((Piece::King, _)) => Err(KingCapture),
            Some(_) => Ok(true),
        }
    }

    fn step_moves(
        &self,
        from: usize,
        color: Color,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) -> Result<(), KingCapture> {
        for &(df, dr) in offsets {
            if let Some(to) = offset(from, df, dr) {
                if self.target(to, color)? {
                    moves.push(Move::new(from, to));
                }
            }
        }
        Ok(())
    }

    fn slide_moves(
        &self,
        from: usize,
        color: Color,
        dirs: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) -> Result<(), KingCapture> {
        for &(df, dr) in dirs {
            let mut sq = from;
            while let Some(to) = offset(sq, df, dr) {
                if !self.target(to, color)? {
                    break;
                }
                moves.push(Move::new(from, to));
                if self.piece_map[to].is_some() {
                    break;
                }
                sq = to;
            }
        }
        Ok(())
    }

    fn pawn_moves(&self, from: usize, color: Color, moves: &mut Vec<Move>) -> Result<(), KingCapture> {
        let dir = color.pawn_direction();

        // Captures first so a king capture is reported regardless of pushes
        for df in [-1, 1] {
            if let Some(to) = offset(from, df, dir) {
                if let Some((_, owner)) = self.piece_map[to] {
                    if owner != color && self.target(to, color)? {
                        push_pawn_move(from, to, color, moves);
                    }
                }
            }
        }

        if let Some(one) = offset(from, 0, dir) {
            if self.piece_map[one].is_none() {
                push_pawn_move(from, one, color, moves);

                if from / 8 == color.pawn_start_rank() {
                    if let Some(two) = offset(one, 0, dir) {
                        if self.piece_map[two].is_none() {
                            moves.push(Move::new(from, two));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[inline(always)]
fn push_pawn_move(from: usize, to: usize, color: Color, moves: &mut Vec<Move>) {
    if to / 8 == color.promotion_rank() {
        for piece in PROMOTIONS {
            moves.push(Move::promote(from, to, piece));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

/// Counts leaf nodes of the legal move tree, rejecting moves that leave the
/// mover's king capturable.
pub fn perft(board: &Board, color: Color, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let Ok(moves) = board.pseudo_moves(color) else {
        return 0;
    };
    let mut nodes = 0;
    for mv in moves {
        let next = board.apply(&mv);
        if next.pseudo_moves(color.flip()).is_err() {
            continue;
        }
        nodes += perft(&next, color.flip(), depth - 1);
    }
    nodes
}
