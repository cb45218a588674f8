use crate::chess::color_of;
use crate::game::Evaluator;
use crate::types::{Score, Side};
use board::{Board, Color, Piece};

const PAWN_VALUE: Score = 100.0;
const KNIGHT_VALUE: Score = 320.0;
const BISHOP_VALUE: Score = 330.0;
const ROOK_VALUE: Score = 500.0;
const QUEEN_VALUE: Score = 900.0;

#[inline(always)]
pub const fn piece_value(piece: Piece) -> Score {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => 0.0,
    }
}

fn material(pos: &Board, color: Color) -> Score {
    Piece::ALL
        .iter()
        .map(|&piece| pos.count(color, piece) as Score * piece_value(piece))
        .sum()
}

/// Material balance from `side`'s point of view.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialEvaluator;

impl Evaluator<Board> for MaterialEvaluator {
    fn evaluate(&self, pos: &Board, side: Side) -> Score {
        let us = color_of(side);
        material(pos, us) - material(pos, us.flip())
    }
}
