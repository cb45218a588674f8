use crate::types::{Color, Piece};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::LazyLock;

pub static ZOBRIST: LazyLock<ZobristTables> = LazyLock::new(ZobristTables::generate);

pub struct ZobristTables {
    pub pieces: [[u64; 64]; 12],
    pub side_to_move: u64,
}

impl ZobristTables {
    pub fn generate() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_C0DE_CAFE_BABE);

        let mut pieces = [[0u64; 64]; 12];
        for table in pieces.iter_mut() {
            for key in table.iter_mut() {
                *key = rng.r#gen();
            }
        }

        Self {
            pieces,
            side_to_move: rng.r#gen(),
        }
    }

    /// Get the Zobrist for a piece on a square
    #[inline(always)]
    pub fn piece(&self, piece: Piece, color: Color, square: usize) -> u64 {
        self.pieces[Self::piece_index(piece, color)][square]
    }

    #[inline(always)]
    fn piece_index(piece: Piece, color: Color) -> usize {
        let base = piece as usize;
        match color {
            Color::White => base,
            Color::Black => base + 6,
        }
    }
}
