//! A compact mailbox chess board used as the reference collaborator for the
//! search engine: FEN parsing, pseudo-legal move generation that reports
//! king captures, pure move application and Zobrist keys.

mod board;
mod move_gen;
mod types;
mod zobrist;

pub use board::{Board, FenError, STARTPOS_FEN};
pub use move_gen::{perft, KingCapture};
pub use types::*;
pub use zobrist::{ZobristTables, ZOBRIST};
