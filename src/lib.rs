//! Negamax game-tree search with alpha-beta pruning, memoization, iterative
//! deepening and a parallel coordinator, generic over the game through the
//! traits in [`game`]. The `chess`, `evaluate` and `uci` modules plug the
//! reference board crate into it.

pub mod error;
pub mod game;
pub mod types;

pub mod search;
pub mod time_control;
pub mod tpt;

pub mod chess;
pub mod evaluate;
pub mod uci;

pub use error::SearchError;
pub use game::{Evaluator, MoveSource, Position};
pub use search::{search, SearchConfig, SearchOutcome, SearchResult, Searcher};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::ChessRules;
    use crate::evaluate::MaterialEvaluator;
    use crate::tpt::SearchCache;
    use board::Board;
    use std::sync::Arc;

    #[test]
    fn test_starting_position_search() {
        let pos = Board::startpos();
        let config = SearchConfig {
            max_depth: 2,
            ..SearchConfig::default()
        };
        let outcome = search(
            &pos,
            Side::First,
            Arc::new(ChessRules),
            Arc::new(MaterialEvaluator),
            Arc::new(SearchCache::new()),
            &config,
        )
        .unwrap();

        // Nothing can be won in two plies from the start.
        assert!(outcome.best_move.is_some());
        assert_eq!(outcome.score, 0.0);
    }
}
