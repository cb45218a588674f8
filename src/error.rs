use crate::types::{mated_score, Score};
use thiserror::Error;

/// Every way a search can end other than with an ordinary scored move.
///
/// These are game outcomes, not infrastructure failures. `IllegalKingCapture`
/// doubles as the in-search check signal: a child reporting it means the move
/// leading there left the mover's king en prise.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SearchError {
    #[error("side to move can capture the opposing king")]
    IllegalKingCapture,

    #[error("checkmate {depth} plies below the root (score {score})")]
    Checkmate { depth: u32, score: Score },

    #[error("draw: no legal moves and not in check")]
    Draw,
}

impl SearchError {
    pub fn checkmate_at(depth: u32) -> Self {
        SearchError::Checkmate {
            depth,
            score: mated_score(depth),
        }
    }

    /// The score a terminal outcome carries for the side to move, or `None`
    /// for the illegal-position signal which carries no score.
    pub fn score(&self) -> Option<Score> {
        match self {
            SearchError::IllegalKingCapture => None,
            SearchError::Checkmate { score, .. } => Some(*score),
            SearchError::Draw => Some(0.0),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchError::IllegalKingCapture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CHECKMATE_SCORE;

    #[test]
    fn test_terminal_scores() {
        assert_eq!(SearchError::Draw.score(), Some(0.0));
        assert_eq!(SearchError::IllegalKingCapture.score(), None);
        assert_eq!(
            SearchError::checkmate_at(2).score(),
            Some(-(CHECKMATE_SCORE - 2.0))
        );
        assert!(SearchError::Draw.is_terminal());
        assert!(!SearchError::IllegalKingCapture.is_terminal());
    }
}
