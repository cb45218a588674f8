use crate::types::Score;

/// Running best result of a search node.
///
/// `score` starts at negative infinity, which doubles as the "unset" marker.
/// `quality` is the fraction (0..=1) of the nominal search budget that had
/// been completed when the best line was produced.
#[derive(Clone, PartialEq, Debug)]
pub struct SearchOutcome<M> {
    pub best_move: Option<M>,
    pub score: Score,
    pub quality: f64,
}

impl<M> SearchOutcome<M> {
    pub const UNSET: Score = Score::NEG_INFINITY;

    pub fn new() -> Self {
        SearchOutcome {
            best_move: None,
            score: Self::UNSET,
            quality: 0.0,
        }
    }

    /// A leaf result: no move, just a static score.
    pub fn leaf(score: Score, quality: f64) -> Self {
        SearchOutcome {
            best_move: None,
            score,
            quality,
        }
    }

    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.score != Self::UNSET
    }

    /// Replaces the best line iff `score` (already negated into this node's
    /// perspective) is strictly greater. Returns whether it was replaced.
    #[inline(always)]
    pub fn update(&mut self, mv: M, score: Score, quality: f64) -> bool {
        if score > self.score {
            self.best_move = Some(mv);
            self.score = score;
            self.quality = quality;
            true
        } else {
            false
        }
    }
}

impl<M> Default for SearchOutcome<M> {
    fn default() -> Self {
        Self::new()
    }
}
