use crate::types::Score;

/// The alpha-beta window, always from the point of view of the side to move.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ScoreBound {
    pub alpha: Score,
    pub beta: Score,
}

impl ScoreBound {
    #[inline(always)]
    pub const fn new(alpha: Score, beta: Score) -> Self {
        ScoreBound { alpha, beta }
    }

    /// The unbounded window `(-inf, +inf)`.
    #[inline(always)]
    pub const fn full() -> Self {
        ScoreBound {
            alpha: Score::NEG_INFINITY,
            beta: Score::INFINITY,
        }
    }

    /// Window for the opponent one ply down: `{-beta, -alpha}`.
    #[inline(always)]
    pub fn next(self) -> Self {
        ScoreBound {
            alpha: -self.beta,
            beta: -self.alpha,
        }
    }

    /// Folds an already negated child score into the window. Raises alpha
    /// when the score improves on it and returns `true` on a fail-high
    /// cutoff (`score >= beta`). Alpha never decreases.
    #[inline(always)]
    pub fn update(&mut self, score: Score) -> bool {
        if score > self.alpha {
            self.alpha = score;
        }
        score >= self.beta
    }
}

impl Default for ScoreBound {
    fn default() -> Self {
        Self::full()
    }
}
