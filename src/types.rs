// ============================================================================
// SIDE
// ============================================================================

/// The two players. Search and evaluation are symmetric in the side.
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Side {
    First = 0,
    Second = 1,
}

impl Side {
    #[inline(always)]
    pub const fn flip(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

// ============================================================================
// SCORES
// ============================================================================

/// Scores are reals from the point of view of the side being scored.
pub type Score = f64;

/// Magnitude of a checkmate delivered at the root; a mate found `n` plies
/// below the root scores `CHECKMATE_SCORE - n`.
pub const CHECKMATE_SCORE: Score = 1_000_000.0;

/// Any score at least this large in magnitude is a forced mate.
pub const MATE_THRESHOLD: Score = CHECKMATE_SCORE - 10_000.0;

/// Score of the side to move when it is checkmated `depth` plies below the
/// root. Shallower mates are larger in magnitude.
#[inline(always)]
pub fn mated_score(depth: u32) -> Score {
    -(CHECKMATE_SCORE - depth as Score)
}

#[inline(always)]
pub fn is_mate_score(score: Score) -> bool {
    score.abs() >= MATE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_is_an_involution() {
        assert_eq!(Side::First.flip(), Side::Second);
        assert_eq!(Side::Second.flip().flip(), Side::Second);
    }

    #[test]
    fn test_shallower_mates_score_higher() {
        assert!(mated_score(1).abs() > mated_score(3).abs());
        assert!(is_mate_score(-mated_score(40)));
        assert!(!is_mate_score(900.0));
    }
}
