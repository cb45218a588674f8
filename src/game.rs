//! Collaborator contracts. The search core never looks inside a position or a
//! move; it only goes through these traits.

use crate::error::SearchError;
use crate::types::{Score, Side};
use std::fmt::Debug;
use std::hash::Hash;

/// An immutable game position.
pub trait Position: Clone + Send + Sync + 'static {
    type Move: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Canonical identity used for cache keys: two positions with equal keys
    /// must be interchangeable for search purposes.
    type Key: Hash + Eq + Clone + Debug + Send + Sync + 'static;

    /// Returns the position after `mv`. Must not mutate `self`.
    fn apply_move(&self, mv: &Self::Move) -> Self;

    fn canonical_key(&self) -> Self::Key;
}

/// Enumerates moves and is the sole authority on legality.
pub trait MoveSource<P: Position>: Send + Sync {
    /// Moves available to `side` in generator order, or
    /// `SearchError::IllegalKingCapture` when `side` can capture the opposing
    /// king (the position could not have arisen with `side` to move). No other
    /// error may be returned.
    fn moves_for_side(&self, pos: &P, side: Side) -> Result<Vec<P::Move>, SearchError>;
}

/// Static scorer. Must be symmetric: `evaluate(p, s) == -evaluate(p, s.flip())`.
pub trait Evaluator<P: Position>: Send + Sync {
    fn evaluate(&self, pos: &P, side: Side) -> Score;
}
