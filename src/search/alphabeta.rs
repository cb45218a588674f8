use super::{ScoreBound, SearchOutcome, SearchResult, SearchStats, Searcher, TerminationPolicy};
use crate::error::SearchError;
use crate::game::{Evaluator, MoveSource, Position};
use crate::types::{Score, Side};
use log::trace;
use std::sync::{Arc, RwLock, Weak};

// ============================================================================
//  NEGAMAX WITH ALPHA-BETA
// ============================================================================

/// Plain negamax with fail-hard alpha-beta cutoffs.
///
/// Moves are searched in generator order. Every child is searched through the
/// continuation slot, which points back at this searcher until a decorator
/// installs itself.
pub struct AlphaBeta<P: Position, G, E> {
    moves: Arc<G>,
    evaluator: Arc<E>,
    termination: RwLock<Arc<dyn TerminationPolicy>>,
    continuation: RwLock<Option<Weak<dyn Searcher<P>>>>,
    stats: SearchStats,
}

impl<P, G, E> AlphaBeta<P, G, E>
where
    P: Position,
    G: MoveSource<P>,
    E: Evaluator<P>,
{
    pub fn new(moves: Arc<G>, evaluator: Arc<E>, termination: Arc<dyn TerminationPolicy>) -> Self {
        AlphaBeta {
            moves,
            evaluator,
            termination: RwLock::new(termination),
            continuation: RwLock::new(None),
            stats: SearchStats::new(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn continuation(&self) -> Option<Arc<dyn Searcher<P>>> {
        self.continuation
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .and_then(Weak::upgrade)
    }

    /// Score a child result contributes from the child's point of view, or
    /// `None` when the move into it was illegal.
    #[inline(always)]
    fn child_score(result: SearchResult<P::Move>) -> Option<(Score, f64)> {
        match result {
            Ok(outcome) => Some((outcome.score, outcome.quality)),
            Err(SearchError::IllegalKingCapture) => None,
            Err(terminal) => terminal.score().map(|score| (score, 1.0)),
        }
    }

    /// Called once no move survived: mate if the opponent could take our king
    /// right now, stalemate otherwise.
    fn classify_dead_end(&self, pos: &P, side: Side, depth: u32) -> SearchError {
        match self.moves.moves_for_side(pos, side.flip()) {
            Err(SearchError::IllegalKingCapture) => SearchError::checkmate_at(depth),
            _ => SearchError::Draw,
        }
    }
}

impl<P, G, E> Searcher<P> for AlphaBeta<P, G, E>
where
    P: Position,
    G: MoveSource<P>,
    E: Evaluator<P>,
{
    fn search(&self, pos: &P, side: Side, depth: u32, mut bound: ScoreBound) -> SearchResult<P::Move> {
        self.stats.count_node();

        // Must run before the leaf shortcut: an illegal position is never scored.
        let moves = self.moves.moves_for_side(pos, side)?;

        let termination = self.termination();
        if termination.is_terminated(depth) {
            self.stats.count_leaf();
            return Ok(SearchOutcome::leaf(
                self.evaluator.evaluate(pos, side),
                termination.search_progress(depth),
            ));
        }

        let next = self.continuation();
        let mut best = SearchOutcome::new();

        for mv in moves {
            let child = pos.apply_move(&mv);
            let child_bound = bound.next();
            let result = match &next {
                Some(searcher) => searcher.search(&child, side.flip(), depth + 1, child_bound),
                None => self.search(&child, side.flip(), depth + 1, child_bound),
            };

            let Some((child_score, quality)) = Self::child_score(result) else {
                continue;
            };

            let score = -child_score;
            best.update(mv.clone(), score, quality);

            if bound.update(score) {
                self.stats.count_cutoff();
                trace!("cutoff at depth {depth} by {mv:?} ({score} >= {})", bound.beta);
                return Ok(best);
            }
        }

        if best.is_set() {
            return Ok(best);
        }

        Err(self.classify_dead_end(pos, side, depth))
    }

    fn set_continuation(&self, continuation: Weak<dyn Searcher<P>>) {
        *self.continuation.write().unwrap_or_else(|e| e.into_inner()) = Some(continuation);
    }

    fn set_termination(&self, policy: Arc<dyn TerminationPolicy>) {
        *self.termination.write().unwrap_or_else(|e| e.into_inner()) = policy;
    }

    fn termination(&self) -> Arc<dyn TerminationPolicy> {
        self.termination.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

// ============================================================================
//  TESTS
// ============================================================================
