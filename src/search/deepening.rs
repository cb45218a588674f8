use super::params::MAX_PLY;
use super::{AnyOf, DepthLimit, ScoreBound, SearchOutcome, SearchResult, Searcher, TerminationPolicy};
use crate::game::Position;
use crate::types::{is_mate_score, Score, Side};
use log::debug;
use std::sync::{Arc, RwLock, Weak};

/// Summary of one finished deepening iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationReport<M> {
    pub depth: u32,
    pub score: Score,
    pub best_move: Option<M>,
    pub quality: f64,
}

pub type IterationReporter<M> = Arc<dyn Fn(&IterationReport<M>) + Send + Sync>;

// ============================================================================
//  ITERATIVE DEEPENING
// ============================================================================

/// Drives an inner searcher one ply deeper per iteration until the caller's
/// policy fires, the caller's horizon is reached, or a forced mate is found.
///
/// The inner searcher's termination is owned by the driver for the duration
/// of a call: iteration `n` runs under `AnyOf[caller, DepthLimit(depth + n)]`.
/// An iteration the caller's policy cut short is discarded when an earlier
/// one completed.
pub struct IterativeDeepening<P: Position> {
    inner: Arc<dyn Searcher<P>>,
    policy: RwLock<Arc<dyn TerminationPolicy>>,
    max_depth: u32,
    reporter: Option<IterationReporter<P::Move>>,
}

impl<P: Position> IterativeDeepening<P> {
    pub fn new(inner: Arc<dyn Searcher<P>>, policy: Arc<dyn TerminationPolicy>) -> Self {
        IterativeDeepening {
            inner,
            policy: RwLock::new(policy),
            max_depth: MAX_PLY,
            reporter: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_reporter(mut self, reporter: IterationReporter<P::Move>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Number of iterations a search starting `depth` plies below the root
    /// may run under `caller`.
    fn iterations(&self, caller: &dyn TerminationPolicy, depth: u32) -> u32 {
        let horizon = caller
            .horizon()
            .map_or(self.max_depth, |h| h.saturating_sub(depth));
        self.max_depth.min(horizon).max(1)
    }

    fn report(&self, report: &IterationReport<P::Move>) {
        debug!(
            "iteration {}: score {} best {:?} quality {:.3}",
            report.depth, report.score, report.best_move, report.quality
        );
        if let Some(reporter) = &self.reporter {
            reporter(report);
        }
    }

    fn deepen(
        &self,
        caller: &Arc<dyn TerminationPolicy>,
        pos: &P,
        side: Side,
        depth: u32,
        bound: ScoreBound,
    ) -> SearchResult<P::Move> {
        let iterations = self.iterations(caller.as_ref(), depth);
        let mut best: Option<SearchOutcome<P::Move>> = None;
        let mut completed = 0;

        for n in 1..=iterations {
            if n > 1 && caller.is_terminated(depth) {
                break;
            }

            let limited = AnyOf::default()
                .with(caller.clone())
                .with(Arc::new(DepthLimit::new(depth + n)));
            self.inner.set_termination(Arc::new(limited));

            // Terminal outcomes at the root do not depend on depth.
            let outcome = self.inner.search(pos, side, depth, bound)?;

            let complete = !caller.is_terminated(depth);
            if !complete && best.is_some() {
                debug!("iteration {n} cut short, keeping iteration {completed}");
                break;
            }

            let mate = complete && is_mate_score(outcome.score);
            let quality = if mate {
                1.0
            } else if complete {
                completed = n;
                n as f64 / iterations as f64
            } else {
                outcome.quality / iterations as f64
            };

            let outcome = SearchOutcome { quality, ..outcome };
            if complete {
                self.report(&IterationReport {
                    depth: n,
                    score: outcome.score,
                    best_move: outcome.best_move.clone(),
                    quality,
                });
            } else {
                debug!("iteration {n} cut short with nothing to fall back on");
            }
            best = Some(outcome);

            if mate || !complete {
                break;
            }
        }

        // The loop body runs at least once.
        Ok(best.unwrap_or_default())
    }
}

impl<P: Position> Searcher<P> for IterativeDeepening<P> {
    fn search(&self, pos: &P, side: Side, depth: u32, bound: ScoreBound) -> SearchResult<P::Move> {
        let caller = self.termination();
        let result = self.deepen(&caller, pos, side, depth, bound);
        self.inner.set_termination(caller);
        result
    }

    /// The driver only ever calls its inner searcher at the root, so there
    /// is nothing to redirect.
    fn set_continuation(&self, _continuation: Weak<dyn Searcher<P>>) {}

    fn set_termination(&self, policy: Arc<dyn TerminationPolicy>) {
        *self.policy.write().unwrap_or_else(|e| e.into_inner()) = policy;
    }

    fn termination(&self) -> Arc<dyn TerminationPolicy> {
        self.policy.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
