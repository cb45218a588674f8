pub mod alphabeta;
pub mod bound;
pub mod deepening;
pub mod memo;
pub mod outcome;
pub mod parallel;
pub mod params;
pub mod termination;

#[cfg(test)]
pub(crate) mod testkit;

pub use alphabeta::*;
pub use bound::*;
pub use deepening::*;
pub use memo::*;
pub use outcome::*;
pub use parallel::*;
pub use params::*;
pub use termination::*;

use crate::{
    error::SearchError,
    game::{Evaluator, MoveSource, Position},
    time_control::TimeLimit,
    tpt::SearchCache,
    types::Side,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

pub type SearchResult<M> = Result<SearchOutcome<M>, SearchError>;

// ============================================================================
//  SEARCHER
// ============================================================================

/// Anything that can answer "what is the best move for `side` here".
///
/// Searchers recurse through a *continuation*: by default a searcher calls
/// itself for child positions, but a decorator can install itself with
/// `set_continuation` so that every ply goes through it.
pub trait Searcher<P: Position>: Send + Sync {
    /// Searches `pos` for `side`, `depth` plies below the root, within `bound`.
    fn search(&self, pos: &P, side: Side, depth: u32, bound: ScoreBound) -> SearchResult<P::Move>;

    /// Redirects recursive calls. Held weakly; once the target is dropped the
    /// searcher recurses into itself again.
    fn set_continuation(&self, continuation: Weak<dyn Searcher<P>>);

    fn set_termination(&self, policy: Arc<dyn TerminationPolicy>);

    fn termination(&self) -> Arc<dyn TerminationPolicy>;
}

// ============================================================================
//  STATS
// ============================================================================

/// Node counters, updated with relaxed atomics so they can be shared by the
/// threads of a parallel search.
#[derive(Debug, Default)]
pub struct SearchStats {
    nodes: AtomicU64,
    leaves: AtomicU64,
    cutoffs: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub nodes: u64,
    pub leaves: u64,
    pub cutoffs: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub(crate) fn count_node(&self) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn count_leaf(&self) {
        self.leaves.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn count_cutoff(&self) {
        self.cutoffs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            nodes: self.nodes.load(Ordering::Relaxed),
            leaves: self.leaves.load(Ordering::Relaxed),
            cutoffs: self.cutoffs.load(Ordering::Relaxed),
        }
    }

    /// Adds another searcher's counts, e.g. a finished worker's.
    pub(crate) fn absorb(&self, other: StatsSnapshot) {
        self.nodes.fetch_add(other.nodes, Ordering::Relaxed);
        self.leaves.fetch_add(other.leaves, Ordering::Relaxed);
        self.cutoffs.fetch_add(other.cutoffs, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.nodes.store(0, Ordering::Relaxed);
        self.leaves.store(0, Ordering::Relaxed);
        self.cutoffs.store(0, Ordering::Relaxed);
    }
}

// ============================================================================
//  MAIN SEARCH ENTRY POINT
// ============================================================================

/// Searches `pos` for `side` with the budget described by `config`: a depth
/// cap, an optional move time, and `config.threads` workers sharing `cache`.
pub fn search<P, G, E>(
    pos: &P,
    side: Side,
    moves: Arc<G>,
    evaluator: Arc<E>,
    cache: Arc<SearchCache<P>>,
    config: &SearchConfig,
) -> SearchResult<P::Move>
where
    P: Position,
    G: MoveSource<P> + 'static,
    E: Evaluator<P> + 'static,
{
    let budget: Arc<dyn TerminationPolicy> = match config.move_time {
        Some(limit) => Arc::new(
            AnyOf::default()
                .with(Arc::new(TimeLimit::new(limit)))
                .with(Arc::new(DepthLimit::new(config.max_depth))),
        ),
        None => Arc::new(DepthLimit::new(config.max_depth)),
    };

    let coordinator = ParallelSearch::new(moves, evaluator, cache, budget)
        .with_concurrency(config.threads)
        .with_max_depth(config.max_depth);

    coordinator.search(pos, side, 0, ScoreBound::full())
}

// ============================================================================
//  TESTS
// ============================================================================
