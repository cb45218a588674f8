use super::{ScoreBound, SearchResult, Searcher, TerminationPolicy};
use crate::game::Position;
use crate::tpt::{SearchCache, SearchContext};
use crate::types::Side;
use std::sync::{Arc, Weak};

/// Caching decorator. Wraps a searcher and answers repeated
/// (position, side, context) requests from a shared `SearchCache`.
///
/// On construction it becomes the inner searcher's continuation, so every
/// ply of the inner search is memoized, not just the root.
pub struct Memoized<P: Position> {
    inner: Arc<dyn Searcher<P>>,
    cache: Arc<SearchCache<P>>,
}

impl<P: Position> Memoized<P> {
    pub fn new(inner: Arc<dyn Searcher<P>>, cache: Arc<SearchCache<P>>) -> Arc<Self> {
        let memo = Arc::new(Memoized { inner, cache });
        let weak = Arc::downgrade(&memo) as Weak<dyn Searcher<P>>;
        memo.inner.set_continuation(weak);
        memo
    }

    pub fn cache(&self) -> &Arc<SearchCache<P>> {
        &self.cache
    }
}

impl<P: Position> Searcher<P> for Memoized<P> {
    fn search(&self, pos: &P, side: Side, depth: u32, bound: ScoreBound) -> SearchResult<P::Move> {
        let termination = self.inner.termination();
        let context = SearchContext {
            depth,
            bound,
            horizon: termination.horizon(),
        };
        let key = pos.canonical_key();

        if let Some(hit) = self.cache.lookup(&key, side, &context) {
            return hit;
        }

        let result = self.inner.search(pos, side, depth, bound);

        // A result cut short by the clock or a stop flag is not reproducible.
        if !termination.is_interrupted() {
            self.cache.store(key, side, context, result.clone());
        }
        result
    }

    /// Forwarded: the decorator itself has no recursion of its own.
    fn set_continuation(&self, continuation: Weak<dyn Searcher<P>>) {
        self.inner.set_continuation(continuation);
    }

    fn set_termination(&self, policy: Arc<dyn TerminationPolicy>) {
        self.inner.set_termination(policy);
    }

    fn termination(&self) -> Arc<dyn TerminationPolicy> {
        self.inner.termination()
    }
}
