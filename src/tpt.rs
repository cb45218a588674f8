use crate::game::Position;
use crate::search::{ScoreBound, SearchResult};
use crate::types::Side;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Conditions a result was computed under. A stored result only answers a
/// request made under the same conditions.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SearchContext {
    pub depth: u32,
    pub bound: ScoreBound,
    /// Depth cap of the termination policy in force, if it had one.
    pub horizon: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct CacheEntry<M> {
    pub context: SearchContext,
    pub result: SearchResult<M>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

type Slot<M> = [Option<CacheEntry<M>>; 2];

/// Both sides' entries for one position, stamped with the search that last
/// wrote them.
struct Bucket<M> {
    generation: u32,
    slots: Slot<M>,
}

struct Table<K, M> {
    buckets: HashMap<K, Bucket<M>>,
    generation: u32,
    /// Buckets written during the current generation.
    fresh: usize,
}

/// Memo table shared by every searcher of a search, and across searches.
///
/// Keyed by position key, with one slot per side to move. Whole results are
/// stored, terminal outcomes included. Access is serialized by a mutex; the
/// last store for a slot wins.
///
/// A bounded table that is full makes room by evicting every position left
/// over from earlier searches (see `new_search`). Only when all stored
/// positions belong to the current search is a new position turned away.
pub struct SearchCache<P: Position> {
    table: Mutex<Table<P::Key, P::Move>>,
    capacity: Option<usize>,
    probes: AtomicU64,
    hits: AtomicU64,
    stores: AtomicU64,
}

impl<P: Position> SearchCache<P> {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A table holding at most `positions` keys.
    pub fn with_capacity(positions: usize) -> Self {
        Self::build(Some(positions.max(1)))
    }

    /// Sized from a memory budget, the way the `Hash` option is expressed.
    pub fn new_mb(mb: usize) -> Self {
        let slot_size = std::mem::size_of::<P::Key>() + std::mem::size_of::<Bucket<P::Move>>();
        Self::with_capacity(mb * 1024 * 1024 / slot_size.max(1))
    }

    fn build(capacity: Option<usize>) -> Self {
        SearchCache {
            table: Mutex::new(Table {
                buckets: HashMap::new(),
                generation: 0,
                fresh: 0,
            }),
            capacity,
            probes: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            stores: AtomicU64::new(0),
        }
    }

    /// Starts a new generation. Call once per root search; entries written
    /// before the call become the first to go when the table is full.
    pub fn new_search(&self) {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.generation = table.generation.wrapping_add(1);
        table.fresh = 0;
    }

    pub fn generation(&self) -> u32 {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).generation
    }

    pub fn lookup(&self, key: &P::Key, side: Side, context: &SearchContext) -> Option<SearchResult<P::Move>> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());

        let entry = table.buckets.get(key)?.slots[side as usize].as_ref()?;
        if entry.context != *context {
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.result.clone())
    }

    pub fn store(&self, key: P::Key, side: Side, context: SearchContext, result: SearchResult<P::Move>) {
        let mut guard = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let table = &mut *guard;
        let generation = table.generation;

        if let Some(bucket) = table.buckets.get_mut(&key) {
            if bucket.generation != generation {
                bucket.generation = generation;
                table.fresh += 1;
            }
            bucket.slots[side as usize] = Some(CacheEntry { context, result });
            self.stores.fetch_add(1, Ordering::Relaxed);
            return;
        }

        if let Some(limit) = self.capacity {
            if table.buckets.len() >= limit {
                if table.fresh >= table.buckets.len() {
                    return;
                }
                table.buckets.retain(|_, bucket| bucket.generation == generation);
                debug!("cache full, evicted stale positions, {} remain", table.buckets.len());
            }
        }

        let mut slots = [None, None];
        slots[side as usize] = Some(CacheEntry { context, result });
        table.buckets.insert(key, Bucket { generation, slots });
        table.fresh += 1;
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of positions with at least one stored side.
    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.buckets.clear();
        table.generation = 0;
        table.fresh = 0;
        drop(table);
        self.probes.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.stores.store(0, Ordering::Relaxed);
    }

    /// Fill level in permill; 0 for unbounded tables.
    pub fn hashfull(&self) -> usize {
        match self.capacity {
            Some(limit) if limit > 0 => (self.len() * 1000 / limit).min(1000),
            _ => 0,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            probes: self.probes.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
        }
    }
}

impl<P: Position> Default for SearchCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::search::testkit::TreePos;
    use crate::search::SearchOutcome;

    fn context(depth: u32) -> SearchContext {
        SearchContext {
            depth,
            bound: ScoreBound::full(),
            horizon: Some(4),
        }
    }

    #[test]
    fn test_hit_requires_matching_context() {
        let cache: SearchCache<TreePos> = SearchCache::new();
        let outcome = SearchOutcome {
            best_move: Some(3),
            score: 1.5,
            quality: 1.0,
        };
        cache.store(7, Side::First, context(2), Ok(outcome.clone()));

        assert_eq!(cache.lookup(&7, Side::First, &context(2)), Some(Ok(outcome)));
        assert_eq!(cache.lookup(&7, Side::Second, &context(2)), None);
        assert_eq!(cache.lookup(&7, Side::First, &context(3)), None);

        let narrowed = SearchContext {
            bound: ScoreBound::new(0.0, 1.0),
            ..context(2)
        };
        assert_eq!(cache.lookup(&7, Side::First, &narrowed), None);

        let uncapped = SearchContext {
            horizon: None,
            ..context(2)
        };
        assert_eq!(cache.lookup(&7, Side::First, &uncapped), None);

        assert_eq!(
            cache.stats(),
            CacheStats {
                probes: 5,
                hits: 1,
                stores: 1
            }
        );
    }

    #[test]
    fn test_terminal_results_are_memoized_and_overwritten() {
        let cache: SearchCache<TreePos> = SearchCache::new();
        cache.store(1, Side::Second, context(1), Err(SearchError::Draw));
        assert_eq!(cache.lookup(&1, Side::Second, &context(1)), Some(Err(SearchError::Draw)));

        cache.store(1, Side::Second, context(1), Err(SearchError::checkmate_at(1)));
        assert_eq!(
            cache.lookup(&1, Side::Second, &context(1)),
            Some(Err(SearchError::checkmate_at(1)))
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_and_clear() {
        let cache: SearchCache<TreePos> = SearchCache::with_capacity(2);
        cache.store(1, Side::First, context(0), Err(SearchError::Draw));
        cache.store(2, Side::First, context(0), Err(SearchError::Draw));
        cache.store(3, Side::First, context(0), Err(SearchError::Draw));
        cache.store(1, Side::Second, context(0), Err(SearchError::Draw));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.hashfull(), 1000);
        assert_eq!(cache.lookup(&3, Side::First, &context(0)), None);
        assert!(cache.lookup(&1, Side::Second, &context(0)).is_some());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_full_table_admits_positions_from_a_new_search() {
        let cache: SearchCache<TreePos> = SearchCache::with_capacity(3);
        for key in 1..=3 {
            cache.store(key, Side::First, context(2), Err(SearchError::Draw));
        }
        cache.store(4, Side::First, context(2), Err(SearchError::Draw));
        assert_eq!(cache.lookup(&4, Side::First, &context(2)), None);

        cache.new_search();
        assert_eq!(cache.generation(), 1);
        // Rewriting a position carries it into the new search.
        cache.store(2, Side::Second, context(2), Err(SearchError::Draw));
        cache.store(4, Side::First, context(2), Err(SearchError::Draw));
        cache.store(5, Side::First, context(2), Err(SearchError::Draw));

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.lookup(&4, Side::First, &context(2)), Some(Err(SearchError::Draw)));
        assert_eq!(cache.lookup(&5, Side::First, &context(2)), Some(Err(SearchError::Draw)));
        assert!(cache.lookup(&2, Side::First, &context(2)).is_some());
        assert_eq!(cache.lookup(&1, Side::First, &context(2)), None);
        assert_eq!(cache.lookup(&3, Side::First, &context(2)), None);

        // Every stored position now belongs to this search.
        cache.store(6, Side::First, context(2), Err(SearchError::Draw));
        assert_eq!(cache.lookup(&6, Side::First, &context(2)), None);

        cache.clear();
        assert_eq!(cache.generation(), 0);
    }
}
