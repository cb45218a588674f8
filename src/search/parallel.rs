use super::params::MAX_PLY;
use super::{
    AlphaBeta, AnyOf, IterationReporter, IterativeDeepening, ManualStop, Memoized, ScoreBound, SearchOutcome,
    SearchResult, SearchStats, Searcher, TerminationPolicy,
};
use crate::error::SearchError;
use crate::game::{Evaluator, MoveSource, Position};
use crate::tpt::SearchCache;
use crate::types::Side;
use log::{debug, info};
use std::fmt::Debug;
use std::sync::{Arc, RwLock, Weak};
use std::thread;

/// What one worker came back with.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerResult<M> {
    pub worker: usize,
    pub result: SearchResult<M>,
}

// ============================================================================
//  COORDINATOR
// ============================================================================

/// Runs `concurrency` independent deepening searches of the same root on OS
/// threads and merges their answers.
///
/// Every worker owns an `AlphaBeta -> Memoized -> IterativeDeepening` stack.
/// The memo table is shared, as is a per-call cancel flag that the collector
/// raises as soon as any worker finishes with a scored result.
pub struct ParallelSearch<P: Position, G, E> {
    moves: Arc<G>,
    evaluator: Arc<E>,
    cache: Arc<SearchCache<P>>,
    concurrency: usize,
    max_depth: u32,
    budget: RwLock<Arc<dyn TerminationPolicy>>,
    external_stop: Option<ManualStop>,
    reporter: Option<IterationReporter<P::Move>>,
    stats: SearchStats,
}

impl<P, G, E> ParallelSearch<P, G, E>
where
    P: Position,
    G: MoveSource<P> + 'static,
    E: Evaluator<P> + 'static,
{
    pub fn new(
        moves: Arc<G>,
        evaluator: Arc<E>,
        cache: Arc<SearchCache<P>>,
        budget: Arc<dyn TerminationPolicy>,
    ) -> Self {
        ParallelSearch {
            moves,
            evaluator,
            cache,
            concurrency: 1,
            max_depth: MAX_PLY,
            budget: RwLock::new(budget),
            external_stop: None,
            reporter: None,
            stats: SearchStats::new(),
        }
    }

    /// Worker count; zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Lets a front end abort the search from another thread.
    pub fn with_stop(mut self, stop: ManualStop) -> Self {
        self.external_stop = Some(stop);
        self
    }

    /// Called for every iteration finished by worker 0.
    pub fn with_reporter(mut self, reporter: IterationReporter<P::Move>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Totals over every worker of every search run so far.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn cache(&self) -> &Arc<SearchCache<P>> {
        &self.cache
    }

    fn worker_stack(
        &self,
        worker: usize,
        policy: Arc<dyn TerminationPolicy>,
    ) -> (IterativeDeepening<P>, Arc<AlphaBeta<P, G, E>>) {
        let engine = Arc::new(AlphaBeta::new(self.moves.clone(), self.evaluator.clone(), policy.clone()));
        let memo = Memoized::new(engine.clone(), self.cache.clone());

        let mut driver = IterativeDeepening::new(memo, policy).with_max_depth(self.max_depth);
        if worker == 0 {
            if let Some(reporter) = &self.reporter {
                driver = driver.with_reporter(reporter.clone());
            }
        }
        (driver, engine)
    }

    fn run_workers(
        &self,
        policy: Arc<dyn TerminationPolicy>,
        cancel: &ManualStop,
        pos: &P,
        side: Side,
        depth: u32,
        bound: ScoreBound,
    ) -> Vec<WorkerResult<P::Move>> {
        let workers = self.concurrency;
        let (sender, receiver) = crossbeam_channel::unbounded();

        thread::scope(|scope| {
            for worker in 0..workers {
                let sender = sender.clone();
                let policy = policy.clone();
                scope.spawn(move || {
                    let (driver, engine) = self.worker_stack(worker, policy);
                    let result = driver.search(pos, side, depth, bound);
                    self.stats.absorb(engine.stats().snapshot());
                    debug!("worker {worker} finished: {result:?}");
                    // The collector below drains until every sender is gone.
                    let _ = sender.send(WorkerResult { worker, result });
                });
            }
            drop(sender);

            let mut results = Vec::with_capacity(workers);
            for message in receiver.iter() {
                if message.result.is_ok() {
                    cancel.stop();
                }
                results.push(message);
            }
            results
        })
    }
}

impl<P, G, E> Searcher<P> for ParallelSearch<P, G, E>
where
    P: Position,
    G: MoveSource<P> + 'static,
    E: Evaluator<P> + 'static,
{
    fn search(&self, pos: &P, side: Side, depth: u32, bound: ScoreBound) -> SearchResult<P::Move> {
        let cancel = ManualStop::new();
        let mut policy = AnyOf::default()
            .with(self.termination())
            .with(Arc::new(cancel.clone()));
        if let Some(stop) = &self.external_stop {
            policy = policy.with(Arc::new(stop.clone()));
        }

        self.cache.new_search();
        info!(
            "starting parallel search with {} workers, cache generation {}",
            self.concurrency,
            self.cache.generation()
        );
        let results = self.run_workers(Arc::new(policy), &cancel, pos, side, depth, bound);
        merge_results(results)
    }

    /// Workers build their own stacks, so there is no recursion to redirect.
    fn set_continuation(&self, _continuation: Weak<dyn Searcher<P>>) {}

    fn set_termination(&self, policy: Arc<dyn TerminationPolicy>) {
        *self.budget.write().unwrap_or_else(|e| e.into_inner()) = policy;
    }

    fn termination(&self) -> Arc<dyn TerminationPolicy> {
        self.budget.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

// ============================================================================
//  MERGE
// ============================================================================

/// Combines worker answers by value, never by arrival order.
///
/// Scored outcomes win over terminal ones and are ranked by quality, then
/// score, then lowest worker index. Without any scored outcome, the shallowest
/// checkmate wins, then a draw, then the illegal-position signal.
pub fn merge_results<M: Clone + Debug>(results: Vec<WorkerResult<M>>) -> SearchResult<M> {
    let mut outcomes: Vec<(usize, SearchOutcome<M>)> = Vec::new();
    let mut mate: Option<(u32, SearchError)> = None;
    let mut draw = false;

    for WorkerResult { worker, result } in results {
        match result {
            Ok(outcome) => outcomes.push((worker, outcome)),
            Err(err @ SearchError::Checkmate { depth, .. }) => {
                if mate.map_or(true, |(shallowest, _)| depth < shallowest) {
                    mate = Some((depth, err));
                }
            }
            Err(SearchError::Draw) => draw = true,
            Err(SearchError::IllegalKingCapture) => {}
        }
    }

    let best = outcomes.into_iter().max_by(|(wa, a), (wb, b)| {
        a.quality
            .total_cmp(&b.quality)
            .then(a.score.total_cmp(&b.score))
            .then(wb.cmp(wa))
    });

    if let Some((worker, outcome)) = best {
        info!(
            "merged: worker {worker} best {:?} score {} quality {:.3}",
            outcome.best_move, outcome.score, outcome.quality
        );
        return Ok(outcome);
    }

    let terminal = match (mate, draw) {
        (Some((_, err)), _) => err,
        (None, true) => SearchError::Draw,
        (None, false) => SearchError::IllegalKingCapture,
    };
    info!("merged: no scored result, {terminal}");
    Err(terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testkit::*;
    use crate::search::{DepthLimit, IterationReport};
    use crate::types::CHECKMATE_SCORE;
    use std::sync::Mutex;

    fn coordinator(max_depth: u32, workers: usize) -> ParallelSearch<TreePos, TreeMoves, TreeEval> {
        let (moves, eval) = collaborators();
        ParallelSearch::new(moves, eval, Arc::new(SearchCache::new()), Arc::new(DepthLimit::new(max_depth)))
            .with_concurrency(workers)
    }

    fn scored(worker: usize, best_move: usize, score: f64, quality: f64) -> WorkerResult<usize> {
        WorkerResult {
            worker,
            result: Ok(SearchOutcome {
                best_move: Some(best_move),
                score,
                quality,
            }),
        }
    }

    fn failed(worker: usize, err: SearchError) -> WorkerResult<usize> {
        WorkerResult { worker, result: Err(err) }
    }

    #[test]
    fn test_workers_agree_with_single_search() {
        let tree = sample_tree();
        for depth in 1..=3 {
            let (moves, eval) = collaborators();
            let single = AlphaBeta::new(moves, eval, Arc::new(DepthLimit::new(depth)))
                .search(&tree.root(), Side::First, 0, ScoreBound::full())
                .unwrap();

            for workers in [1, 4] {
                let outcome = coordinator(depth, workers)
                    .search(&tree.root(), Side::First, 0, ScoreBound::full())
                    .unwrap();
                assert_eq!(outcome.best_move, single.best_move, "depth {depth}, {workers} workers");
                assert_eq!(outcome.score, single.score, "depth {depth}, {workers} workers");
            }
        }
    }

    #[test]
    fn test_zero_concurrency_runs_one_worker() {
        let tree = sample_tree();
        let search = coordinator(2, 0);
        let outcome = search.search(&tree.root(), Side::First, 0, ScoreBound::full()).unwrap();
        assert_eq!(outcome.best_move, Some(MOVE_A));
        assert!(search.stats().snapshot().nodes > 0);
        assert!(!search.cache().is_empty());
    }

    #[test]
    fn test_mate_through_the_full_stack() {
        let tree = mate_or_stalemate_tree();
        let outcome = coordinator(6, 3)
            .search(&tree.root(), Side::First, 0, ScoreBound::full())
            .unwrap();
        assert_eq!(outcome.best_move, Some(1));
        assert_eq!(outcome.score, CHECKMATE_SCORE - 1.0);
    }

    #[test]
    fn test_root_stalemate_is_a_draw() {
        let tree = mate_or_stalemate_tree();
        let result = coordinator(3, 2).search(&tree.at(2), Side::Second, 0, ScoreBound::full());
        assert_eq!(result, Err(SearchError::Draw));
    }

    #[test]
    fn test_external_stop_returns_without_descending() {
        let tree = sample_tree();
        let stop = ManualStop::new();
        stop.stop();
        let search = coordinator(3, 2).with_stop(stop);

        let outcome = search.search(&tree.root(), Side::First, 0, ScoreBound::full()).unwrap();
        assert_eq!(outcome.best_move, None);
        assert_eq!(search.stats().snapshot().leaves, 2);
    }

    #[test]
    fn test_reporter_sees_worker_zero_iterations() {
        let tree = sample_tree();
        let depths = Arc::new(Mutex::new(Vec::new()));
        let sink = depths.clone();
        let search = coordinator(3, 1).with_reporter(Arc::new(move |report: &IterationReport<usize>| {
            sink.lock().unwrap().push(report.depth)
        }));

        search.search(&tree.root(), Side::First, 0, ScoreBound::full()).unwrap();
        assert_eq!(*depths.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_full_cache_keeps_memoizing_across_searches() {
        let tree = sample_tree();
        let (moves, eval) = collaborators();
        let cache = Arc::new(SearchCache::with_capacity(2));
        let search = ParallelSearch::new(moves, eval, cache.clone(), Arc::new(DepthLimit::new(2)));

        search.search(&tree.root(), Side::First, 0, ScoreBound::full()).unwrap();
        assert_eq!(cache.hashfull(), 1000);
        let stores = cache.stats().stores;

        let outcome = search.search(&tree.at(MOVE_B), Side::Second, 0, ScoreBound::full()).unwrap();
        assert_eq!(outcome.best_move, Some(6));
        assert_eq!(cache.generation(), 2);
        assert!(cache.stats().stores > stores);
    }

    #[test]
    fn test_merge_ranks_quality_then_score_then_worker() {
        let merged = merge_results(vec![scored(0, 10, 50.0, 0.5), scored(1, 11, 5.0, 1.0), scored(2, 12, 9.0, 1.0)]);
        assert_eq!(merged.unwrap().best_move, Some(12));

        let tied = merge_results(vec![scored(3, 13, 9.0, 1.0), scored(1, 11, 9.0, 1.0), scored(2, 12, 9.0, 1.0)]);
        assert_eq!(tied.unwrap().best_move, Some(11));

        let mixed = merge_results(vec![
            failed(0, SearchError::checkmate_at(1)),
            scored(1, 11, -3.0, 0.1),
            failed(2, SearchError::Draw),
        ]);
        assert_eq!(mixed.unwrap().best_move, Some(11));
    }

    #[test]
    fn test_merge_terminal_priority() {
        let mates = merge_results(vec![
            failed(0, SearchError::checkmate_at(3)),
            failed(1, SearchError::Draw),
            failed(2, SearchError::checkmate_at(1)),
        ]);
        assert_eq!(mates, Err(SearchError::checkmate_at(1)));

        let draws = merge_results(vec![failed(0, SearchError::Draw), failed(1, SearchError::IllegalKingCapture)]);
        assert_eq!(draws, Err(SearchError::Draw));

        let illegal = merge_results(vec![failed(0, SearchError::IllegalKingCapture)]);
        assert_eq!(illegal, Err(SearchError::IllegalKingCapture));

        assert_eq!(merge_results::<usize>(Vec::new()), Err(SearchError::IllegalKingCapture));
    }
}
