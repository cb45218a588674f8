use crate::search::termination::{clamp_progress, TerminationPolicy};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
//  CLOCKS
// ============================================================================

/// Source of the current time, injectable so time budgets can be tested
/// without sleeping.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline(always)]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            base: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_nanos(self.offset_nanos.load(Ordering::Relaxed))
    }
}

// ============================================================================
//  TIME LIMIT
// ============================================================================

/// Wall-clock budget measured from construction.
#[derive(Debug, Clone)]
pub struct TimeLimit {
    clock: Arc<dyn Clock>,
    start_time: Instant,
    allocated_time: Duration,
}

impl TimeLimit {
    pub fn new(allocated: Duration) -> Self {
        Self::with_clock(allocated, Arc::new(SystemClock))
    }

    pub fn from_millis(allocated_ms: u64) -> Self {
        Self::new(Duration::from_millis(allocated_ms))
    }

    pub fn with_clock(allocated: Duration, clock: Arc<dyn Clock>) -> Self {
        TimeLimit {
            start_time: clock.now(),
            clock,
            allocated_time: allocated,
        }
    }

    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start_time)
    }

    pub fn allocated(&self) -> Duration {
        self.allocated_time
    }
}

impl TerminationPolicy for TimeLimit {
    #[inline(always)]
    fn is_terminated(&self, _depth: u32) -> bool {
        self.elapsed() >= self.allocated_time
    }

    fn search_progress(&self, _depth: u32) -> f64 {
        let elapsed = self.elapsed();
        if self.allocated_time.is_zero() {
            return 1.0;
        }
        clamp_progress(elapsed.as_secs_f64() / self.allocated_time.as_secs_f64())
    }
}

// ============================================================================
//  ALLOCATION
// ============================================================================

/// Time to spend on one move given the clock situation reported by a `go`
/// command, in milliseconds.
pub fn calculate_time_allocation(our_time: u64, our_inc: u64, moves_to_go: Option<u32>) -> u64 {
    if let Some(mtg) = moves_to_go {
        let base = our_time / (mtg as u64 + 1);
        return (base + our_inc).min(our_time.saturating_sub(50).max(1));
    }

    // Otherwise, assume ~40 moves left in game
    let moves_left = 40;
    let allocated = our_time / moves_left + (our_inc * 3) / 4;

    // Never use more than 1/3 of remaining time
    allocated.min(our_time / 3).max(1)
}
