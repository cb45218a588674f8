use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Decides when the search stops descending and how far along it is.
///
/// Policies are polled from every node of every in-flight search, possibly
/// from many threads at once, so implementations must be cheap and
/// lock-free.
pub trait TerminationPolicy: Send + Sync + Debug {
    /// Whether a node `depth` plies below the root should be scored as a leaf.
    fn is_terminated(&self, depth: u32) -> bool;

    /// Fraction of the budget used, in `[0, 1]`.
    fn search_progress(&self, depth: u32) -> f64;

    /// The ply depth this policy caps the search at, if any.
    fn horizon(&self) -> Option<u32> {
        None
    }

    /// Whether the budget has run out regardless of depth, e.g. the clock
    /// expired or a stop was requested. Results finished after this point
    /// may be truncated.
    fn is_interrupted(&self) -> bool {
        self.is_terminated(0)
    }
}

#[inline(always)]
pub(crate) fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

// ============================================================================
//  DEPTH LIMIT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLimit {
    max_depth: u32,
}

impl DepthLimit {
    pub const fn new(max_depth: u32) -> Self {
        DepthLimit { max_depth }
    }

    pub const fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

impl TerminationPolicy for DepthLimit {
    #[inline(always)]
    fn is_terminated(&self, depth: u32) -> bool {
        depth >= self.max_depth
    }

    fn search_progress(&self, depth: u32) -> f64 {
        if self.max_depth == 0 {
            return 1.0;
        }
        clamp_progress(depth as f64 / self.max_depth as f64)
    }

    fn horizon(&self) -> Option<u32> {
        Some(self.max_depth)
    }

    /// A depth cap never cuts a search short, even at zero.
    fn is_interrupted(&self) -> bool {
        false
    }
}

// ============================================================================
//  MANUAL STOP
// ============================================================================

/// A shared stop flag. Cloning shares the flag; once raised it stays raised.
#[derive(Debug, Clone, Default)]
pub struct ManualStop {
    flag: Arc<AtomicBool>,
}

impl ManualStop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing flag, e.g. one owned by a front end.
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        ManualStop { flag }
    }

    #[inline(always)]
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl TerminationPolicy for ManualStop {
    #[inline(always)]
    fn is_terminated(&self, _depth: u32) -> bool {
        self.is_stopped()
    }

    fn search_progress(&self, _depth: u32) -> f64 {
        if self.is_stopped() {
            1.0
        } else {
            0.0
        }
    }
}

// ============================================================================
//  GROUP
// ============================================================================

/// Logical OR of several policies.
#[derive(Debug, Clone, Default)]
pub struct AnyOf {
    policies: Vec<Arc<dyn TerminationPolicy>>,
}

impl AnyOf {
    pub fn new(policies: Vec<Arc<dyn TerminationPolicy>>) -> Self {
        AnyOf { policies }
    }

    pub fn with(mut self, policy: Arc<dyn TerminationPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn policies(&self) -> &[Arc<dyn TerminationPolicy>] {
        &self.policies
    }
}

impl TerminationPolicy for AnyOf {
    fn is_terminated(&self, depth: u32) -> bool {
        self.policies.iter().any(|p| p.is_terminated(depth))
    }

    /// The most advanced constraint dominates.
    fn search_progress(&self, depth: u32) -> f64 {
        self.policies
            .iter()
            .map(|p| p.search_progress(depth))
            .fold(0.0, f64::max)
    }

    fn horizon(&self) -> Option<u32> {
        self.policies.iter().filter_map(|p| p.horizon()).min()
    }

    fn is_interrupted(&self) -> bool {
        self.policies.iter().any(|p| p.is_interrupted())
    }
}
