use std::time::Duration;

pub const MAX_PLY: u32 = 64;
pub const DEFAULT_DEPTH: u32 = 6;
pub const DEFAULT_THREADS: usize = 1;
pub const MAX_THREADS: usize = 256;
pub const DEFAULT_HASH_MB: usize = 16;
pub const MAX_HASH_MB: usize = 4096;

/// Runtime knobs for a search, adjusted by the front end's `setoption`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub threads: usize,
    pub max_depth: u32,
    /// Wall-clock budget for one move; `None` searches to `max_depth`.
    pub move_time: Option<Duration>,
    /// Memory budget for the shared cache, in megabytes.
    pub hash_mb: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            threads: DEFAULT_THREADS,
            max_depth: DEFAULT_DEPTH,
            move_time: None,
            hash_mb: DEFAULT_HASH_MB,
        }
    }
}
