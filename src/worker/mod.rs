//! Mining worker implementations
//!
//! The scrypt nonce-search engine plus the statistics it reports while
//! searching.

use std::time::Duration;
use tracing::Span;

pub mod search;

pub use search::ScryptWorker;

/// Default number of hash attempts between statistics reports
pub const DEFAULT_REPORT_INTERVAL: u64 = 1000;

/// Mining statistics for a single search
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Job being searched
    pub job_id: String,
    /// Total hashes computed
    pub total_hashes: u64,
    /// Time spent searching
    pub elapsed: Duration,
    /// Current hash rate (hashes per second)
    pub current_hash_rate: f64,
}

impl MiningStats {
    /// Update hash rate calculations
    pub fn update(&mut self, total_hashes: u64, elapsed: Duration) {
        self.total_hashes = total_hashes;
        self.elapsed = elapsed;
        self.current_hash_rate = compute_hash_rate(total_hashes, elapsed);
    }
}

/// Utility function to compute hash rate over a time period
pub fn compute_hash_rate(hashes: u64, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        hashes as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}

/// Create a tracing span for a search
pub fn mining_span(job_id: &str, generation: u64) -> Span {
    tracing::info_span!("mining", job_id = job_id, generation = generation)
}
