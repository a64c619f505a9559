//! Scrypt nonce search
//!
//! Walks the 32-bit nonce space from zero, hashing `header ‖ nonce_le` for
//! each candidate until one meets the target. The loop is blocking and is
//! meant to run on a blocking thread; it checks its cancellation token
//! before every hash.

use super::{MiningStats, DEFAULT_REPORT_INTERVAL};
use crate::crypto::{meets_target, PowHasher, ScryptHasher};
use crate::utils::format_hash_rate;
use crate::{Candidate, Error, Nonce, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Single-threaded proof-of-work search engine
pub struct ScryptWorker<H: PowHasher = ScryptHasher> {
    hasher: Arc<H>,
    report_interval: u64,
}

impl<H: PowHasher> Clone for ScryptWorker<H> {
    fn clone(&self) -> Self {
        Self {
            hasher: Arc::clone(&self.hasher),
            report_interval: self.report_interval,
        }
    }
}

impl<H: PowHasher> ScryptWorker<H> {
    /// Create a new worker around a hasher
    pub fn new(hasher: Arc<H>) -> Self {
        Self {
            hasher,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    /// Set how many hashes pass between statistics reports
    pub fn with_report_interval(mut self, hashes: u64) -> Self {
        self.report_interval = hashes.max(1);
        self
    }

    pub fn report_interval(&self) -> u64 {
        self.report_interval
    }

    /// Search the whole nonce space for `header`
    pub fn search(
        &self,
        job_id: &str,
        header: &[u8],
        cancellation: &CancellationToken,
        stats_tx: Option<&mpsc::UnboundedSender<MiningStats>>,
    ) -> Result<Nonce> {
        self.search_from(job_id, header, Nonce::new(0), cancellation, stats_tx)
    }

    /// Search from `start` up to and including `u32::MAX`
    pub fn search_from(
        &self,
        job_id: &str,
        header: &[u8],
        start: Nonce,
        cancellation: &CancellationToken,
        stats_tx: Option<&mpsc::UnboundedSender<MiningStats>>,
    ) -> Result<Nonce> {
        debug!(start = %start, header_len = header.len(), "Trying nonces");

        let started = Instant::now();
        let mut stats = MiningStats {
            job_id: job_id.to_string(),
            ..MiningStats::default()
        };
        let mut message = Vec::with_capacity(header.len() + 4);
        let mut nonce = start;
        let mut hashes = 0u64;

        loop {
            if cancellation.is_cancelled() {
                debug!(hashes, "Search cancelled");
                return Err(Error::cancelled(format!("search for job {}", job_id)));
            }

            Candidate::new(header, nonce).write_message(&mut message);
            let hash = self.hasher.hash(&message)?;
            hashes += 1;

            if meets_target(&hash) {
                info!(
                    nonce = %nonce,
                    hashes,
                    elapsed = ?started.elapsed(),
                    "Nonce found"
                );
                return Ok(nonce);
            }

            if hashes % self.report_interval == 0 {
                stats.update(hashes, started.elapsed());
                debug!(
                    "Current hash rate: {}, total hashes: {}",
                    format_hash_rate(stats.current_hash_rate),
                    hashes
                );
                if let Some(tx) = stats_tx {
                    // Telemetry is best effort
                    let _ = tx.send(stats.clone());
                }
            }

            nonce = match nonce.next() {
                Some(next) => next,
                None => {
                    warn!(hashes, "Nonce space exhausted for job {}", job_id);
                    return Err(Error::NonceSpaceExhausted);
                }
            };
        }
    }
}
