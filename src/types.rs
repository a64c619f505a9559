//! Core types for scrypt mining
//!
//! Values shared between the stratum session and the proof-of-work engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Proof-of-work nonce (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Nonce(pub u32);

impl Nonce {
    /// Create a new nonce
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Convert to bytes (little-endian)
    pub fn to_bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Next nonce, or `None` once the 32-bit space is used up
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

/// Decimal, as submitted to the pool
impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One hash attempt: a job header paired with a nonce
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    header: &'a [u8],
    nonce: Nonce,
}

impl<'a> Candidate<'a> {
    pub fn new(header: &'a [u8], nonce: Nonce) -> Self {
        Self { header, nonce }
    }

    /// Write `header ‖ nonce_le` into `buf`, reusing its allocation
    pub fn write_message(&self, buf: &mut Vec<u8>) {
        buf.clear();
        buf.extend_from_slice(self.header);
        buf.extend_from_slice(&self.nonce.to_bytes());
    }

    /// Owned `header ‖ nonce_le`
    pub fn message(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.header.len() + 4);
        self.write_message(&mut buf);
        buf
    }
}

/// A winning nonce for a job, sent to the pool once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub job_id: String,
    pub nonce: Nonce,
}

impl SubmissionResult {
    pub fn new(job_id: impl Into<String>, nonce: Nonce) -> Self {
        Self {
            job_id: job_id.into(),
            nonce,
        }
    }
}

/// Per-connection job generation counter
///
/// Every notify advances the counter. A search remembers the generation it
/// was launched for; once the counter moves on, that search is stale.
#[derive(Debug, Clone, Default)]
pub struct JobGeneration(Arc<AtomicU64>);

impl JobGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to a new generation and return it
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}
