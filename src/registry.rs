//! Miner registry
//!
//! Maps a currency symbol to the constructor of a miner implementation.
//! Lookups are case-insensitive and an unknown symbol is a configuration
//! error, so the process never starts mining with the wrong algorithm.

use crate::config::PoolConfig;
use crate::crypto::ScryptHasher;
use crate::stratum::StratumSession;
use crate::worker::{MiningStats, DEFAULT_REPORT_INTERVAL};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A mining implementation: connect once, then run until the session ends
#[async_trait]
pub trait PoolMiner: Send {
    /// Implementation name for logging
    fn name(&self) -> &'static str;

    /// Establish the pool connection
    async fn connect(&mut self) -> Result<()>;

    /// Mine until a fatal error ends the session
    async fn run(&mut self) -> Result<()>;

    /// Receive search statistics (optional)
    fn attach_stats(&mut self, _stats_tx: mpsc::UnboundedSender<MiningStats>) {}
}

/// Everything a constructor needs to build a miner
#[derive(Debug, Clone)]
pub struct MinerContext {
    pub pool: PoolConfig,
    pub report_interval: u64,
}

impl MinerContext {
    pub fn new(pool: PoolConfig) -> Self {
        Self {
            pool,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_report_interval(mut self, hashes: u64) -> Self {
        self.report_interval = hashes;
        self
    }
}

/// Constructor registered for a currency symbol
pub type MinerConstructor = fn(MinerContext) -> Result<Box<dyn PoolMiner>>;

/// Currency symbol → miner constructor
pub struct MinerRegistry {
    constructors: BTreeMap<String, MinerConstructor>,
}

impl MinerRegistry {
    /// Registry with no miners
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Registry with the built-in miners
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("ltc", scrypt_stratum_miner);
        registry
    }

    /// Register (or replace) the constructor for `symbol`
    pub fn register(&mut self, symbol: &str, constructor: MinerConstructor) {
        self.constructors.insert(normalize(symbol), constructor);
    }

    /// Registered symbols in sorted order
    pub fn symbols(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.constructors.contains_key(&normalize(symbol))
    }

    /// Build the miner for `symbol`
    pub fn create(&self, symbol: &str, context: MinerContext) -> Result<Box<dyn PoolMiner>> {
        let constructor = self.constructors.get(&normalize(symbol)).ok_or_else(|| {
            Error::config(format!(
                "Miner for {} not found (supported: {})",
                symbol,
                self.symbols().join(", ")
            ))
        })?;
        constructor(context)
    }
}

impl Default for MinerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_lowercase()
}

/// Scrypt proof of work over a stratum session
fn scrypt_stratum_miner(context: MinerContext) -> Result<Box<dyn PoolMiner>> {
    let hasher = Arc::new(ScryptHasher::new()?);
    let session = StratumSession::new(context.pool, hasher)
        .with_report_interval(context.report_interval);
    Ok(Box::new(session))
}
