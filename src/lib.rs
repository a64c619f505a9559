//! Scrypt Stratum Miner
//!
//! A mining client for scrypt-based pools speaking Stratum v1:
//! - Line-delimited JSON session (subscribe, authorize, notify, submit)
//! - Scrypt nonce search with cooperative cancellation on new work
//! - Currency registry selecting the miner implementation at startup

pub mod config;
pub mod error;
pub mod types;
pub mod crypto;
pub mod worker;
pub mod stratum;
pub mod registry;
pub mod utils;

pub use config::{Config, PoolConfig};
pub use error::{Error, Result};
pub use types::*;

/// Application information
pub const APP_NAME: &str = "scrypt-stratum-miner";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
