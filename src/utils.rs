//! Utility functions and helpers
//!
//! Common utilities used throughout the mining client.

use crate::{Error, Result};

/// Format hash rate as a human-readable string
pub fn format_hash_rate(hashes_per_sec: f64) -> String {
    const UNITS: &[&str] = &["H/s", "KH/s", "MH/s", "GH/s", "TH/s", "PH/s"];
    let mut rate = hashes_per_sec;
    let mut unit_index = 0;

    while rate >= 1000.0 && unit_index < UNITS.len() - 1 {
        rate /= 1000.0;
        unit_index += 1;
    }

    format!("{:.2} {}", rate, UNITS[unit_index])
}

/// Validate hex string format
pub fn validate_hex_string(s: &str) -> Result<()> {
    if s.len() % 2 != 0 {
        return Err(Error::decode(format!(
            "Hex string has odd length {}",
            s.len()
        )));
    }

    if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(Error::decode(format!(
            "Hex string contains non-hexadecimal character {:?}",
            c
        )));
    }

    Ok(())
}

/// Convert hex string to bytes
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    validate_hex_string(hex)?;
    hex::decode(hex).map_err(|e| Error::decode(format!("Invalid hex: {}", e)))
}
