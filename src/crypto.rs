//! Cryptographic primitives for mining
//!
//! Scrypt proof-of-work hashing and the win condition applied to its output.

use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use scrypt::Params;

/// Size of a proof-of-work hash in bytes
pub const HASH_SIZE: usize = 32;

/// log2 of the scrypt cost parameter N (N = 1024)
pub const SCRYPT_LOG_N: u8 = 10;
/// Scrypt block size parameter
pub const SCRYPT_R: u32 = 1;
/// Scrypt parallelization parameter
pub const SCRYPT_P: u32 = 1;

/// Hash function evaluated once per candidate nonce
pub trait PowHasher: Send + Sync + 'static {
    /// Hash a candidate message (`header ‖ nonce_le`)
    fn hash(&self, message: &[u8]) -> Result<[u8; HASH_SIZE]>;
}

/// Scrypt hasher with N=1024, r=1, p=1 and a 32 byte output
///
/// The message is used as both password and salt.
#[derive(Clone)]
pub struct ScryptHasher {
    params: Params,
}

impl ScryptHasher {
    /// Create a new scrypt hasher
    pub fn new() -> Result<Self> {
        let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, HASH_SIZE)
            .map_err(|e| Error::crypto(format!("Invalid scrypt parameters: {}", e)))?;
        Ok(Self { params })
    }
}

impl PowHasher for ScryptHasher {
    fn hash(&self, message: &[u8]) -> Result<[u8; HASH_SIZE]> {
        let mut output = [0u8; HASH_SIZE];
        scrypt::scrypt(message, message, &self.params, &mut output)
            .map_err(|e| Error::crypto(format!("Scrypt failed: {}", e)))?;
        Ok(output)
    }
}

/// Win condition: the first four hash bytes, read little-endian, are zero
///
/// This is an exact-zero test rather than a comparison against a pool
/// difficulty target.
pub fn meets_target(hash: &[u8; HASH_SIZE]) -> bool {
    LittleEndian::read_u32(&hash[..4]) == 0
}
