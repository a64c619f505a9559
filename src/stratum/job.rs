//! Mining jobs from `mining.notify`
//!
//! The header is assembled by concatenating the hex fields as strings and
//! decoding the result once. No merkle root is computed and no byte order
//! is adjusted, so headers built this way do not match what a standard
//! pool expects.

use crate::utils::hex_to_bytes;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Positional `mining.notify` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NotifyParams(
    String,
    String,
    String,
    String,
    Vec<String>,
    String,
    String,
    String,
);

/// Decoded unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Job ID
    pub job_id: String,
    /// Previous block hash
    pub prev_block_hash: String,
    /// Coinbase part 1
    pub coinbase1: String,
    /// Coinbase part 2
    pub coinbase2: String,
    /// Merkle branches
    pub merkle_branch: Vec<String>,
    /// Block version
    pub version: String,
    /// nBits (target)
    pub n_bits: String,
    /// nTime
    pub n_time: String,
}

impl Job {
    /// Number of positional notify parameters
    pub const PARAM_COUNT: usize = 8;

    /// Decode from the `params` member of a notify
    pub fn from_params(params: &Value) -> Result<Self> {
        let array = params
            .as_array()
            .ok_or_else(|| Error::decode("mining.notify params must be an array"))?;
        if array.len() != Self::PARAM_COUNT {
            return Err(Error::decode(format!(
                "mining.notify expects {} params, got {}",
                Self::PARAM_COUNT,
                array.len()
            )));
        }

        let NotifyParams(
            job_id,
            prev_block_hash,
            coinbase1,
            coinbase2,
            merkle_branch,
            version,
            n_bits,
            n_time,
        ) = serde_json::from_value(params.clone())
            .map_err(|e| Error::decode(format!("Malformed mining.notify params: {}", e)))?;

        Ok(Self {
            job_id,
            prev_block_hash,
            coinbase1,
            coinbase2,
            merkle_branch,
            version,
            n_bits,
            n_time,
        })
    }

    /// Encode back into positional notify parameters
    pub fn to_params(&self) -> Result<Value> {
        let params = NotifyParams(
            self.job_id.clone(),
            self.prev_block_hash.clone(),
            self.coinbase1.clone(),
            self.coinbase2.clone(),
            self.merkle_branch.clone(),
            self.version.clone(),
            self.n_bits.clone(),
            self.n_time.clone(),
        );
        Ok(serde_json::to_value(params)?)
    }

    /// Header fields concatenated in order, still as hex
    pub fn header_hex(&self) -> String {
        let mut header = String::with_capacity(
            self.prev_block_hash.len()
                + self.coinbase1.len()
                + self.coinbase2.len()
                + self.merkle_branch.iter().map(String::len).sum::<usize>()
                + self.version.len()
                + self.n_bits.len()
                + self.n_time.len(),
        );
        header.push_str(&self.prev_block_hash);
        header.push_str(&self.coinbase1);
        header.push_str(&self.coinbase2);
        for branch in &self.merkle_branch {
            header.push_str(branch);
        }
        header.push_str(&self.version);
        header.push_str(&self.n_bits);
        header.push_str(&self.n_time);
        header
    }

    /// Header bytes searched by the proof-of-work engine
    pub fn header_bytes(&self) -> Result<Vec<u8>> {
        hex_to_bytes(&self.header_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn sample_params() -> Value {
        json!([
            "job7",
            "00112233",
            "aabb",
            "ccdd",
            ["0102", "0304"],
            "20000000",
            "1a2b3c4d",
            "5f5e1000"
        ])
    }

    #[test]
    fn test_decode_notify() {
        let job = Job::from_params(&sample_params()).unwrap();

        assert_eq!(job.job_id, "job7");
        assert_eq!(job.prev_block_hash, "00112233");
        assert_eq!(job.merkle_branch, vec!["0102", "0304"]);
        assert_eq!(job.n_time, "5f5e1000");
    }

    #[test]
    fn test_round_trip() {
        let params = sample_params();
        let job = Job::from_params(&params).unwrap();
        assert_eq!(job.to_params().unwrap(), params);

        let empty_branch = json!(["j", "", "", "", [], "", "", ""]);
        let job = Job::from_params(&empty_branch).unwrap();
        assert_eq!(job.to_params().unwrap(), empty_branch);
    }

    #[test]
    fn test_header_is_literal_concatenation() {
        let job = Job::from_params(&sample_params()).unwrap();

        assert_eq!(
            job.header_hex(),
            "00112233aabbccdd01020304200000001a2b3c4d5f5e1000"
        );
        assert_eq!(
            job.header_bytes().unwrap(),
            hex::decode("00112233aabbccdd01020304200000001a2b3c4d5f5e1000").unwrap()
        );
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let seven = json!(["j", "00", "00", "00", [], "00", "00"]);
        assert_matches!(Job::from_params(&seven), Err(Error::Decode { .. }));

        let nine = json!(["j", "00", "00", "00", [], "00", "00", "00", true]);
        assert_matches!(Job::from_params(&nine), Err(Error::Decode { .. }));

        assert_matches!(Job::from_params(&json!({"job": 1})), Err(Error::Decode { .. }));
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let branch_not_array = json!(["j", "00", "00", "00", "0102", "00", "00", "00"]);
        assert_matches!(
            Job::from_params(&branch_not_array),
            Err(Error::Decode { .. })
        );

        let numeric_id = json!([7, "00", "00", "00", [], "00", "00", "00"]);
        assert_matches!(Job::from_params(&numeric_id), Err(Error::Decode { .. }));
    }

    #[test]
    fn test_invalid_hex_header() {
        let params = json!(["j", "zz", "00", "00", [], "00", "00", "00"]);
        let job = Job::from_params(&params).unwrap();
        assert_matches!(job.header_bytes(), Err(Error::Decode { .. }));
    }
}
