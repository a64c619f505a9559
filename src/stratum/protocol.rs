//! Stratum protocol message definitions

use super::framer::DELIMITER;
use crate::{Error, Nonce, Result, SubmissionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request id for `mining.subscribe`
pub const SUBSCRIBE_ID: u64 = 1;
/// Request id for `mining.authorize`
pub const AUTHORIZE_ID: u64 = 2;
/// Request id for `mining.submit`
pub const SUBMIT_ID: u64 = 3;

/// Stratum protocol methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StratumMethod {
    /// Client subscribes to mining notifications
    Subscribe,
    /// Client authorizes with credentials
    Authorize,
    /// Server notifies client of new work
    Notify,
    /// Client submits a share
    Submit,
    /// Unknown method
    Unknown(String),
}

impl StratumMethod {
    /// Parse method from string
    pub fn parse_method(s: &str) -> Self {
        match s {
            "mining.subscribe" => Self::Subscribe,
            "mining.authorize" => Self::Authorize,
            "mining.notify" => Self::Notify,
            "mining.submit" => Self::Submit,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Subscribe => "mining.subscribe",
            Self::Authorize => "mining.authorize",
            Self::Notify => "mining.notify",
            Self::Submit => "mining.submit",
            Self::Unknown(s) => s,
        }
    }
}

/// Outbound stratum request
///
/// Member order on the wire is `id`, `method`, `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumRequest {
    /// Request ID
    pub id: u64,
    /// Method name
    pub method: String,
    /// Method parameters
    pub params: Vec<Value>,
}

impl StratumRequest {
    /// Create a new request
    pub fn new(id: u64, method: StratumMethod, params: Vec<Value>) -> Self {
        Self {
            id,
            method: method.as_str().to_string(),
            params,
        }
    }

    /// `{"id":1,"method":"mining.subscribe","params":[]}`
    pub fn subscribe() -> Self {
        Self::new(SUBSCRIBE_ID, StratumMethod::Subscribe, Vec::new())
    }

    /// `{"id":2,"method":"mining.authorize","params":[username,password]}`
    pub fn authorize(username: &str, password: &str) -> Self {
        Self::new(
            AUTHORIZE_ID,
            StratumMethod::Authorize,
            vec![username.into(), password.into()],
        )
    }

    /// `{"id":3,"method":"mining.submit","params":[username,jobId,nonce]}`
    ///
    /// The nonce goes out as a decimal string.
    pub fn submit(username: &str, submission: &SubmissionResult) -> Self {
        Self::new(
            SUBMIT_ID,
            StratumMethod::Submit,
            vec![
                username.into(),
                submission.job_id.as_str().into(),
                submission.nonce.to_string().into(),
            ],
        )
    }

    /// Get the method as enum
    pub fn method_enum(&self) -> StratumMethod {
        StratumMethod::parse_method(&self.method)
    }

    /// Serialize as one delimiter-terminated line
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(DELIMITER);
        Ok(line)
    }
}

/// Loose view of any inbound line
#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
}

/// Inbound message, classified for the session
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Response with a truthy `result`
    Ack { id: Value, result: Value },
    /// `mining.notify` with its raw parameters
    Notify { params: Value },
    /// Response carrying a non-null `error`
    Rejected { id: Value, error: Value },
    /// Anything else (falsy results, other methods)
    Other { id: Value, method: Option<String> },
}

impl InboundMessage {
    /// Parse one line from the pool
    ///
    /// A truthy `result` wins over `method`, matching how acks are detected.
    pub fn parse(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| Error::decode(format!("Invalid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(Error::decode(format!("Expected a JSON object, got {}", value)));
        }
        let raw: RawMessage = serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("Malformed message: {}", e)))?;

        if is_truthy(&raw.result) {
            return Ok(Self::Ack {
                id: raw.id,
                result: raw.result,
            });
        }

        let method = raw.method.as_deref().map(StratumMethod::parse_method);
        if method == Some(StratumMethod::Notify) {
            return Ok(Self::Notify { params: raw.params });
        }

        if !raw.error.is_null() {
            return Ok(Self::Rejected {
                id: raw.id,
                error: raw.error,
            });
        }

        Ok(Self::Other {
            id: raw.id,
            method: raw.method,
        })
    }
}

/// Loose truthiness: null, false, zero and the empty string are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Submit line for a winning nonce, as it goes on the wire
pub fn submit_line(username: &str, job_id: &str, nonce: Nonce) -> Result<Vec<u8>> {
    StratumRequest::submit(username, &SubmissionResult::new(job_id, nonce)).encode()
}
