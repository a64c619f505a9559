//! Stratum v1 client for scrypt pools
//!
//! Newline-delimited JSON over TCP: the session subscribes, authorizes,
//! searches each notified job and submits winning nonces.

pub mod framer;
pub mod job;
pub mod protocol;
pub mod session;

pub use framer::LineFramer;
pub use job::Job;
pub use protocol::{InboundMessage, StratumMethod, StratumRequest};
pub use session::{SearchOutcome, SessionId, SessionState, StratumSession};
