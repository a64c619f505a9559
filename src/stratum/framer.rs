//! Line framing for the pool byte stream
//!
//! TCP hands us arbitrary chunks; stratum messages are newline-terminated.
//! [`LineFramer`] keeps whatever follows the last newline and joins it with
//! the next chunk, so lines come out whole and in arrival order.

use crate::{Error, Result};
use bytes::BytesMut;

/// Line delimiter used in both directions
pub const DELIMITER: u8 = b'\n';

/// Longest line accepted from the pool, delimiter excluded
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Reassembles newline-delimited lines from byte chunks
#[derive(Debug)]
pub struct LineFramer {
    residual: BytesMut,
    /// Prefix of `residual` already known to hold no delimiter
    scanned: usize,
    /// Dropping the tail of an over-long line up to its delimiter
    discarding: bool,
    max_line_length: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            residual: BytesMut::new(),
            scanned: 0,
            discarding: false,
            max_line_length,
        }
    }

    /// Feed one chunk and collect every line it completes
    ///
    /// Blank lines are skipped and a trailing `\r` is dropped. A line that is
    /// not UTF-8 or longer than the limit comes out as a decode error in its
    /// position; the buffered remainder never grows past the limit.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<String>> {
        self.residual.extend_from_slice(chunk);

        let mut lines = Vec::new();
        loop {
            let found = self.residual[self.scanned..]
                .iter()
                .position(|&b| b == DELIMITER);

            let Some(offset) = found else {
                if self.residual.len() > self.max_line_length {
                    if !self.discarding {
                        lines.push(Err(self.too_long()));
                        self.discarding = true;
                    }
                    self.residual.clear();
                }
                self.scanned = self.residual.len();
                break;
            };

            let pos = self.scanned + offset;
            let frame = self.residual.split_to(pos + 1);
            self.scanned = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if pos > self.max_line_length {
                lines.push(Err(self.too_long()));
                continue;
            }

            match std::str::from_utf8(&frame[..pos]) {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        lines.push(Ok(text.to_string()));
                    }
                }
                Err(e) => lines.push(Err(Error::decode(format!(
                    "Line is not valid UTF-8: {}",
                    e
                )))),
            }
        }

        lines
    }

    fn too_long(&self) -> Error {
        Error::decode(format!(
            "Line exceeds {} bytes",
            self.max_line_length
        ))
    }

    /// Bytes received after the last complete line
    pub fn residual(&self) -> &[u8] {
        &self.residual
    }
}
