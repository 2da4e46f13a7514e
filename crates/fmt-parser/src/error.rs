//! Parse errors (§3 "Parse error", §7.1).

/// A parse failure, anchored to the byte offset in the source format
/// string where it was detected.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("format string error at byte {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}
