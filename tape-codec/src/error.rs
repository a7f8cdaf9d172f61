use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `tape-codec`.
///
/// Only the relative codec's text decoding can fail: run-length text decoding
/// recovers from malformed tokens by passing them through unchanged.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum CodecError {
    #[error("invalid anchor token, payload is not a decimal: {0}")]
    InvalidAnchor(String),

    #[error("invalid delta token, payload is not a signed integer: {0}")]
    InvalidDelta(String),
}
