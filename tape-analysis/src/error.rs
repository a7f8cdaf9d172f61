use smol_str::SmolStr;
use thiserror::Error;

/// All errors generated in `tape-analysis`.
///
/// Analysis is a single-pass batch transformation: the first error aborts the
/// run and propagates to the caller, there are no retries.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed trade record '{line}': {reason}")]
    Parse { line: String, reason: String },

    #[error("weighted average price undefined for {symbol}: total volume is zero")]
    ZeroVolume { symbol: SmolStr },

    #[error("report io failed: {0}")]
    Io(#[from] std::io::Error),
}
