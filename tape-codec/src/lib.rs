//! Lossless codecs for trade tape streams.
//!
//! Two independent leaf codecs with no shared runtime state:
//! - [`run_length`]: groups maximal consecutive runs of equal tokens into
//!   `(value, count)` pairs, with a comma-delimited text format.
//! - [`relative`]: encodes closely-clustered decimal price sequences as
//!   absolute anchors and scaled integer deltas, bounded by a tolerance.
//!
//! All codecs are single-threaded pull-based iterator transformers with O(1)
//! auxiliary state beyond the current run or running previous value. Stopping
//! early is simply ceasing to pull; a fresh iterator over the source is
//! required to restart.

pub mod error;
pub mod relative;
pub mod run_length;

pub use error::CodecError;
