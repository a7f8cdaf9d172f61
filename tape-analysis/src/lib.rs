//! Streaming per-symbol trade tape analysis.
//!
//! Consumes a text tape of `timestamp,symbol,quantity,price` records and
//! incrementally maintains per-symbol aggregate statistics: maximum time gap
//! between consecutive trades, total volume, volume-weighted average price,
//! and maximum trade price.
//!
//! [`analyze`] yields an ordered-by-symbol [`Snapshot`] after every record so
//! a caller may consume any prefix of the tape for early analysis. The
//! [`report`] driver consumes the whole tape, keeps only the final state, and
//! writes one report line per symbol to a text sink.
//!
//! Everything is single-threaded and synchronous; the only side effect is the
//! driver's file write.

pub mod aggregator;
pub mod error;
pub mod record;
pub mod report;

pub use aggregator::{Analyze, AnalyzedShare, ShareSnapshot, Snapshot, TradeAggregator, analyze};
pub use error::AnalysisError;
pub use record::TradeRecord;
