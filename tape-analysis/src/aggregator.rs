use crate::{error::AnalysisError, record::TradeRecord};
use derive_more::Display;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Per-symbol aggregate state.
///
/// Created lazily the first time a symbol is sighted and owned by the
/// aggregator's working set for the rest of the run. The price profile maps
/// price to the cumulative quantity traded at that price and grows with the
/// number of distinct prices.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedShare {
    symbol: SmolStr,
    latest_timestamp: i64,
    max_time_gap: i64,
    total_volume: u64,
    max_trade_price: u64,
    price_profile: FnvHashMap<u64, u64>,
}

impl AnalyzedShare {
    fn new(record: &TradeRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            latest_timestamp: record.timestamp,
            max_time_gap: 0,
            total_volume: record.quantity,
            max_trade_price: record.price,
            price_profile: FnvHashMap::from_iter([(record.price, record.quantity)]),
        }
    }

    fn update(&mut self, record: &TradeRecord) {
        // Negative gaps from unsorted input never beat the running maximum
        let gap = record.timestamp - self.latest_timestamp;
        if gap > self.max_time_gap {
            self.max_time_gap = gap;
        }

        self.total_volume += record.quantity;
        self.max_trade_price = self.max_trade_price.max(record.price);
        self.latest_timestamp = record.timestamp;
        *self.price_profile.entry(record.price).or_insert(0) += record.quantity;
    }

    pub fn symbol(&self) -> &SmolStr {
        &self.symbol
    }

    pub fn latest_timestamp(&self) -> i64 {
        self.latest_timestamp
    }

    pub fn max_time_gap(&self) -> i64 {
        self.max_time_gap
    }

    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    pub fn max_trade_price(&self) -> u64 {
        self.max_trade_price
    }

    pub fn price_profile(&self) -> &FnvHashMap<u64, u64> {
        &self.price_profile
    }

    /// Volume-weighted mean trade price, truncated to an integer.
    ///
    /// The notional sum is accumulated in `u128` so long tapes cannot
    /// overflow. Zero total volume is unreachable once a record has been
    /// applied, but a corrupted working set must fail loudly rather than
    /// divide by zero.
    pub fn weighted_average_price(&self) -> Result<u64, AnalysisError> {
        let total_quantity = u128::from(self.total_volume);
        if total_quantity == 0 {
            return Err(AnalysisError::ZeroVolume {
                symbol: self.symbol.clone(),
            });
        }

        let notional: u128 = self
            .price_profile
            .iter()
            .map(|(price, quantity)| u128::from(*price) * u128::from(*quantity))
            .sum();

        Ok((notional / total_quantity) as u64)
    }
}

/// Derived report row for one symbol; `Display` renders the report line
/// format `symbol,max_time_gap,total_volume,weighted_average_price,max_trade_price`.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, Display)]
#[display("{symbol},{max_time_gap},{total_volume},{weighted_average_price},{max_trade_price}")]
pub struct ShareSnapshot {
    pub symbol: SmolStr,
    pub max_time_gap: i64,
    pub total_volume: u64,
    pub weighted_average_price: u64,
    pub max_trade_price: u64,
}

impl TryFrom<&AnalyzedShare> for ShareSnapshot {
    type Error = AnalysisError;

    fn try_from(share: &AnalyzedShare) -> Result<Self, Self::Error> {
        Ok(Self {
            symbol: share.symbol.clone(),
            max_time_gap: share.max_time_gap,
            total_volume: share.total_volume,
            weighted_average_price: share.weighted_average_price()?,
            max_trade_price: share.max_trade_price,
        })
    }
}

/// Report rows for every symbol seen so far, ordered by symbol ascending.
pub type Snapshot = Vec<ShareSnapshot>;

/// Incremental aggregator over the trade tape.
///
/// The working set is a `BTreeMap` keyed by symbol so snapshots come out
/// ordered without a sort per record. State grows with the number of distinct
/// symbols and, per symbol, the number of distinct prices; the whole
/// collection is discarded when the run's owner drops it.
#[derive(Debug, Clone, Default)]
pub struct TradeAggregator {
    shares: BTreeMap<SmolStr, AnalyzedShare>,
}

impl TradeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one tape line and fold it into the working set.
    pub fn apply_line(&mut self, line: &str) -> Result<(), AnalysisError> {
        self.apply(&line.parse()?);
        Ok(())
    }

    /// Fold one record into the working set, inserting fresh per-symbol state
    /// on first sighting.
    pub fn apply(&mut self, record: &TradeRecord) {
        match self.shares.get_mut(&record.symbol) {
            Some(share) => share.update(record),
            None => {
                self.shares
                    .insert(record.symbol.clone(), AnalyzedShare::new(record));
            }
        }
    }

    /// Number of distinct symbols seen so far.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn share(&self, symbol: &str) -> Option<&AnalyzedShare> {
        self.shares.get(symbol)
    }

    /// Working-set entries ordered by symbol ascending.
    pub fn shares(&self) -> impl Iterator<Item = &AnalyzedShare> {
        self.shares.values()
    }

    /// Report rows reflecting every record consumed so far, ordered by
    /// symbol ascending.
    pub fn snapshot(&self) -> Result<Snapshot, AnalysisError> {
        self.shares.values().map(ShareSnapshot::try_from).collect()
    }
}

/// Lazily analyze an iterator of tape lines.
///
/// Yields a full [`Snapshot`] after every record, so a caller may stop
/// pulling at any prefix of the tape. Restarting requires a fresh iterator
/// over the source; the first parse failure is yielded once and fuses the
/// stream.
pub fn analyze<I>(lines: I) -> Analyze<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Analyze {
        lines: lines.into_iter(),
        aggregator: TradeAggregator::new(),
        done: false,
    }
}

/// Iterator returned by [`analyze`].
#[derive(Debug)]
pub struct Analyze<I> {
    lines: I,
    aggregator: TradeAggregator,
    done: bool,
}

impl<I> Analyze<I> {
    /// Consumes the iterator, returning the aggregator state accumulated so
    /// far.
    pub fn into_aggregator(self) -> TradeAggregator {
        self.aggregator
    }
}

impl<I> Iterator for Analyze<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<Snapshot, AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some(line) = self.lines.next() else {
            self.done = true;
            return None;
        };

        match self.aggregator.apply_line(line.as_ref()) {
            Ok(()) => Some(self.aggregator.snapshot()),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
