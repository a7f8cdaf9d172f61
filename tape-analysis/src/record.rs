use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::str::FromStr;

/// One trade on the input tape: `timestamp,symbol,quantity,price`, all fields
/// integers except the symbol.
///
/// The tape is assumed sorted by timestamp per symbol but this is not
/// enforced; unsorted input simply produces negative time gaps, which the
/// aggregator never promotes to a maximum.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct TradeRecord {
    pub timestamp: i64,
    pub symbol: SmolStr,
    pub quantity: u64,
    pub price: u64,
}

impl FromStr for TradeRecord {
    type Err = AnalysisError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| AnalysisError::Parse {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let [timestamp, symbol, quantity, price]: [&str; 4] = line
            .trim()
            .splitn(4, ',')
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| malformed("expected 4 comma-separated fields"))?;

        Ok(Self {
            timestamp: timestamp
                .parse()
                .map_err(|_| malformed("timestamp must be an integer"))?,
            symbol: SmolStr::new(symbol),
            quantity: quantity
                .parse()
                .map_err(|_| malformed("quantity must be an integer"))?,
            price: price
                .parse()
                .map_err(|_| malformed("price must be an integer"))?,
        })
    }
}
