//! PriceSeries: an immutable, time-ordered run of bars for one symbol.

use super::bar::PriceBar;
use super::timeframe::Timeframe;
use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} at {timestamp} is earlier than the bar before it")]
    OutOfOrder {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("bar {index} repeats timestamp {timestamp}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: NaiveDateTime,
    },
}

/// Ordered bars indexed `0..n-1` with strictly increasing timestamps.
///
/// Fields are private: once built, a series is only read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    timeframe: Timeframe,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting bars whose timestamps do not strictly increase.
    ///
    /// Non-finite prices are accepted here; the simulator decides what to do with them.
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<PriceBar>,
    ) -> Result<Self, SeriesError> {
        for (i, pair) in bars.windows(2).enumerate() {
            let index = i + 1;
            let timestamp = pair[1].timestamp;
            if pair[1].timestamp == pair[0].timestamp {
                return Err(SeriesError::DuplicateTimestamp { index, timestamp });
            }
            if pair[1].timestamp < pair[0].timestamp {
                return Err(SeriesError::OutOfOrder { index, timestamp });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        })
    }

    /// An empty series for `symbol`.
    pub fn empty(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Close prices in series order.
    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }

    /// Lowest low and highest high, ignoring NaN fields. `None` for an empty or all-void series.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let lo = self
            .bars
            .iter()
            .map(|b| b.low)
            .filter(|v| !v.is_nan())
            .fold(f64::INFINITY, f64::min);
        let hi = self
            .bars
            .iter()
            .map(|b| b.high)
            .filter(|v| !v.is_nan())
            .fold(f64::NEG_INFINITY, f64::max);
        (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
    }
}
