//! PriceBar: one OHLC observation for a fixed interval.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLC bar for a single interval.
///
/// Timestamps are UTC. Daily bars carry midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Returns true if any OHLC field is NaN (a row the provider could not fill).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high/low bound open and close, no negatives.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low >= 0.0
    }

    /// True when the bar closed at or above its open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}
