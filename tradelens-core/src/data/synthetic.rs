//! Synthetic data provider for offline runs and demos.
//!
//! Produces a simple random walk from a starting price of 100.0. The RNG is
//! seeded from the symbol name, so the same symbol always yields the same bars.

use super::provider::{DataError, PriceProvider};
use crate::domain::{PriceBar, PriceSeries, Timeframe};
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

pub const DEFAULT_BAR_COUNT: usize = 250;

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    bars: usize,
    /// Timestamp of the final bar.
    end: NaiveDateTime,
}

impl SyntheticProvider {
    pub fn new(bars: usize, end: NaiveDateTime) -> Self {
        Self { bars, end }
    }

    /// Deterministic bars for `symbol`, spaced by the timeframe's bar length.
    pub fn generate(&self, symbol: &str, timeframe: Timeframe) -> Vec<PriceBar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);
        let step = timeframe.bar_duration();
        let start = self.end - step * (self.bars.saturating_sub(1) as i32);

        let mut bars = Vec::with_capacity(self.bars);
        let mut price = 100.0_f64;

        for i in 0..self.bars {
            let ret: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));

            bars.push(PriceBar::new(start + step * i as i32, open, high, low, close));
            price = close;
        }

        bars
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<PriceSeries, DataError> {
        warn!("generating synthetic data for {symbol}; results are not market data");
        if self.bars == 0 {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                timeframe,
            });
        }
        Ok(PriceSeries::new(symbol, timeframe, self.generate(symbol, timeframe))?)
    }
}
