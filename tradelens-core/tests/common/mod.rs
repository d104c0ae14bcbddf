//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use tradelens_core::domain::{PriceBar, PriceSeries, Timeframe};

pub fn day(offset: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(offset)
}

/// Daily series whose bars are flat at each close.
pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(day(i as i64), c, c, c, c))
        .collect();
    PriceSeries::new("TEST", Timeframe::Daily, bars).unwrap()
}
