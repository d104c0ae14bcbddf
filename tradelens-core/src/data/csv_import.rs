//! CSV import provider.
//!
//! Reads the shape pandas/yfinance exports produce:
//! `Date,Open,High,Low,Close[,Adj Close,Volume]`. Files are looked up as
//! `{dir}/{SYMBOL}_{token}.csv`, then `{dir}/{SYMBOL}.csv`.

use super::provider::{DataError, PriceProvider};
use crate::domain::{PriceBar, PriceSeries, Timeframe};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "Datetime", alias = "timestamp")]
    date: String,
    #[serde(alias = "Open")]
    open: Option<f64>,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
}

/// Offline provider backed by a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// First existing candidate file for this symbol/timeframe.
    fn locate(&self, symbol: &str, timeframe: Timeframe) -> Option<PathBuf> {
        [
            self.dir.join(format!("{symbol}_{}.csv", timeframe.token())),
            self.dir.join(format!("{symbol}.csv")),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }

    /// Read a single CSV file into a series.
    pub fn read_file(
        path: &Path,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<PriceSeries, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataError::Other(format!("failed to open {}: {e}", path.display())))?;

        let mut bars = Vec::new();
        for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
            // Header is line 1
            let line = i + 2;
            let row = row.map_err(|e| {
                DataError::ResponseFormatChanged(format!("{}:{line}: {e}", path.display()))
            })?;
            let timestamp = parse_timestamp(&row.date).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!(
                    "{}:{line}: unrecognized date '{}'",
                    path.display(),
                    row.date
                ))
            })?;

            if row.open.is_none() && row.high.is_none() && row.low.is_none() && row.close.is_none()
            {
                continue;
            }

            bars.push(PriceBar::new(
                timestamp,
                row.open.unwrap_or(f64::NAN),
                row.high.unwrap_or(f64::NAN),
                row.low.unwrap_or(f64::NAN),
                row.close.unwrap_or(f64::NAN),
            ));
        }

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                timeframe,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(PriceSeries::new(symbol, timeframe, bars)?)
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, and RFC 3339 (offset converted to UTC).
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .or_else(|_| chrono::DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z"))
        .ok()
        .map(|dt| dt.naive_utc())
}

impl PriceProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<PriceSeries, DataError> {
        let path = self
            .locate(symbol, timeframe)
            .ok_or_else(|| DataError::NoData {
                symbol: symbol.to_string(),
                timeframe,
            })?;
        let series = Self::read_file(&path, symbol, timeframe)?;
        info!(
            "Data for {symbol} with {timeframe} timeframe loaded from {} ({} bars).",
            path.display(),
            series.len()
        );
        Ok(series)
    }
}
