//! Data provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import, synthetic) so the pipeline can swap implementations and tests can
//! run offline.

use crate::domain::series::SeriesError;
use crate::domain::timeframe::UnsupportedTimeframe;
use crate::domain::{PriceSeries, Timeframe};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    UnsupportedTimeframe(#[from] UnsupportedTimeframe),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data returned for {symbol} ({timeframe})")]
    NoData { symbol: String, timeframe: Timeframe },

    #[error("provider returned an invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// True for failures meaning "the data could not be obtained", as opposed
    /// to a bad request from the caller.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, DataError::UnsupportedTimeframe(_))
    }
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "yahoo")]
    YahooFinance,
    #[serde(rename = "csv")]
    CsvImport,
    #[serde(rename = "synthetic")]
    Synthetic,
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yahoo" => Ok(DataSource::YahooFinance),
            "csv" => Ok(DataSource::CsvImport),
            "synthetic" => Ok(DataSource::Synthetic),
            other => Err(format!(
                "unknown data source '{other}'. Valid: yahoo, csv, synthetic"
            )),
        }
    }
}

/// Trait for price series providers.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the bar series for a symbol at the given timeframe.
    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<PriceSeries, DataError>;

    /// Parse a timeframe token (`5`, `15`, `60`, `D`) and fetch.
    ///
    /// An unsupported token fails before the provider is touched.
    fn fetch_token(&self, symbol: &str, token: &str) -> Result<PriceSeries, DataError> {
        let timeframe: Timeframe = token.parse()?;
        self.fetch(symbol, timeframe)
    }
}
