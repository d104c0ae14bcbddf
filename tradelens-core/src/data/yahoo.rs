//! Yahoo Finance data provider.
//!
//! Fetches OHLC bars from Yahoo's v8 chart API. Handles retries with
//! exponential backoff and response parsing.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. The CSV import path is the fallback when Yahoo is unavailable.

use super::provider::{DataError, PriceProvider};
use crate::domain::{PriceBar, PriceSeries, Timeframe};
use crate::retry::Backoff;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    backoff: Backoff,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Provider against a different host (a mirror or a local test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            backoff: Backoff::new(3, Duration::from_millis(500)),
        })
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Build the chart API URL for a symbol at the widest range Yahoo serves for the interval.
    fn chart_url(&self, symbol: &str, timeframe: Timeframe) -> String {
        format!(
            "{}/v8/finance/chart/{symbol}?range={}&interval={}",
            self.base_url,
            timeframe.default_range(),
            timeframe.interval(),
        )
    }

    /// Parse the chart API response into a series.
    fn parse_response(
        symbol: &str,
        timeframe: Timeframe,
        resp: ChartResponse,
    ) -> Result<PriceSeries, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A symbol with no rows in range comes back without a timestamp array
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = bar_timestamp(ts, timeframe).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
            })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();

            // Skip rows where all OHLC are None (holidays/non-trading intervals)
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }

            let bar = PriceBar::new(
                timestamp,
                open.unwrap_or(f64::NAN),
                high.unwrap_or(f64::NAN),
                low.unwrap_or(f64::NAN),
                close.unwrap_or(f64::NAN),
            );

            // The in-progress daily bar can repeat the last date; the later row wins
            match bars.last_mut() {
                Some(last) if last.timestamp == timestamp => *last = bar,
                _ => bars.push(bar),
            }
        }

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                timeframe,
            });
        }

        let void = bars.iter().filter(|b| b.is_void()).count();
        if void > 0 {
            warn!(symbol, void, "response contains partially missing bars");
        }

        Ok(PriceSeries::new(symbol, timeframe, bars)?)
    }

    /// Execute the chart request with retry logic.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<PriceSeries, DataError> {
        let url = self.chart_url(symbol, timeframe);
        let mut last_error = None;

        for attempt in self.backoff.attempts() {
            if attempt > 0 {
                debug!(symbol, attempt, "retrying chart request");
            }
            self.backoff.wait(attempt);

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if status.is_server_error() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;

                    return Self::parse_response(symbol, timeframe, chart);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// Daily bars are keyed by UTC date at midnight; intraday bars keep the exact time.
fn bar_timestamp(ts: i64, timeframe: Timeframe) -> Option<NaiveDateTime> {
    let dt = chrono::DateTime::from_timestamp(ts, 0)?.naive_utc();
    if timeframe.is_intraday() {
        Some(dt)
    } else {
        dt.date().and_hms_opt(0, 0, 0)
    }
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<PriceSeries, DataError> {
        let series = self.fetch_with_retry(symbol, timeframe)?;
        info!(
            "Data for {symbol} with {timeframe} timeframe retrieved successfully ({} bars).",
            series.len()
        );
        Ok(series)
    }
}
