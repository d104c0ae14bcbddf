//! Bar timeframe and its provider mappings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Timeframe token outside `5`, `15`, `60`, `D`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported timeframe '{token}'. Use '5', '15', '60', or 'D'")]
pub struct UnsupportedTimeframe {
    pub token: String,
}

/// Interval of a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5")]
    Intraday5,
    #[serde(rename = "15")]
    Intraday15,
    #[serde(rename = "60")]
    Intraday60,
    #[serde(rename = "D")]
    Daily,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Intraday5,
        Timeframe::Intraday15,
        Timeframe::Intraday60,
        Timeframe::Daily,
    ];

    /// The token this timeframe is selected by on the command line and in config.
    pub fn token(self) -> &'static str {
        match self {
            Timeframe::Intraday5 => "5",
            Timeframe::Intraday15 => "15",
            Timeframe::Intraday60 => "60",
            Timeframe::Daily => "D",
        }
    }

    /// Provider interval string (Yahoo chart API `interval` parameter).
    pub fn interval(self) -> &'static str {
        match self {
            Timeframe::Intraday5 => "5m",
            Timeframe::Intraday15 => "15m",
            Timeframe::Intraday60 => "60m",
            Timeframe::Daily => "1d",
        }
    }

    /// Widest lookback Yahoo serves for this interval.
    pub fn default_range(self) -> &'static str {
        match self {
            Timeframe::Intraday5 | Timeframe::Intraday15 => "60d",
            Timeframe::Intraday60 => "730d",
            Timeframe::Daily => "max",
        }
    }

    /// Wall-clock length of one bar.
    pub fn bar_duration(self) -> chrono::Duration {
        match self {
            Timeframe::Intraday5 => chrono::Duration::minutes(5),
            Timeframe::Intraday15 => chrono::Duration::minutes(15),
            Timeframe::Intraday60 => chrono::Duration::minutes(60),
            Timeframe::Daily => chrono::Duration::days(1),
        }
    }

    pub fn is_intraday(self) -> bool {
        !matches!(self, Timeframe::Daily)
    }
}

impl FromStr for Timeframe {
    type Err = UnsupportedTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5" => Ok(Timeframe::Intraday5),
            "15" => Ok(Timeframe::Intraday15),
            "60" => Ok(Timeframe::Intraday60),
            "D" => Ok(Timeframe::Daily),
            other => Err(UnsupportedTimeframe {
                token: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
