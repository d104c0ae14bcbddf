//! Run configuration: TOML file sections plus the analyzer credentials read
//! from the environment.
//!
//! Every key has a default, so an empty file (or no file) is a valid config.

use crate::analysis::AnalyzerConfig;
use crate::data::DataSource;
use crate::domain::Timeframe;
use crate::simulator::ThresholdStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ORG_ID_VAR: &str = "OPENAI_ORG_ID";

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub run: RunSettings,
    pub strategy: StrategySettings,
    pub analyzer: AnalyzerSettings,
    pub updates: UpdateSettings,
}

impl AppConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.to_strategy()?;
        if self.run.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("run.symbol must not be empty".into()));
        }
        if self.updates.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "updates.interval_secs must be at least 1".into(),
            ));
        }
        if self.analyzer.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "analyzer.max_tokens must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `[run]`: what to fetch and how to show it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// `line`, `candlestick`, or `none`.
    pub chart: String,
    pub source: DataSource,
    /// Directory searched by the CSV provider.
    pub csv_dir: PathBuf,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            symbol: "BTC-USD".into(),
            timeframe: Timeframe::Daily,
            chart: "line".into(),
            source: DataSource::YahooFinance,
            csv_dir: PathBuf::from("data"),
        }
    }
}

/// `[strategy]`: fractional close-to-close moves that trigger trades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    pub rise: f64,
    pub drop: f64,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            rise: 0.01,
            drop: 0.01,
        }
    }
}

impl StrategySettings {
    /// The default ±1% settings map to the exact 1.01 / 0.99 multipliers.
    pub fn to_strategy(&self) -> Result<ThresholdStrategy, ConfigError> {
        if *self == Self::default() {
            return Ok(ThresholdStrategy::default());
        }
        ThresholdStrategy::from_fractions(self.rise, self.drop)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// `[analyzer]`: model parameters. Credentials never live in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            max_tokens: 150,
            base_url: "https://api.openai.com/v1".into(),
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl AnalyzerSettings {
    /// Combine with credentials looked up through `lookup` (normally `std::env::var`).
    ///
    /// Fails fast when the API key is absent or blank.
    pub fn resolve<F>(&self, lookup: F) -> Result<AnalyzerConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_VAR.to_string()))?;
        let organization = lookup(ORG_ID_VAR).filter(|o| !o.trim().is_empty());

        Ok(AnalyzerConfig {
            api_key,
            organization,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
        })
    }

    /// Resolve credentials from the process environment.
    pub fn resolve_env(&self) -> Result<AnalyzerConfig, ConfigError> {
        self.resolve(|name| std::env::var(name).ok())
    }
}

/// `[updates]`: placeholder update loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSettings {
    pub interval_secs: u64,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

impl UpdateSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
