//! Stage orchestration: fetch → simulate → analyze.
//!
//! Fetch and simulation failures halt the run. An analysis failure is kept
//! in the report next to the trades, which are never discarded.

use crate::analysis::{AnalysisError, TextModel, TradeAnalyzer};
use crate::data::{DataError, PriceProvider};
use crate::domain::{PriceSeries, Timeframe, TradeEvent, TradeSummary};
use crate::simulator::{SimulationError, ThresholdStrategy};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data retrieval failed: {0}")]
    Data(#[from] DataError),

    #[error("trade simulation failed: {0}")]
    Simulation(#[from] SimulationError),
}

/// Outcome of the simulate/analyze stages.
#[derive(Debug)]
pub struct RunReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bar_count: usize,
    pub trades: Vec<TradeEvent>,
    pub summary: TradeSummary,
    /// `None` when analysis was not requested.
    pub analysis: Option<Result<String, AnalysisError>>,
}

impl RunReport {
    pub fn analysis_failed(&self) -> bool {
        matches!(self.analysis, Some(Err(_)))
    }
}

/// Fetch the series for a symbol, logging the outcome.
pub fn fetch_series(
    provider: &dyn PriceProvider,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<PriceSeries, PipelineError> {
    match provider.fetch(symbol, timeframe) {
        Ok(series) => {
            info!(
                provider = provider.name(),
                bars = series.len(),
                "Historical data retrieved successfully."
            );
            Ok(series)
        }
        Err(e) => {
            error!(provider = provider.name(), "Error retrieving data for {symbol}: {e}");
            Err(e.into())
        }
    }
}

/// Simulate trades on `series`, then analyze them if an analyzer is given.
pub fn simulate_and_analyze<M: TextModel>(
    series: &PriceSeries,
    strategy: &ThresholdStrategy,
    analyzer: Option<&TradeAnalyzer<M>>,
) -> Result<RunReport, PipelineError> {
    let trades = strategy.simulate(series).map_err(|e| {
        error!("Error during trade simulation: {e}");
        e
    })?;
    let summary = TradeSummary::from_trades(&trades);
    info!(trades = trades.len(), "Trades simulated successfully.");

    let analysis = analyzer.map(|a| {
        let result = a.analyze(&trades);
        match &result {
            Ok(_) => info!("Trades analyzed successfully."),
            Err(e) => error!("Error during trade analysis: {e}"),
        }
        result
    });

    Ok(RunReport {
        symbol: series.symbol().to_string(),
        timeframe: series.timeframe(),
        bar_count: series.len(),
        trades,
        summary,
        analysis,
    })
}
