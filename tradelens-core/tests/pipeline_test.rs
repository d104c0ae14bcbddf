//! Stage orchestration: analysis failure keeps the simulated trades.

mod common;

use common::series_from_closes;
use std::time::Duration;
use tradelens_core::analysis::{
    AnalysisError, AnalyzerConfig, CompletionRequest, OpenAiClient, TextModel, TradeAnalyzer,
};
use tradelens_core::data::{DataError, PriceProvider, SyntheticProvider};
use tradelens_core::domain::{PriceSeries, Timeframe};
use tradelens_core::pipeline::{fetch_series, simulate_and_analyze, PipelineError};
use tradelens_core::simulator::ThresholdStrategy;

struct FailingModel;

impl TextModel for FailingModel {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, AnalysisError> {
        Err(AnalysisError::RateLimited)
    }
}

struct EchoModel;

impl TextModel for EchoModel {
    fn complete(&self, request: &CompletionRequest) -> Result<String, AnalysisError> {
        Ok(format!(" {} messages ", request.messages.len()))
    }
}

struct DownProvider;

impl PriceProvider for DownProvider {
    fn name(&self) -> &str {
        "down"
    }

    fn fetch(&self, _symbol: &str, _timeframe: Timeframe) -> Result<PriceSeries, DataError> {
        Err(DataError::NetworkUnreachable("connection refused".into()))
    }
}

fn analyzer_config() -> AnalyzerConfig {
    AnalyzerConfig {
        api_key: "sk-test".into(),
        organization: None,
        model: "gpt-4o".into(),
        max_tokens: 150,
        base_url: "http://localhost".into(),
        timeout: Duration::from_secs(1),
        max_retries: 0,
    }
}

#[test]
fn analysis_failure_keeps_trades() {
    let series = series_from_closes(&[100.0, 102.0, 99.0]);
    let analyzer = TradeAnalyzer::with_model(FailingModel, &analyzer_config());

    let report =
        simulate_and_analyze(&series, &ThresholdStrategy::default(), Some(&analyzer)).unwrap();

    assert_eq!(report.trades.len(), 2);
    assert_eq!(report.summary.sells, 1);
    assert!(report.analysis_failed());
    assert!(matches!(
        report.analysis,
        Some(Err(AnalysisError::RateLimited))
    ));
}

#[test]
fn successful_analysis_is_reported() {
    let series = series_from_closes(&[100.0, 102.0]);
    let analyzer = TradeAnalyzer::with_model(EchoModel, &analyzer_config());

    let report =
        simulate_and_analyze(&series, &ThresholdStrategy::default(), Some(&analyzer)).unwrap();

    assert_eq!(report.analysis.unwrap().unwrap(), "1 messages");
    assert!(report.summary.open_position);
}

#[test]
fn analysis_is_optional() {
    let series = series_from_closes(&[100.0, 102.0, 99.0]);
    let report = simulate_and_analyze::<OpenAiClient>(&series, &ThresholdStrategy::default(), None)
        .unwrap();
    assert!(report.analysis.is_none());
    assert!(!report.analysis_failed());
    assert_eq!(report.bar_count, 3);
}

#[test]
fn invalid_series_halts_before_analysis() {
    let series = series_from_closes(&[100.0, f64::NAN, 99.0]);
    let analyzer = TradeAnalyzer::with_model(EchoModel, &analyzer_config());
    let err = simulate_and_analyze(&series, &ThresholdStrategy::default(), Some(&analyzer))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Simulation(_)));
}

#[test]
fn fetch_failure_is_data_error() {
    let err = fetch_series(&DownProvider, "BTC-USD", Timeframe::Daily).unwrap_err();
    match err {
        PipelineError::Data(e) => assert!(e.is_unavailable()),
        other => panic!("expected data error, got {other:?}"),
    }
}

#[test]
fn synthetic_series_runs_end_to_end() {
    let end = common::day(300);
    let provider = SyntheticProvider::new(250, end);
    let series = fetch_series(&provider, "BTC-USD", Timeframe::Daily).unwrap();
    let report = simulate_and_analyze::<OpenAiClient>(&series, &ThresholdStrategy::default(), None)
        .unwrap();
    assert_eq!(report.bar_count, 250);
    assert!(!report.trades.is_empty());
}
