//! tradelens CLI: fetch a price series, chart it, simulate threshold trades,
//! and ask a language model to comment on them.
//!
//! Commands:
//! - `run` (default): fetch → chart → simulate → analyze, with the update
//!   notifier ticking in the background
//! - `analyze-chart`: send a chart image to the model for commentary

use anyhow::{bail, Context, Result};
use chrono::{NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tradelens_core::analysis::TradeAnalyzer;
use tradelens_core::config::AppConfig;
use tradelens_core::data::synthetic::DEFAULT_BAR_COUNT;
use tradelens_core::data::{
    CsvProvider, DataSource, PriceProvider, SyntheticProvider, YahooProvider,
};
use tradelens_core::domain::Timeframe;
use tradelens_core::notifier::UpdateNotifier;
use tradelens_core::pipeline::{fetch_series, simulate_and_analyze, RunReport};
use tradelens_tui::{install_panic_hook, ChartMode};

#[derive(Parser)]
#[command(
    name = "tradelens",
    version,
    about = "Fetch prices, chart them, simulate threshold trades, and get model commentary",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, chart, simulate, and analyze one symbol (the default).
    Run(RunArgs),
    /// Ask the model to describe a chart image (PNG or JPEG).
    AnalyzeChart {
        /// Path to the image file.
        image: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Ticker symbol, e.g. BTC-USD or AAPL. Defaults to BTC-USD.
    #[arg(long)]
    symbol: Option<String>,

    /// Bar timeframe: 5, 15, 60 (minutes) or D. Defaults to D.
    #[arg(long)]
    timeframe: Option<Timeframe>,

    /// Chart to show before simulating: line, candlestick, or none.
    #[arg(long)]
    chart: Option<String>,

    /// Price source: yahoo, csv, or synthetic.
    #[arg(long)]
    source: Option<DataSource>,

    /// Directory searched by the csv source.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Skip the model analysis (no API key needed).
    #[arg(long, default_value_t = false)]
    no_analysis: bool,

    /// Keep the update notifier running this many seconds after the results.
    #[arg(long)]
    watch: Option<u64>,

    /// Print the report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Missing .env is fine; the environment may already carry the key
    dotenvy::dotenv().ok();
    init_tracing();
    install_panic_hook();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run(args)) => run_cmd(args),
        Some(Commands::AnalyzeChart { image, config }) => run_analyze_chart(&image, config),
        None => run_cmd(cli.run),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

/// Command-line flags win over the config file.
fn merge_args(mut config: AppConfig, args: &RunArgs) -> Result<AppConfig> {
    if let Some(symbol) = &args.symbol {
        config.run.symbol = symbol.clone();
    }
    if let Some(timeframe) = args.timeframe {
        config.run.timeframe = timeframe;
    }
    if let Some(chart) = &args.chart {
        config.run.chart = chart.clone();
    }
    if let Some(source) = args.source {
        config.run.source = source;
    }
    if let Some(dir) = &args.csv_dir {
        config.run.csv_dir = dir.clone();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// `None` means no chart.
fn parse_chart(value: &str) -> Result<Option<ChartMode>> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(value.parse::<ChartMode>()?))
}

fn build_provider(config: &AppConfig) -> Result<Box<dyn PriceProvider>> {
    Ok(match config.run.source {
        DataSource::YahooFinance => {
            Box::new(YahooProvider::new().context("failed to set up Yahoo Finance client")?)
        }
        DataSource::CsvImport => Box::new(CsvProvider::new(&config.run.csv_dir)),
        DataSource::Synthetic => {
            let end = Utc::now().date_naive().and_time(NaiveTime::MIN);
            Box::new(SyntheticProvider::new(DEFAULT_BAR_COUNT, end))
        }
    })
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let config = merge_args(load_config(args.config.as_deref())?, &args)?;
    let chart = parse_chart(&config.run.chart)?;
    let strategy = config.strategy.to_strategy()?;

    // Credentials are checked before any network traffic
    let analyzer = if args.no_analysis {
        None
    } else {
        let analyzer_config = config
            .analyzer
            .resolve_env()
            .context("analysis needs an API key (pass --no-analysis to skip it)")?;
        Some(TradeAnalyzer::from_config(&analyzer_config)?)
    };

    let provider = build_provider(&config)?;
    let series = fetch_series(provider.as_ref(), &config.run.symbol, config.run.timeframe)
        .with_context(|| format!("could not load prices for {}", config.run.symbol))?;

    if let Some(mode) = chart {
        tradelens_tui::render(&series, mode).context("failed to display chart")?;
    }

    let mut notifier = UpdateNotifier::new(config.updates.interval());
    notifier
        .start()
        .context("failed to start update notifier")?;

    let report = simulate_and_analyze(&series, &strategy, analyzer.as_ref());
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            notifier.stop();
            return Err(e).context("run halted");
        }
    };

    if args.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if let Some(secs) = args.watch {
        info!("Watching for {secs}s; update notifier keeps running.");
        std::thread::sleep(Duration::from_secs(secs));
    }
    notifier.stop();
    info!(ticks = notifier.ticks(), "Run finished.");

    if let Some(Err(e)) = &report.analysis {
        bail!("trade analysis failed: {e}");
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("=== {} ({}) ===", report.symbol, timeframe_label(report.timeframe));
    println!("Bars:            {}", report.bar_count);
    println!();

    if report.trades.is_empty() {
        println!("No trades triggered.");
    } else {
        println!("{:<6} {:>14} {:<20} {:>14}", "Type", "Price", "Date", "Profit");
        println!("{}", "-".repeat(57));
        for trade in &report.trades {
            let profit = trade
                .profit
                .map(|p| format!("{p:.2}"))
                .unwrap_or_default();
            println!(
                "{:<6} {:>14.2} {:<20} {:>14}",
                trade.kind.to_string(),
                trade.price,
                trade.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                profit
            );
        }
    }

    let s = &report.summary;
    println!();
    println!("Buys:            {}", s.buys);
    println!("Sells:           {}", s.sells);
    println!("Win rate:        {:.1}%", s.win_rate() * 100.0);
    println!("Realized P&L:    {:.2}", s.realized_profit);
    println!("Open position:   {}", if s.open_position { "yes" } else { "no" });

    match &report.analysis {
        Some(Ok(text)) => {
            println!();
            println!("Analysis Result:");
            println!("{text}");
        }
        Some(Err(e)) => {
            println!();
            println!("Analysis failed: {e}");
        }
        None => {}
    }
}

fn print_json(report: &RunReport) -> Result<()> {
    let (analysis, analysis_error) = match &report.analysis {
        Some(Ok(text)) => (Some(text.clone()), None),
        Some(Err(e)) => (None, Some(e.to_string())),
        None => (None, None),
    };
    let value = serde_json::json!({
        "symbol": report.symbol,
        "timeframe": report.timeframe,
        "bars": report.bar_count,
        "trades": report.trades,
        "summary": report.summary,
        "analysis": analysis,
        "analysis_error": analysis_error,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn timeframe_label(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Intraday5 => "5m",
        Timeframe::Intraday15 => "15m",
        Timeframe::Intraday60 => "60m",
        Timeframe::Daily => "daily",
    }
}

fn run_analyze_chart(image: &Path, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let analyzer_config = config
        .analyzer
        .resolve_env()
        .context("chart analysis needs an API key")?;
    let analyzer = TradeAnalyzer::from_config(&analyzer_config)?;

    match analyzer.analyze_chart(image) {
        Ok(text) => {
            println!("Analysis Result:");
            println!("{text}");
            Ok(())
        }
        Err(e) => {
            error!("Error during chart analysis: {e}");
            Err(e).with_context(|| format!("could not analyze {}", image.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_runs_with_defaults() {
        let cli = Cli::try_parse_from(["tradelens"]).unwrap();
        assert!(cli.command.is_none());
        let config = merge_args(AppConfig::default(), &cli.run).unwrap();
        assert_eq!(config.run.symbol, "BTC-USD");
        assert_eq!(config.run.timeframe, Timeframe::Daily);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "tradelens",
            "run",
            "--symbol",
            "ETH-USD",
            "--timeframe",
            "15",
            "--source",
            "synthetic",
            "--chart",
            "none",
            "--no-analysis",
        ])
        .unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        let config = merge_args(AppConfig::default(), &args).unwrap();
        assert_eq!(config.run.symbol, "ETH-USD");
        assert_eq!(config.run.timeframe, Timeframe::Intraday15);
        assert_eq!(config.run.source, DataSource::Synthetic);
        assert!(args.no_analysis);
        assert_eq!(parse_chart(&config.run.chart).unwrap(), None);
    }

    #[test]
    fn unsupported_timeframe_is_rejected_at_parse() {
        assert!(Cli::try_parse_from(["tradelens", "--timeframe", "W"]).is_err());
    }

    #[test]
    fn chart_values() {
        assert_eq!(parse_chart("line").unwrap(), Some(ChartMode::Line));
        assert_eq!(parse_chart("candle").unwrap(), Some(ChartMode::Candlestick));
        assert_eq!(parse_chart("None").unwrap(), None);
        assert!(parse_chart("pie").is_err());
    }

    #[test]
    fn analyze_chart_takes_image_path() {
        let cli = Cli::try_parse_from(["tradelens", "analyze-chart", "chart.png"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::AnalyzeChart { ref image, .. }) if image == Path::new("chart.png")
        ));
    }

    #[test]
    fn empty_symbol_is_invalid() {
        let args = RunArgs {
            symbol: Some("  ".into()),
            ..RunArgs::default()
        };
        assert!(merge_args(AppConfig::default(), &args).is_err());
    }
}
