//! CSV import provider against files written to a temp directory.

use std::fs;
use tradelens_core::data::{CsvProvider, DataError, PriceProvider};
use tradelens_core::domain::Timeframe;

const DAILY: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-03,101.0,103.0,100.0,102.0,102.0,1000
2024-01-02,100.0,101.5,99.0,100.0,100.0,900
2024-01-04,102.0,102.5,98.0,99.0,99.0,1100
";

#[test]
fn loads_and_sorts_daily_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("SPY.csv"), DAILY).unwrap();

    let provider = CsvProvider::new(dir.path());
    let series = provider.fetch("SPY", Timeframe::Daily).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.symbol(), "SPY");
    assert_eq!(
        series.closes().collect::<Vec<_>>(),
        vec![100.0, 102.0, 99.0]
    );
    assert_eq!(
        series.first().unwrap().timestamp.to_string(),
        "2024-01-02 00:00:00"
    );
}

#[test]
fn prefers_timeframe_specific_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("SPY.csv"), DAILY).unwrap();
    fs::write(
        dir.path().join("SPY_5.csv"),
        "Datetime,Open,High,Low,Close\n2024-01-02 09:30:00,1,1,1,1\n2024-01-02 09:35:00,2,2,2,2\n",
    )
    .unwrap();

    let provider = CsvProvider::new(dir.path());
    let series = provider.fetch_token("SPY", "5").unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.timeframe(), Timeframe::Intraday5);
}

#[test]
fn empty_close_cell_becomes_nan() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("X.csv"),
        "Date,Open,High,Low,Close\n2024-01-02,1,1,1,\n2024-01-03,1,1,1,1\n",
    )
    .unwrap();
    let series = CsvProvider::new(dir.path()).fetch("X", Timeframe::Daily).unwrap();
    assert!(series.bars()[0].close.is_nan());
}

#[test]
fn missing_file_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsvProvider::new(dir.path())
        .fetch("NOPE", Timeframe::Daily)
        .unwrap_err();
    assert!(matches!(err, DataError::NoData { .. }));
}

#[test]
fn header_only_file_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("X.csv"), "Date,Open,High,Low,Close\n").unwrap();
    let err = CsvProvider::new(dir.path())
        .fetch("X", Timeframe::Daily)
        .unwrap_err();
    assert!(matches!(err, DataError::NoData { .. }));
}

#[test]
fn bad_date_reports_line_number() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("X.csv"),
        "Date,Open,High,Low,Close\n2024-01-02,1,1,1,1\nyesterday,1,1,1,1\n",
    )
    .unwrap();
    let err = CsvProvider::new(dir.path())
        .fetch("X", Timeframe::Daily)
        .unwrap_err();
    match err {
        DataError::ResponseFormatChanged(msg) => assert!(msg.contains(":3:"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn duplicate_dates_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("X.csv"),
        "Date,Open,High,Low,Close\n2024-01-02,1,1,1,1\n2024-01-02,2,2,2,2\n",
    )
    .unwrap();
    let err = CsvProvider::new(dir.path())
        .fetch("X", Timeframe::Daily)
        .unwrap_err();
    assert!(matches!(err, DataError::InvalidSeries(_)));
}

#[test]
fn unsupported_token_is_rejected_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsvProvider::new(dir.path())
        .fetch_token("SPY", "W")
        .unwrap_err();
    assert!(matches!(err, DataError::UnsupportedTimeframe(_)));
}
