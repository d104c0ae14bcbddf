//! Price series providers: Yahoo Finance, CSV import, synthetic data.

pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_import::CsvProvider;
pub use provider::{DataError, DataSource, PriceProvider};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
