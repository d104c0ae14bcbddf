//! Domain types for TradeLens

pub mod bar;
pub mod series;
pub mod timeframe;
pub mod trade;

pub use bar::PriceBar;
pub use series::{PriceSeries, SeriesError};
pub use timeframe::Timeframe;
pub use trade::{TradeEvent, TradeKind, TradeSummary};
