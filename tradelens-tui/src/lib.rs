//! Terminal charts for price series.
//!
//! - Line chart of closing prices
//! - Candlestick chart with wicks and up/down coloring
//! - Blocking full-screen `render` that hands the terminal back on exit

pub mod panels;
pub mod render;
pub mod theme;

pub use panels::{CandleChartPanel, LineChartPanel};
pub use render::{draw, install_panic_hook, is_exit_key, render, ChartMode, RenderError, UnknownChartMode};
pub use theme::Theme;
