//! Chart widgets.

pub mod candle_chart;
pub mod line_chart;

pub use candle_chart::CandleChartPanel;
pub use line_chart::LineChartPanel;

use crate::theme::Theme;
use chrono::NaiveDateTime;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use tradelens_core::domain::Timeframe;

/// Daily bars show the date only; intraday bars add the time of day.
pub fn format_timestamp(ts: NaiveDateTime, timeframe: Timeframe) -> String {
    if timeframe.is_intraday() {
        ts.format("%Y-%m-%d %H:%M").to_string()
    } else {
        ts.format("%Y-%m-%d").to_string()
    }
}

fn no_data_block<'a>(symbol: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {symbol} [No Data] "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.muted))
        .style(Style::default().bg(theme.background))
}

/// Flatten a buffer to text, row by row.
#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut text = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell((x, y)) {
                text.push_str(cell.symbol());
            }
        }
        text.push('\n');
    }
    text
}
