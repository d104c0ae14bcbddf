//! Candlestick panel.
//!
//! Drawn with direct buffer writes:
//! - one terminal column per bar, newest bars kept when the series is wider than the plot
//! - body: full block when up, medium shade when down
//! - wicks: `|` up to the high and down to the low

use crate::panels::{format_timestamp, no_data_block};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Widget},
};
use tradelens_core::domain::{PriceBar, PriceSeries};

/// Width reserved left of the plot for y-axis labels.
const LABEL_WIDTH: u16 = 10;

pub struct CandleChartPanel<'a> {
    series: &'a PriceSeries,
    theme: &'a Theme,
}

impl<'a> CandleChartPanel<'a> {
    pub fn new(series: &'a PriceSeries, theme: &'a Theme) -> Self {
        Self { series, theme }
    }

    /// Map a price to a row in the plot area (0 = top).
    fn price_to_y(price: f64, y_min: f64, y_max: f64, plot_height: u16) -> u16 {
        if (y_max - y_min).abs() < 1e-9 || plot_height == 0 {
            return 0;
        }
        let bottom = plot_height.saturating_sub(1) as f64;
        let frac = (price - y_min) / (y_max - y_min);
        (bottom * (1.0 - frac)).round().clamp(0.0, bottom) as u16
    }

    /// Bars that fit in `plot_width` columns, newest last.
    fn visible_bars(&self, plot_width: u16) -> &'a [PriceBar] {
        let bars = self.series.bars();
        let start = bars.len().saturating_sub(plot_width as usize);
        &bars[start..]
    }
}

impl Widget for CandleChartPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some((low, high)) = self.series.price_range() else {
            no_data_block(self.series.symbol(), self.theme).render(area, buf);
            return;
        };

        let range = high - low;
        let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
        let y_lower = low - pad;
        let y_upper = high + pad;

        let bars = self.series.bars();
        let up_count = bars.iter().filter(|b| !b.is_void() && b.is_up()).count();
        let down_count = bars.iter().filter(|b| !b.is_void() && !b.is_up()).count();

        let title = format!(
            " {} | {} | {} bars | {} up {} down ",
            self.series.symbol(),
            self.series.timeframe(),
            bars.len(),
            up_count,
            down_count,
        );

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        let inner = block.inner(area);
        block.render(area, buf);

        // Bottom row carries the date span
        let plot_left = inner.x + LABEL_WIDTH;
        let plot_top = inner.y;
        let plot_width = inner.width.saturating_sub(LABEL_WIDTH);
        let plot_height = inner.height.saturating_sub(1);

        if plot_width == 0 || plot_height == 0 {
            return;
        }

        let label_style = Style::default().fg(self.theme.muted);
        let y_labels = [y_upper, (y_upper + y_lower) / 2.0, y_lower];
        let y_positions = [0u16, plot_height / 2, plot_height.saturating_sub(1)];
        for (value, y_pos) in y_labels.iter().zip(y_positions.iter()) {
            buf.set_string(inner.x, plot_top + y_pos, format!("{value:>9.2}"), label_style);
        }

        let visible = self.visible_bars(plot_width);
        for (i, bar) in visible.iter().enumerate() {
            let x = plot_left + i as u16;
            if x >= inner.right() {
                break;
            }

            if bar.is_void() {
                buf.set_string(
                    x,
                    plot_top + plot_height.saturating_sub(1),
                    "?",
                    Style::default().fg(self.theme.warning),
                );
                continue;
            }

            let is_up = bar.is_up();
            let style = Style::default().fg(self.theme.candle_color(is_up));

            let high_y = Self::price_to_y(bar.high, y_lower, y_upper, plot_height);
            let low_y = Self::price_to_y(bar.low, y_lower, y_upper, plot_height);
            let body_top_y = Self::price_to_y(bar.open.max(bar.close), y_lower, y_upper, plot_height);
            let body_bot_y = Self::price_to_y(bar.open.min(bar.close), y_lower, y_upper, plot_height);

            for y in high_y..body_top_y {
                buf.set_string(x, plot_top + y, "|", style);
            }

            let body_char = if is_up { "\u{2588}" } else { "\u{2593}" };
            for y in body_top_y..=body_bot_y {
                buf.set_string(x, plot_top + y, body_char, style);
            }

            for y in (body_bot_y + 1)..=low_y {
                buf.set_string(x, plot_top + y, "|", style);
            }
        }

        if let (Some(first), Some(last)) = (visible.first(), visible.last()) {
            let timeframe = self.series.timeframe();
            let span = format!(
                "{} .. {}",
                format_timestamp(first.timestamp, timeframe),
                format_timestamp(last.timestamp, timeframe)
            );
            buf.set_string(plot_left, plot_top + plot_height, span, label_style);
        }
    }
}
