//! Close-price line chart.
//!
//! Closes are plotted against bar index with braille markers. Bars whose
//! close is missing are left out of the line.

use crate::panels::{format_timestamp, no_data_block};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};
use tradelens_core::domain::PriceSeries;

const MIN_PLOT_WIDTH: u16 = 16;
const MIN_PLOT_HEIGHT: u16 = 4;

pub struct LineChartPanel<'a> {
    series: &'a PriceSeries,
    theme: &'a Theme,
}

impl<'a> LineChartPanel<'a> {
    pub fn new(series: &'a PriceSeries, theme: &'a Theme) -> Self {
        Self { series, theme }
    }

    fn points(&self) -> Vec<(f64, f64)> {
        self.series
            .closes()
            .enumerate()
            .filter(|(_, close)| close.is_finite())
            .map(|(i, close)| (i as f64, close))
            .collect()
    }

    fn title(&self, points: &[(f64, f64)]) -> String {
        let timeframe = self.series.timeframe();
        let span = match (self.series.first(), self.series.last()) {
            (Some(first), Some(last)) => format!(
                "{} to {}",
                format_timestamp(first.timestamp, timeframe),
                format_timestamp(last.timestamp, timeframe)
            ),
            _ => String::new(),
        };
        let change = match (points.first(), points.last()) {
            (Some(&(_, a)), Some(&(_, b))) if a != 0.0 => format!(" | {:+.2}%", (b - a) / a * 100.0),
            _ => String::new(),
        };
        format!(
            " {} | {} | {} bars | {}{} ",
            self.series.symbol(),
            timeframe,
            self.series.len(),
            span,
            change
        )
    }
}

impl Widget for LineChartPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let points = self.points();
        if points.is_empty() {
            no_data_block(self.series.symbol(), self.theme).render(area, buf);
            return;
        }

        let y_min = points.iter().map(|&(_, y)| y).fold(f64::INFINITY, f64::min);
        let y_max = points.iter().map(|&(_, y)| y).fold(f64::NEG_INFINITY, f64::max);
        let y_range = y_max - y_min;
        let y_pad = if y_range > 0.0 { y_range * 0.05 } else { 1.0 };
        let y_lower = y_min - y_pad;
        let y_upper = y_max + y_pad;
        let x_max = (self.series.len().saturating_sub(1)).max(1) as f64;

        let line_color = match (points.first(), points.last()) {
            (Some(&(_, a)), Some(&(_, b))) => self.theme.change_color(b - a),
            _ => self.theme.accent,
        };

        let block = Block::default()
            .title(self.title(&points))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        // Too small for axes and labels: keep the frame only
        let inner = block.inner(area);
        if inner.width < MIN_PLOT_WIDTH || inner.height < MIN_PLOT_HEIGHT {
            block.render(area, buf);
            return;
        }

        let datasets = vec![Dataset::default()
            .name("Close")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(line_color))
            .data(&points)];

        let x_labels = vec![
            Span::raw("0"),
            Span::raw(format!("{}", (x_max / 2.0) as usize)),
            Span::raw(format!("{}", x_max as usize)),
        ];
        let y_labels = vec![
            Span::raw(format!("{y_lower:.2}")),
            Span::raw(format!("{:.2}", (y_lower + y_upper) / 2.0)),
            Span::raw(format!("{y_upper:.2}")),
        ];

        let axis_title = Style::default().fg(self.theme.text_secondary);
        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(Span::styled("Bar", axis_title))
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("Close", axis_title))
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}
