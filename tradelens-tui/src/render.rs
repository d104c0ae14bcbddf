//! Full-screen chart display.
//!
//! `render` owns the terminal for the duration of the call: it switches to
//! the alternate screen, redraws on every event and returns once the user
//! presses `q`, `Esc` or `Enter`. `draw` holds the layout and is what tests
//! drive through `TestBackend`.

use crate::panels::{CandleChartPanel, LineChartPanel};
use crate::theme::Theme;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};
use tradelens_core::domain::PriceSeries;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
#[error("unknown chart type '{0}' (expected line or candlestick)")]
pub struct UnknownChartMode(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Line,
    Candlestick,
}

impl FromStr for ChartMode {
    type Err = UnknownChartMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ChartMode::Line),
            "candlestick" | "candle" => Ok(ChartMode::Candlestick),
            _ => Err(UnknownChartMode(s.to_string())),
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartMode::Line => "line",
            ChartMode::Candlestick => "candlestick",
        })
    }
}

const HELP: &str = " q / Esc / Enter: close chart ";

/// Lay out the chart and the key hint in `frame`.
pub fn draw(frame: &mut Frame, series: &PriceSeries, mode: ChartMode, theme: &Theme) {
    let [chart_area, help_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    match mode {
        ChartMode::Line => frame.render_widget(LineChartPanel::new(series, theme), chart_area),
        ChartMode::Candlestick => {
            frame.render_widget(CandleChartPanel::new(series, theme), chart_area)
        }
    }

    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(theme.muted).bg(theme.background)),
        help_area,
    );
}

/// Keys that dismiss the chart. Ctrl-C is included since raw mode swallows SIGINT.
pub fn is_exit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Puts the terminal back on drop, so early returns and unwinding both restore it.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, RenderError> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("failed to disable raw mode: {e}");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
            warn!("failed to leave alternate screen: {e}");
        }
    }
}

/// Chain a panic hook that restores the terminal before the panic message prints.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));
}

/// Show `series` full-screen until the user dismisses it.
pub fn render(series: &PriceSeries, mode: ChartMode) -> Result<(), RenderError> {
    let theme = Theme::default();
    debug!(symbol = series.symbol(), bars = series.len(), %mode, "opening chart");

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    loop {
        terminal.draw(|f| draw(f, series, mode, &theme))?;
        if let Event::Key(key) = event::read()? {
            if is_exit_key(&key) {
                break;
            }
        }
    }

    terminal.show_cursor()?;
    debug!("chart closed");
    Ok(())
}
