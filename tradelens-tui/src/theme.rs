//! Neon-on-charcoal palette shared by the chart panels.
//!
//! - **Background**: deep charcoal
//! - **Accent**: electric cyan (borders, the close line)
//! - **Positive**: neon green (up candles, gains)
//! - **Negative**: hot pink (down candles, losses)
//! - **Muted**: steel blue (axes, labels)

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    /// Used for bars with missing prices.
    pub warning: Color,
    pub muted: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::neon()
    }
}

impl Theme {
    pub fn neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            muted: Color::Rgb(100, 149, 237),
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Green for a non-negative change, pink otherwise.
    pub fn change_color(&self, change: f64) -> Color {
        if change >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    /// Candle color: close at or above open counts as up.
    pub fn candle_color(&self, is_up: bool) -> Color {
        if is_up {
            self.positive
        } else {
            self.negative
        }
    }
}
