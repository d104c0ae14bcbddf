//! Threshold-crossing trade simulator.
//!
//! A single forward pass over the close prices drives a two-state machine:
//! - `Flat` → `Long` when the close rises more than `rise` over the previous close (buy)
//! - `Long` → `Flat` when the close drops more than `drop` below the previous close (sell)
//!
//! Each bar triggers at most one transition. A position still open when the
//! series ends is left open; no closing sell is synthesized.

use crate::domain::{PriceSeries, TradeEvent};
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid input: bar {index} at {timestamp} has a missing, non-finite, or negative close price")]
    InvalidInput {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),
}

/// Simulated holding state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Flat,
    Long { entry_price: f64 },
}

/// Transition emitted by a single step of the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Enter { price: f64 },
    Exit { price: f64, profit: f64 },
}

/// Close-to-close thresholds expressed as multipliers of the previous close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdStrategy {
    /// Buy when `close > prev_close * rise_factor`.
    pub rise_factor: f64,
    /// Sell when `close < prev_close * drop_factor`.
    pub drop_factor: f64,
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self {
            rise_factor: 1.01,
            drop_factor: 0.99,
        }
    }
}

impl ThresholdStrategy {
    /// Build from fractional moves, e.g. `from_fractions(0.01, 0.01)` for ±1%.
    pub fn from_fractions(rise: f64, drop: f64) -> Result<Self, SimulationError> {
        if !rise.is_finite() || rise < 0.0 {
            return Err(SimulationError::InvalidThreshold(format!(
                "rise must be a non-negative number, got {rise}"
            )));
        }
        if !drop.is_finite() || !(0.0..1.0).contains(&drop) {
            return Err(SimulationError::InvalidThreshold(format!(
                "drop must be in [0, 1), got {drop}"
            )));
        }
        Ok(Self {
            rise_factor: 1.0 + rise,
            drop_factor: 1.0 - drop,
        })
    }

    /// Advance the state machine by one bar.
    ///
    /// Guards are evaluated against the current state only, so a bar can
    /// never produce both a buy and a sell.
    pub fn step(
        &self,
        position: Position,
        prev_close: f64,
        close: f64,
    ) -> (Position, Option<Transition>) {
        match position {
            Position::Flat if close > prev_close * self.rise_factor => (
                Position::Long { entry_price: close },
                Some(Transition::Enter { price: close }),
            ),
            Position::Long { entry_price } if close < prev_close * self.drop_factor => (
                Position::Flat,
                Some(Transition::Exit {
                    price: close,
                    profit: close - entry_price,
                }),
            ),
            unchanged => (unchanged, None),
        }
    }

    /// Run the strategy over `series`, returning trades in bar order.
    ///
    /// Fewer than two bars yield no trades. Otherwise the whole series is
    /// rejected if any close is NaN, infinite, or negative.
    pub fn simulate(&self, series: &PriceSeries) -> Result<Vec<TradeEvent>, SimulationError> {
        let bars = series.bars();
        if bars.len() < 2 {
            debug!(symbol = series.symbol(), bars = bars.len(), "too few bars to compare");
            return Ok(Vec::new());
        }
        if let Some((index, bar)) = bars
            .iter()
            .enumerate()
            .find(|(_, b)| !b.close.is_finite() || b.close < 0.0)
        {
            return Err(SimulationError::InvalidInput {
                index,
                timestamp: bar.timestamp,
            });
        }

        debug!(
            symbol = series.symbol(),
            bars = bars.len(),
            rise_factor = self.rise_factor,
            drop_factor = self.drop_factor,
            "simulating trades"
        );

        let mut trades = Vec::new();
        let mut position = Position::Flat;

        for pair in bars.windows(2) {
            let (prev, bar) = (&pair[0], &pair[1]);
            let (next, transition) = self.step(position, prev.close, bar.close);
            position = next;

            match transition {
                Some(Transition::Enter { price }) => {
                    info!("Buy at {price} on {}", bar.timestamp);
                    trades.push(TradeEvent::buy(price, bar.timestamp));
                }
                Some(Transition::Exit { price, profit }) => {
                    info!("Sell at {price} on {}, Profit: {profit}", bar.timestamp);
                    trades.push(TradeEvent::sell(price, bar.timestamp, profit));
                }
                None => {}
            }
        }

        info!(
            trades = trades.len(),
            open = matches!(position, Position::Long { .. }),
            "trade simulation completed"
        );
        Ok(trades)
    }
}

/// Simulate with the default ±1% thresholds.
pub fn simulate(series: &PriceSeries) -> Result<Vec<TradeEvent>, SimulationError> {
    ThresholdStrategy::default().simulate(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PriceBar, Timeframe, TradeKind};
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PriceBar::new(start + chrono::Duration::days(i as i64), c, c, c, c)
            })
            .collect();
        PriceSeries::new("TEST", Timeframe::Daily, bars).unwrap()
    }

    #[test]
    fn step_enters_only_from_flat() {
        let strat = ThresholdStrategy::default();
        let (pos, t) = strat.step(Position::Flat, 100.0, 102.0);
        assert_eq!(pos, Position::Long { entry_price: 102.0 });
        assert_eq!(t, Some(Transition::Enter { price: 102.0 }));

        let long = Position::Long { entry_price: 50.0 };
        assert_eq!(strat.step(long, 100.0, 102.0), (long, None));
    }

    #[test]
    fn step_exits_only_from_long() {
        let strat = ThresholdStrategy::default();
        assert_eq!(strat.step(Position::Flat, 100.0, 90.0), (Position::Flat, None));

        let (pos, t) = strat.step(Position::Long { entry_price: 102.0 }, 102.0, 99.0);
        assert_eq!(pos, Position::Flat);
        assert_eq!(
            t,
            Some(Transition::Exit {
                price: 99.0,
                profit: -3.0
            })
        );
    }

    #[test]
    fn exactly_one_percent_is_not_a_crossing() {
        let strat = ThresholdStrategy::default();
        // strict inequality: landing on the threshold does not trade
        assert_eq!(strat.step(Position::Flat, 100.0, 100.0 * 1.01).1, None);
        let long = Position::Long { entry_price: 1.0 };
        assert_eq!(strat.step(long, 100.0, 100.0 * 0.99).1, None);
    }

    #[test]
    fn buy_then_sell_round_trip() {
        let trades = simulate(&series(&[100.0, 102.0, 99.0])).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].kind, TradeKind::Buy);
        assert_eq!(trades[0].price, 102.0);
        assert_eq!(trades[1].kind, TradeKind::Sell);
        assert_eq!(trades[1].profit, Some(-3.0));
    }

    #[test]
    fn nan_close_rejects_whole_series() {
        let mut closes = vec![100.0, 102.0, 99.0];
        closes[1] = f64::NAN;
        let err = simulate(&series(&closes)).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput { index: 1, .. }));
    }

    #[test]
    fn infinite_close_is_rejected() {
        let err = simulate(&series(&[100.0, f64::INFINITY])).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput { index: 1, .. }));
    }

    #[test]
    fn single_bar_series_is_never_compared() {
        assert!(simulate(&series(&[f64::NAN])).unwrap().is_empty());
    }

    #[test]
    fn custom_thresholds() {
        let strat = ThresholdStrategy::from_fractions(0.05, 0.05).unwrap();
        assert!(strat.simulate(&series(&[100.0, 102.0, 99.0])).unwrap().is_empty());
        let trades = strat.simulate(&series(&[100.0, 106.0, 100.0])).unwrap();
        assert_eq!(trades.len(), 2);
    }

    #[test]
    fn rejects_invalid_thresholds() {
        assert!(ThresholdStrategy::from_fractions(-0.01, 0.01).is_err());
        assert!(ThresholdStrategy::from_fractions(0.01, 1.0).is_err());
        assert!(ThresholdStrategy::from_fractions(f64::NAN, 0.01).is_err());
    }
}
