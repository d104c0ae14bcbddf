//! TradeEvent: one buy or sell decision made by the simulator.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => f.write_str("buy"),
            TradeKind::Sell => f.write_str("sell"),
        }
    }
}

/// A simulated buy or sell at the triggering bar's close.
///
/// `profit` is present on sells only: sell price minus the price of the buy it closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub kind: TradeKind,
    pub price: f64,
    pub timestamp: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
}

impl TradeEvent {
    pub fn buy(price: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            kind: TradeKind::Buy,
            price,
            timestamp,
            profit: None,
        }
    }

    pub fn sell(price: f64, timestamp: NaiveDateTime, profit: f64) -> Self {
        Self {
            kind: TradeKind::Sell,
            price,
            timestamp,
            profit: Some(profit),
        }
    }

    pub fn is_buy(&self) -> bool {
        self.kind == TradeKind::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.kind == TradeKind::Sell
    }
}

/// Aggregate view of a trade list, reported even when analysis fails.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TradeSummary {
    pub buys: usize,
    pub sells: usize,
    pub winners: usize,
    pub realized_profit: f64,
    /// A buy with no matching sell remains at the end of the series.
    pub open_position: bool,
}

impl TradeSummary {
    pub fn from_trades(trades: &[TradeEvent]) -> Self {
        let mut summary = TradeSummary::default();
        for trade in trades {
            match trade.kind {
                TradeKind::Buy => summary.buys += 1,
                TradeKind::Sell => {
                    summary.sells += 1;
                    let profit = trade.profit.unwrap_or(0.0);
                    summary.realized_profit += profit;
                    if profit > 0.0 {
                        summary.winners += 1;
                    }
                }
            }
        }
        summary.open_position = trades.last().is_some_and(TradeEvent::is_buy);
        summary
    }

    /// Fraction of closed round trips that made money.
    pub fn win_rate(&self) -> f64 {
        if self.sells == 0 {
            return 0.0;
        }
        self.winners as f64 / self.sells as f64
    }
}
