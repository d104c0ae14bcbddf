//! Prompt text sent to the model.

use crate::domain::TradeEvent;
use std::fmt::Write;

pub const TRADES_HEADER: &str = "Analyze the following simulated trades:\n";
pub const CHART_INSTRUCTION: &str =
    "Analyze this chart. Include the symbol and discuss the price action.";

/// One `Type/Price/Date` line per trade, plus a `Profit` line after each sell.
pub fn build_prompt(trades: &[TradeEvent]) -> String {
    let mut prompt = String::from(TRADES_HEADER);
    for trade in trades {
        // Writing to a String cannot fail
        let _ = writeln!(
            prompt,
            "Type: {}, Price: {}, Date: {}",
            trade.kind, trade.price, trade.timestamp
        );
        if let Some(profit) = trade.profit {
            let _ = writeln!(prompt, "Profit: {profit}");
        }
    }
    prompt
}
