//! TradeLens Core: price series, data providers, trade simulation, analysis.
//!
//! This crate contains:
//! - Domain types (bars, series, timeframes, trade events)
//! - Price providers (Yahoo Finance, CSV import, synthetic)
//! - Threshold-crossing trade simulator (two-state machine)
//! - Trade analyzer backed by a chat completion model
//! - Placeholder update notifier with explicit stop
//! - TOML/environment configuration and stage orchestration

pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod notifier;
pub mod pipeline;
pub mod retry;
pub mod simulator;

pub use simulator::simulate;

#[cfg(test)]
mod test_helpers;
